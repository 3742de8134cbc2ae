//! Animation: easing curves, progress drivers and the per-element blend
//!
//! Progress drivers carry the only per-frame state. Everything downstream of
//! a driver's progress value is a pure function of it.

pub mod blend;
mod easing;
mod progress;

pub use blend::{LightPalette, Transform};
pub use easing::{ease, Easing};
pub use progress::ProgressDriver;
