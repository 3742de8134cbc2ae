pub mod vec3;
pub mod matrix;
pub mod color;

pub use vec3::Vec3;
pub use matrix::Mat4;
pub use color::{Color, parse_palette};

/// Scalar linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
