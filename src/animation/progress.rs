//! Frame-rate independent progress toward the current tree state
//!
//! Each population owns one [`ProgressDriver`]. Every frame it moves a
//! fraction of the remaining distance toward the target, so convergence is
//! asymptotic rather than a fixed-duration tween and irregular frame times
//! need no extra clock bookkeeping.

use crate::error::{Result, TreeError};
use crate::state::TreeState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressDriver {
    progress: f32,
    approach_rate: f32,
}

impl ProgressDriver {
    /// Create a driver resting at the dispersed end (progress 0)
    pub fn new(approach_rate: f32) -> Result<Self> {
        if !approach_rate.is_finite() || approach_rate < 0.0 {
            return Err(TreeError::InvalidParameter {
                name: "approach_rate",
                value: approach_rate,
                reason: "must be finite and non-negative",
            });
        }

        Ok(Self {
            progress: 0.0,
            approach_rate,
        })
    }

    /// Advance one frame toward `state`.
    ///
    /// `elapsed` that is negative or not finite counts as no time passing.
    /// The step factor is capped at 1 so a long stall lands exactly on the
    /// target instead of overshooting it.
    pub fn advance(&mut self, state: TreeState, elapsed: f32) -> f32 {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        let target = state.target();
        let step = (self.approach_rate * elapsed).min(1.0);

        self.progress = (self.progress + (target - self.progress) * step).clamp(0.0, 1.0);
        self.progress
    }

    /// Jump straight to a state's end value
    pub fn snap_to(&mut self, state: TreeState) {
        self.progress = state.target();
    }

    /// Whether progress sits within `epsilon` of the state's end value
    pub fn is_settled(&self, state: TreeState, epsilon: f32) -> bool {
        (self.progress - state.target()).abs() <= epsilon
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_dispersed() {
        let driver = ProgressDriver::new(1.5).unwrap();
        assert_eq!(driver.progress(), 0.0);
        assert!(driver.is_settled(TreeState::Dispersed, 0.0));
    }

    #[test]
    fn test_rejects_bad_rate() {
        assert!(ProgressDriver::new(-1.0).is_err());
        assert!(ProgressDriver::new(f32::NAN).is_err());
        assert!(ProgressDriver::new(f32::INFINITY).is_err());
        assert!(ProgressDriver::new(0.0).is_ok());
    }

    #[test]
    fn test_single_step_formula() {
        let mut driver = ProgressDriver::new(1.0).unwrap();
        let p = driver.advance(TreeState::Assembled, 0.25);
        assert!((p - 0.25).abs() < 1e-6);

        // (1 - 0.25) * 0.25 more
        let p = driver.advance(TreeState::Assembled, 0.25);
        assert!((p - 0.4375).abs() < 1e-6);
    }

    #[test]
    fn test_converges_to_assembled() {
        let mut driver = ProgressDriver::new(1.0).unwrap();
        for _ in 0..3000 {
            driver.advance(TreeState::Assembled, 1.0 / 60.0);
        }
        assert!((driver.progress() - 1.0).abs() < 1e-4);
        assert!(driver.is_settled(TreeState::Assembled, 1e-4));
    }

    #[test]
    fn test_large_elapsed_does_not_overshoot() {
        let mut driver = ProgressDriver::new(0.8).unwrap();
        assert_eq!(driver.advance(TreeState::Assembled, 1e6), 1.0);
        assert_eq!(driver.advance(TreeState::Dispersed, 1e6), 0.0);
    }

    #[test]
    fn test_stays_in_unit_interval() {
        let mut driver = ProgressDriver::new(3.0).unwrap();
        let steps = [0.0, 0.016, 0.5, 2.0, 0.001, 10.0, 0.33, 1e9];
        for (i, dt) in steps.iter().cycle().take(200).enumerate() {
            let state = if (i / 7) % 2 == 0 { TreeState::Assembled } else { TreeState::Dispersed };
            let p = driver.advance(state, *dt);
            assert!((0.0..=1.0).contains(&p), "progress {} escaped [0,1]", p);
        }
    }

    #[test]
    fn test_bad_elapsed_is_ignored() {
        let mut driver = ProgressDriver::new(1.0).unwrap();
        driver.advance(TreeState::Assembled, 0.5);
        let before = driver.progress();

        assert_eq!(driver.advance(TreeState::Assembled, f32::NAN), before);
        assert_eq!(driver.advance(TreeState::Assembled, -3.0), before);
        assert_eq!(driver.advance(TreeState::Assembled, f32::INFINITY), before);
    }

    #[test]
    fn test_snap_to() {
        let mut driver = ProgressDriver::new(1.0).unwrap();
        driver.snap_to(TreeState::Assembled);
        assert_eq!(driver.progress(), 1.0);
        driver.snap_to(TreeState::Dispersed);
        assert_eq!(driver.progress(), 0.0);
    }
}
