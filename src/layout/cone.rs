//! Cone-shaped tree silhouette used for every target position

use std::f32::consts::TAU;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};
use crate::math::Vec3;

/// How elements are distributed radially inside the cone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Uniform radius in `[0, bound]`, filling the volume (needles)
    Interior,
    /// Hugging the surface: `bound + offset + [0, jitter)` so items read as
    /// hanging on the tree rather than buried in it
    Surface {
        #[serde(default)]
        offset: f32,
        #[serde(default)]
        jitter: f32,
    },
}

/// Tapered cone: wide base at `norm_min`, narrow tip at `norm_max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConeShape {
    /// Lowest sampled height
    pub height_min: f32,
    /// Highest sampled height
    pub height_max: f32,
    /// Height mapped to normalized 0 (the tree's base)
    pub norm_min: f32,
    /// Height mapped to normalized 1 (the tree's tip)
    pub norm_max: f32,
    /// Radius bound contributed at the base, shrinking linearly to 0 at the tip
    pub base_radius: f32,
    /// Constant radius added at every height
    pub tip_radius: f32,
    /// Number of full turns the sampled angle covers (5 makes a spiral)
    pub turns: f32,
    pub placement: Placement,
}

impl Default for ConeShape {
    fn default() -> Self {
        Self {
            height_min: -9.0,
            height_max: 9.0,
            norm_min: -9.0,
            norm_max: 9.0,
            base_radius: 6.0,
            tip_radius: 0.5,
            turns: 1.0,
            placement: Placement::Interior,
        }
    }
}

impl ConeShape {
    pub fn validate(&self, population: &'static str) -> Result<()> {
        let invalid = |reason: &str| TreeError::InvalidShape {
            population,
            reason: reason.to_string(),
        };

        let values = [
            self.height_min,
            self.height_max,
            self.norm_min,
            self.norm_max,
            self.base_radius,
            self.tip_radius,
            self.turns,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(invalid("all cone parameters must be finite"));
        }
        if self.height_max <= self.height_min {
            return Err(invalid("height_max must exceed height_min"));
        }
        if self.norm_max <= self.norm_min {
            return Err(invalid("norm_max must exceed norm_min"));
        }
        if !(self.height_max - self.height_min).is_finite() || !(self.norm_max - self.norm_min).is_finite() {
            return Err(invalid("height and norm spans must be finite"));
        }
        if self.base_radius < 0.0 || self.tip_radius < 0.0 {
            return Err(invalid("radii must be non-negative"));
        }
        if self.turns <= 0.0 {
            return Err(invalid("turns must be positive"));
        }
        if let Placement::Surface { offset, jitter } = self.placement {
            if !offset.is_finite() || !jitter.is_finite() || jitter < 0.0 {
                return Err(invalid("surface offset must be finite and jitter non-negative"));
            }
        }
        Ok(())
    }

    /// Height mapped onto [0, 1] along the tree
    pub fn normalized_height(&self, height: f32) -> f32 {
        ((height - self.norm_min) / (self.norm_max - self.norm_min)).clamp(0.0, 1.0)
    }

    /// Maximum interior radius at normalized height `n`; non-increasing in `n`
    pub fn radius_bound(&self, n: f32) -> f32 {
        self.base_radius * (1.0 - n.clamp(0.0, 1.0)) + self.tip_radius
    }

    /// Largest radius any placement can produce at normalized height `n`
    pub fn outer_radius(&self, n: f32) -> f32 {
        match self.placement {
            Placement::Interior => self.radius_bound(n),
            Placement::Surface { offset, jitter } => (self.radius_bound(n) + offset + jitter).max(0.0),
        }
    }

    /// Draw one target position
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let height = rng.gen_range(self.height_min..self.height_max);
        let bound = self.radius_bound(self.normalized_height(height));
        let angle = rng.gen::<f32>() * TAU * self.turns;

        let radius = match self.placement {
            Placement::Interior => rng.gen::<f32>() * bound,
            Placement::Surface { offset, jitter } => (bound + offset + rng.gen::<f32>() * jitter).max(0.0),
        };

        Vec3::new(angle.cos() * radius, height, angle.sin() * radius)
    }
}
