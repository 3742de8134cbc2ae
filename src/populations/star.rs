//! Tree-topper star
//!
//! A single instance that drops from above the scene onto the tip while
//! growing from nothing, spinning about Y with a slight Z wobble.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::{read_instance_position, write_instance, Population, INSTANCE_STRIDE};
use crate::animation::{ease, Easing, ProgressDriver, Transform};
use crate::error::{Result, TreeError};
use crate::math::{lerp, Color, Vec3};
use crate::state::{FrameInput, TreeState};

const LABEL: &str = "star";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StarConfig {
    pub approach_rate: f32,
    /// Height while dispersed
    pub start_height: f32,
    /// Height on top of the assembled tree
    pub end_height: f32,
    /// Scale once assembled (it is 0 while dispersed)
    pub end_scale: f32,
    /// Radians per second about Y
    pub spin_rate: f32,
    /// Amplitude of the Z wobble, radians
    pub wobble: f32,
    pub color: String,
    pub emissive_intensity: f32,
    /// Color of the point light the star casts
    pub glow_color: String,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            approach_rate: 1.0,
            start_height: 20.0,
            end_height: 9.5,
            end_scale: 1.5,
            spin_rate: 1.0,
            wobble: 0.1,
            color: "#FFD700".to_string(),
            emissive_intensity: 2.0,
            glow_color: "#ffaa00".to_string(),
        }
    }
}

pub struct StarPopulation {
    driver: ProgressDriver,
    start_height: f32,
    end_height: f32,
    end_scale: f32,
    spin_rate: f32,
    wobble: f32,
    color: Color,
    emissive_intensity: f32,
    glow: Color,
    transform: Transform,
    buffer: [f32; INSTANCE_STRIDE],
}

impl StarPopulation {
    pub fn new(config: &StarConfig) -> Result<Self> {
        let params = [
            ("star.start_height", config.start_height),
            ("star.end_height", config.end_height),
            ("star.spin_rate", config.spin_rate),
            ("star.wobble", config.wobble),
        ];
        for (name, value) in params {
            if !value.is_finite() {
                return Err(TreeError::InvalidParameter { name, value, reason: "must be finite" });
            }
        }
        for (name, value) in [("star.end_scale", config.end_scale), ("star.emissive_intensity", config.emissive_intensity)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TreeError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and non-negative",
                });
            }
        }

        let mut star = Self {
            driver: ProgressDriver::new(config.approach_rate)?,
            start_height: config.start_height,
            end_height: config.end_height,
            end_scale: config.end_scale,
            spin_rate: config.spin_rate,
            wobble: config.wobble,
            color: Color::from_hex(&config.color)?,
            emissive_intensity: config.emissive_intensity,
            glow: Color::from_hex(&config.glow_color)?,
            transform: Transform::default(),
            buffer: [0.0; INSTANCE_STRIDE],
        };
        star.refresh(0.0);
        Ok(star)
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Emissive color for the star material
    pub fn emissive(&self) -> Color {
        self.color.scale(self.emissive_intensity)
    }

    pub fn glow_color(&self) -> Color {
        self.glow
    }

    fn refresh(&mut self, time: f64) {
        let eased = ease(self.driver.progress(), Easing::Linear);
        let time = if time.is_finite() { time } else { 0.0 };
        let spin = (time * self.spin_rate as f64).rem_euclid(TAU) as f32;
        let wobble = (time.rem_euclid(TAU) as f32).sin() * self.wobble;

        self.transform = Transform {
            position: Vec3::new(0.0, lerp(self.start_height, self.end_height, eased), 0.0),
            rotation: Vec3::new(0.0, spin, wobble),
            scale: lerp(0.0, self.end_scale, eased),
        };
        write_instance(&mut self.buffer, &self.transform, self.color);
    }
}

impl Population for StarPopulation {
    fn label(&self) -> &'static str {
        LABEL
    }

    fn len(&self) -> usize {
        1
    }

    fn progress(&self) -> f32 {
        self.driver.progress()
    }

    fn update(&mut self, frame: &FrameInput) {
        self.driver.advance(frame.state, frame.elapsed);
        self.refresh(frame.total_elapsed);
    }

    fn snap_to(&mut self, state: TreeState, total_elapsed: f64) {
        self.driver.snap_to(state);
        self.refresh(total_elapsed);
    }

    fn instance_data(&self) -> &[f32] {
        &self.buffer
    }

    fn stride(&self) -> usize {
        INSTANCE_STRIDE
    }

    fn position(&self, index: usize) -> Option<Vec3> {
        read_instance_position(&self.buffer, index)
    }
}
