//! String lights spiralling around the tree
//!
//! Bulbs share one fixed size; what changes per frame is their position and
//! their emitted color, a fast blink under a brightness envelope that follows
//! assembly.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{read_instance_position, write_instance, Population, INSTANCE_STRIDE};
use crate::animation::{blend, ease, Easing, LightPalette, ProgressDriver, Transform};
use crate::error::{Result, TreeError};
use crate::layout::{self, ConeShape, Placement, ScatterBox};
use crate::math::{Color, Vec3};
use crate::state::{FrameInput, TreeState};

const LABEL: &str = "lights";
const SALT: u64 = 0x11_647;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightConfig {
    pub count: usize,
    pub approach_rate: f32,
    pub scatter_extent: f32,
    pub shape: ConeShape,
    /// Color on the bright half of the blink
    pub warm_color: String,
    /// Color on the dark half of the blink
    pub white_color: String,
    /// Emission multiplier, pushes bulbs past the bloom threshold
    pub gain: f32,
    pub bulb_scale: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            count: 400,
            approach_rate: 0.8,
            scatter_extent: 40.0,
            shape: ConeShape {
                base_radius: 6.2,
                tip_radius: 0.0,
                turns: 5.0,
                placement: Placement::Surface { offset: 0.2, jitter: 0.0 },
                ..Default::default()
            },
            warm_color: "#ffaa00".to_string(),
            white_color: "#fffae0".to_string(),
            gain: 10.0,
            bulb_scale: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightElement {
    pub disorder_position: Vec3,
    pub target_position: Vec3,
    /// Blink phase in [0, 2pi)
    pub phase: f32,
}

pub struct LightPopulation {
    elements: Vec<LightElement>,
    driver: ProgressDriver,
    palette: LightPalette,
    bulb_scale: f32,
    buffer: Vec<f32>,
}

impl LightPopulation {
    pub fn new(config: &LightConfig, seed: u64) -> Result<Self> {
        if !(config.gain.is_finite() && config.gain >= 0.0) {
            return Err(TreeError::InvalidParameter {
                name: "lights.gain",
                value: config.gain,
                reason: "must be finite and non-negative",
            });
        }
        if !(config.bulb_scale.is_finite() && config.bulb_scale > 0.0) {
            return Err(TreeError::InvalidParameter {
                name: "lights.bulb_scale",
                value: config.bulb_scale,
                reason: "must be positive",
            });
        }
        config.shape.validate(LABEL)?;

        let driver = ProgressDriver::new(config.approach_rate)?;
        let scatter = ScatterBox::new(LABEL, config.scatter_extent)?;
        let palette = LightPalette {
            warm: Color::from_hex(&config.warm_color)?,
            white: Color::from_hex(&config.white_color)?,
            gain: config.gain,
        };
        let shape = config.shape;

        let elements = layout::generate(LABEL, config.count, seed, SALT, |rng| LightElement {
            disorder_position: scatter.sample(rng),
            target_position: shape.sample(rng),
            phase: rng.gen::<f32>() * TAU,
        })?;

        Ok(Self::from_elements(elements, driver, palette, config.bulb_scale))
    }

    pub fn from_elements(
        elements: Vec<LightElement>,
        driver: ProgressDriver,
        palette: LightPalette,
        bulb_scale: f32,
    ) -> Self {
        let mut population = Self {
            buffer: vec![0.0; elements.len() * INSTANCE_STRIDE],
            elements,
            driver,
            palette,
            bulb_scale,
        };
        population.refresh(0.0);
        log::info!("lights ready: {} bulbs", population.elements.len());
        population
    }

    pub fn elements(&self) -> &[LightElement] {
        &self.elements
    }

    pub fn palette(&self) -> &LightPalette {
        &self.palette
    }

    /// Emitted color of bulb `index` as of the last update
    pub fn color(&self, index: usize) -> Option<Color> {
        let start = index.checked_mul(INSTANCE_STRIDE)?;
        let c = self.buffer.get(start + 16..start + 19)?;
        Some(Color::new(c[0], c[1], c[2]))
    }

    fn refresh(&mut self, time: f64) {
        let eased = ease(self.driver.progress(), Easing::Smoothstep);

        for (element, out) in self.elements.iter().zip(self.buffer.chunks_exact_mut(INSTANCE_STRIDE)) {
            let transform = Transform {
                position: blend::blend_position(element.disorder_position, element.target_position, eased),
                rotation: Vec3::ZERO,
                scale: self.bulb_scale,
            };
            let color = blend::light_color(time, element.phase, eased, &self.palette);
            write_instance(out, &transform, color);
        }
    }
}

impl Population for LightPopulation {
    fn label(&self) -> &'static str {
        LABEL
    }

    fn len(&self) -> usize {
        self.elements.len()
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

#[cfg(test)]
mod tests {
    use super::*;

    fn config(count: usize) -> LightConfig {
        LightConfig {
            count,
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(matches!(LightPopulation::new(&config(0), 1), Err(TreeError::EmptyPopulation("lights"))));

        let bad = LightConfig { warm_color: "#ffaa0".to_string(), ..config(10) };
        assert!(matches!(LightPopulation::new(&bad, 1), Err(TreeError::InvalidColor(_))));

        let bad = LightConfig { gain: f32::NAN, ..config(10) };
        assert!(LightPopulation::new(&bad, 1).is_err());
    }

    #[test]
    fn test_targets_spiral_on_surface() {
        let config = config(400);
        let population = LightPopulation::new(&config, 21).unwrap();
        for e in population.elements() {
            let t = e.target_position;
            assert!(t.y >= -9.0 && t.y <= 9.0);
            let n = config.shape.normalized_height(t.y);
            let expected = 6.2 * (1.0 - n) + 0.2;
            assert!((t.horizontal_length() - expected).abs() < 1e-3);
            assert!((0.0..TAU).contains(&e.phase));
            assert!(e.disorder_position.z.abs() <= 40.0);
        }
    }

    #[test]
    fn test_converges_to_targets() {
        let mut population = LightPopulation::new(&config(50), 2).unwrap();
        for frame in 0..3000 {
            let t = frame as f64 / 60.0;
            population.update(&FrameInput::new(TreeState::Assembled, 1.0 / 60.0, t));
        }
        for (i, e) in population.elements().iter().enumerate() {
            assert!(population.position(i).unwrap().distance(&e.target_position) < 1e-3);
        }
    }

    #[test]
    fn test_dim_while_dispersed() {
        let population = LightPopulation::new(&config(200), 6).unwrap();
        // Envelope floor 0.2 times gain 10 bounds every channel by 2
        for i in 0..population.len() {
            let c = population.color(i).unwrap();
            assert!(c.r <= 2.0 + 1e-4 && c.g <= 2.0 + 1e-4 && c.b <= 2.0 + 1e-4);
        }
    }

    #[test]
    fn test_colors_finite_for_long_sessions() {
        let mut population = LightPopulation::new(&config(100), 6).unwrap();
        for t in [1e5, 1e7, 3.0e7] {
            population.update(&FrameInput::new(TreeState::Assembled, 0.016, t));
            assert!(population.instance_data().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_fixed_bulb_scale() {
        let mut population = LightPopulation::new(&config(10), 3).unwrap();
        population.snap_to(TreeState::Assembled, 4.0);
        let data = population.instance_data();
        // Rotation is zero, so the diagonal holds the scale
        assert!((data[0] - 0.15).abs() < 1e-6);
        assert!((data[5] - 0.15).abs() < 1e-6);
        assert!((data[10] - 0.15).abs() < 1e-6);
    }
}
