//! Foliage: the needle point cloud
//!
//! Thousands of points fill the cone's volume. Each point's arrival is
//! staggered by its random offset, which gives the transition the look of
//! settling dust instead of a rigid morph.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{read_point_position, write_point, Population, POINT_STRIDE};
use crate::animation::{blend, ease, Easing, ProgressDriver};
use crate::error::{Result, TreeError};
use crate::layout::{self, ConeShape, ScatterBox};
use crate::math::{Color, Vec3};
use crate::state::{FrameInput, TreeState};

const LABEL: &str = "foliage";
const SALT: u64 = 0xF0_11A6E;

/// Foliage parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FoliageConfig {
    pub count: usize,
    /// Progress driver approach rate (per second)
    pub approach_rate: f32,
    /// How far apart arrival times are spread, in [0, 1)
    pub spread: f32,
    /// Half-width of the chaos cube
    pub scatter_extent: f32,
    pub shape: ConeShape,
    /// Needle colors are mixed between these two
    pub base_color: String,
    pub tip_color: String,
    /// Rare sparkle color
    pub accent_color: String,
    /// Probability a needle takes the accent color
    pub accent_chance: f32,
    pub size_min: f32,
    pub size_max: f32,
}

impl Default for FoliageConfig {
    fn default() -> Self {
        Self {
            count: 15_000,
            approach_rate: 1.5,
            spread: 0.3,
            scatter_extent: 25.0,
            shape: ConeShape::default(),
            base_color: "#004225".to_string(),
            tip_color: "#0f5f38".to_string(),
            accent_color: "#FFD700".to_string(),
            accent_chance: 0.05,
            size_min: 0.5,
            size_max: 2.0,
        }
    }
}

/// One needle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoliageElement {
    pub disorder_position: Vec3,
    pub target_position: Vec3,
    pub color: Color,
    pub size: f32,
    /// Uniform in [0, 1); delays arrival and phases the breathing
    pub offset: f32,
}

pub struct FoliagePopulation {
    elements: Vec<FoliageElement>,
    driver: ProgressDriver,
    spread: f32,
    buffer: Vec<f32>,
}

impl FoliagePopulation {
    pub fn new(config: &FoliageConfig, seed: u64) -> Result<Self> {
        if !(0.0..1.0).contains(&config.spread) {
            return Err(TreeError::InvalidParameter {
                name: "foliage.spread",
                value: config.spread,
                reason: "must be in [0, 1)",
            });
        }
        if !(0.0..=1.0).contains(&config.accent_chance) {
            return Err(TreeError::InvalidParameter {
                name: "foliage.accent_chance",
                value: config.accent_chance,
                reason: "must be a probability in [0, 1]",
            });
        }
        if !(config.size_min > 0.0 && config.size_max > config.size_min && config.size_max.is_finite()) {
            return Err(TreeError::InvalidParameter {
                name: "foliage.size_max",
                value: config.size_max,
                reason: "sizes must satisfy 0 < size_min < size_max",
            });
        }
        config.shape.validate(LABEL)?;

        let driver = ProgressDriver::new(config.approach_rate)?;
        let scatter = ScatterBox::new(LABEL, config.scatter_extent)?;
        let base = Color::from_hex(&config.base_color)?;
        let tip = Color::from_hex(&config.tip_color)?;
        let accent = Color::from_hex(&config.accent_color)?;
        let shape = config.shape;
        let accent_chance = config.accent_chance as f64;
        let size_range = config.size_min..config.size_max;

        let elements = layout::generate(LABEL, config.count, seed, SALT, |rng| {
            let target_position = shape.sample(rng);
            let disorder_position = scatter.sample(rng);
            let color = if rng.gen_bool(accent_chance) {
                accent
            } else {
                base.lerp(&tip, rng.gen::<f32>())
            };

            FoliageElement {
                disorder_position,
                target_position,
                color,
                size: rng.gen_range(size_range.clone()),
                offset: rng.gen::<f32>(),
            }
        })?;

        Ok(Self::from_elements(elements, driver, config.spread))
    }

    /// Build from explicit elements, mainly for scenarios with known offsets
    pub fn from_elements(elements: Vec<FoliageElement>, driver: ProgressDriver, spread: f32) -> Self {
        let mut population = Self {
            buffer: vec![0.0; elements.len() * POINT_STRIDE],
            elements,
            driver,
            spread,
        };
        population.refresh(0.0);
        log::info!("foliage ready: {} needles", population.elements.len());
        population
    }

    pub fn elements(&self) -> &[FoliageElement] {
        &self.elements
    }

    /// Per-element local progress for the current global progress
    pub fn local_progress(&self, index: usize) -> Option<f32> {
        let element = self.elements.get(index)?;
        Some(blend::staggered_local(self.driver.progress(), element.offset, self.spread))
    }

    fn refresh(&mut self, time: f64) {
        let progress = self.driver.progress();
        let spread = self.spread;

        for (element, out) in self.elements.iter().zip(self.buffer.chunks_exact_mut(POINT_STRIDE)) {
            let local = blend::staggered_local(progress, element.offset, spread);
            let eased = ease(local, Easing::CubicInOut);
            let position = blend::blend_position(element.disorder_position, element.target_position, eased);
            let size = element.size * blend::breathing(time, element.offset);
            write_point(out, position, size, element.color, element.offset);
        }
    }
}

impl Population for FoliagePopulation {
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
        POINT_STRIDE
    }

    fn position(&self, index: usize) -> Option<Vec3> {
        read_point_position(&self.buffer, index)
    }
}
