//! Ornaments: gift boxes and baubles hung on the cone's surface
//!
//! Each ornament's progress is the global progress scaled by its speed
//! weight, so the two kinds move at visibly different paces. Ornaments spin
//! while in transit and grow from half size as they arrive.

use std::f32::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{read_instance_position, write_instance, Population, INSTANCE_STRIDE};
use crate::animation::{blend, ProgressDriver, Transform};
use crate::error::{Result, TreeError};
use crate::layout::{self, ConeShape, Placement, ScatterBox};
use crate::math::{parse_palette, Color, Vec3};
use crate::state::{FrameInput, TreeState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrnamentKind {
    /// Gift boxes: larger, heavier, slower
    Box,
    /// Baubles: smaller, lighter, faster
    Ball,
}

impl OrnamentKind {
    pub fn label(self) -> &'static str {
        match self {
            OrnamentKind::Box => "boxes",
            OrnamentKind::Ball => "balls",
        }
    }

    fn salt(self) -> u64 {
        match self {
            OrnamentKind::Box => 0x0B0C_5E5,
            OrnamentKind::Ball => 0x0BA1_1E5,
        }
    }
}

/// Parameters for one ornament sub-type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrnamentConfig {
    pub kind: OrnamentKind,
    pub count: usize,
    pub approach_rate: f32,
    pub scatter_extent: f32,
    pub shape: ConeShape,
    /// Hex colors, one picked uniformly per ornament
    pub palette: Vec<String>,
    /// Scales are drawn from `[scale_min, scale_min + scale_range)`
    pub scale_min: f32,
    pub scale_range: f32,
    /// Multiplies the per-ornament speed draw; below 1 reads as heavy
    pub weight: f32,
    /// Speed draw is `[speed_min, speed_min + speed_range)` before weighting
    pub speed_min: f32,
    pub speed_range: f32,
    /// Material glow color for the whole sub-type
    pub emissive: String,
}

fn ornament_shape() -> ConeShape {
    ConeShape {
        height_min: -8.0,
        height_max: 8.0,
        base_radius: 5.5,
        tip_radius: 0.0,
        placement: Placement::Surface { offset: 0.0, jitter: 0.5 },
        ..Default::default()
    }
}

impl OrnamentConfig {
    pub fn boxes() -> Self {
        Self {
            kind: OrnamentKind::Box,
            count: 80,
            approach_rate: 1.0,
            scatter_extent: 30.0,
            shape: ornament_shape(),
            palette: ["#B22222", "#FFD700", "#C0C0C0", "#800000"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            scale_min: 0.6,
            scale_range: 0.4,
            weight: 0.8,
            speed_min: 0.5,
            speed_range: 0.5,
            emissive: "#000000".to_string(),
        }
    }

    pub fn balls() -> Self {
        Self {
            kind: OrnamentKind::Ball,
            count: 300,
            palette: ["#FFD700", "#006400", "#B22222", "#DAA520"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            scale_min: 0.4,
            weight: 1.2,
            emissive: "#070707".to_string(),
            ..Self::boxes()
        }
    }
}

/// One box or bauble
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrnamentElement {
    pub disorder_position: Vec3,
    pub target_position: Vec3,
    /// Euler XYZ rotation at rest
    pub rotation: Vec3,
    pub scale: f32,
    pub color: Color,
    /// Multiplies global progress into this ornament's local progress
    pub speed: f32,
}

pub struct OrnamentPopulation {
    kind: OrnamentKind,
    elements: Vec<OrnamentElement>,
    driver: ProgressDriver,
    emissive: Color,
    buffer: Vec<f32>,
}

impl OrnamentPopulation {
    pub fn new(config: &OrnamentConfig, seed: u64) -> Result<Self> {
        let label = config.kind.label();

        let ranges = [
            ("ornament.scale_min", config.scale_min, config.scale_min > 0.0),
            ("ornament.scale_range", config.scale_range, config.scale_range >= 0.0),
            ("ornament.weight", config.weight, config.weight > 0.0),
            ("ornament.speed_min", config.speed_min, config.speed_min >= 0.0),
            ("ornament.speed_range", config.speed_range, config.speed_range >= 0.0),
        ];
        for (name, value, ok) in ranges {
            if !ok || !value.is_finite() {
                return Err(TreeError::InvalidParameter {
                    name,
                    value,
                    reason: "out of range",
                });
            }
        }
        config.shape.validate(label)?;

        let driver = ProgressDriver::new(config.approach_rate)?;
        let scatter = ScatterBox::new(label, config.scatter_extent)?;
        let palette = parse_palette(label, &config.palette)?;
        let emissive = Color::from_hex(&config.emissive)?;
        let shape = config.shape;

        let elements = layout::generate(label, config.count, seed, config.kind.salt(), |rng| {
            let disorder_position = scatter.sample(rng);
            let target_position = shape.sample(rng);
            let rotation = Vec3::new(rng.gen::<f32>() * PI, rng.gen::<f32>() * PI, rng.gen::<f32>() * PI);
            let scale = config.scale_min + rng.gen::<f32>() * config.scale_range;
            let color = palette[rng.gen_range(0..palette.len())];
            let speed = (config.speed_min + rng.gen::<f32>() * config.speed_range) * config.weight;

            OrnamentElement {
                disorder_position,
                target_position,
                rotation,
                scale,
                color,
                speed,
            }
        })?;

        Ok(Self::from_elements(config.kind, elements, driver, emissive))
    }

    pub fn from_elements(
        kind: OrnamentKind,
        elements: Vec<OrnamentElement>,
        driver: ProgressDriver,
        emissive: Color,
    ) -> Self {
        let mut population = Self {
            kind,
            buffer: vec![0.0; elements.len() * INSTANCE_STRIDE],
            elements,
            driver,
            emissive,
        };
        population.refresh(false);
        log::info!("{} ready: {} ornaments", kind.label(), population.elements.len());
        population
    }

    pub fn kind(&self) -> OrnamentKind {
        self.kind
    }

    pub fn emissive(&self) -> Color {
        self.emissive
    }

    pub fn elements(&self) -> &[OrnamentElement] {
        &self.elements
    }

    /// This frame's transform for one ornament
    pub fn transform(element: &OrnamentElement, progress: f32, assembling: bool) -> Transform {
        let local = blend::weighted_local(progress, element.speed);
        let shaped = blend::settle_finish(local, assembling);

        Transform {
            position: blend::blend_position(element.disorder_position, element.target_position, shaped),
            rotation: blend::transit_rotation(element.rotation, shaped),
            scale: blend::arrival_scale(element.scale, shaped),
        }
    }

    fn refresh(&mut self, assembling: bool) {
        let progress = self.driver.progress();

        for (element, out) in self.elements.iter().zip(self.buffer.chunks_exact_mut(INSTANCE_STRIDE)) {
            let transform = Self::transform(element, progress, assembling);
            write_instance(out, &transform, element.color);
        }
    }
}

impl Population for OrnamentPopulation {
    fn label(&self) -> &'static str {
        self.kind.label()
    }

    fn len(&self) -> usize {
        self.elements.len()
    }

    fn progress(&self) -> f32 {
        self.driver.progress()
    }

    fn update(&mut self, frame: &FrameInput) {
        self.driver.advance(frame.state, frame.elapsed);
        self.refresh(frame.state.is_assembled());
    }

    fn snap_to(&mut self, state: TreeState, _total_elapsed: f64) {
        self.driver.snap_to(state);
        self.refresh(state.is_assembled());
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

    fn element(speed: f32) -> OrnamentElement {
        OrnamentElement {
            disorder_position: Vec3::new(12.0, -7.0, 4.0),
            target_position: Vec3::new(2.0, 1.0, -3.0),
            rotation: Vec3::new(0.5, 1.0, 1.5),
            scale: 0.8,
            color: Color::WHITE,
            speed,
        }
    }

    #[test]
    fn test_kind_defaults() {
        let boxes = OrnamentConfig::boxes();
        let balls = OrnamentConfig::balls();
        assert_eq!(boxes.kind, OrnamentKind::Box);
        assert_eq!(balls.kind, OrnamentKind::Ball);
        assert!(boxes.weight < balls.weight);
        assert!(boxes.scale_min > balls.scale_min);
        assert_eq!(balls.count, 300);
        assert_eq!(balls.shape, boxes.shape);
    }

    #[test]
    fn test_rejects_empty_and_bad_palette() {
        let config = OrnamentConfig { count: 0, ..OrnamentConfig::boxes() };
        assert!(matches!(OrnamentPopulation::new(&config, 1), Err(TreeError::EmptyPopulation("boxes"))));

        let config = OrnamentConfig { palette: vec![], ..OrnamentConfig::boxes() };
        assert!(matches!(OrnamentPopulation::new(&config, 1), Err(TreeError::EmptyPalette("boxes"))));

        let config = OrnamentConfig { palette: vec!["#zz0000".to_string()], ..OrnamentConfig::balls() };
        assert!(matches!(OrnamentPopulation::new(&config, 1), Err(TreeError::InvalidColor(_))));

        let config = OrnamentConfig { weight: 0.0, ..OrnamentConfig::balls() };
        assert!(OrnamentPopulation::new(&config, 1).is_err());
    }

    #[test]
    fn test_generated_attributes() {
        let config = OrnamentConfig::boxes();
        let population = OrnamentPopulation::new(&config, 4).unwrap();
        let palette = parse_palette("boxes", &config.palette).unwrap();

        for e in population.elements() {
            assert!((0.6..1.0).contains(&e.scale));
            assert!((0.4..0.8).contains(&e.speed), "box speed {}", e.speed);
            assert!(palette.contains(&e.color));
            assert!(e.rotation.x >= 0.0 && e.rotation.x < PI);
            assert!(e.disorder_position.y.abs() <= 30.0);
            assert!(e.target_position.y >= -8.0 && e.target_position.y <= 8.0);
        }
    }

    #[test]
    fn test_dispersed_start_is_disorder() {
        let population = OrnamentPopulation::new(&OrnamentConfig::balls(), 8).unwrap();
        for (i, e) in population.elements().iter().enumerate() {
            assert_eq!(population.position(i), Some(e.disorder_position));
        }
    }

    #[test]
    fn test_weighted_progress_lags_heavy_ornaments() {
        let heavy = OrnamentPopulation::transform(&element(0.5), 0.6, true);
        let light = OrnamentPopulation::transform(&element(1.2), 0.6, true);
        let target = element(1.0).target_position;
        assert!(heavy.position.distance(&target) > light.position.distance(&target));
    }

    #[test]
    fn test_heavy_ornament_never_fully_arrives() {
        // Multiplicative weight below 1 caps local progress at the weight
        let t = OrnamentPopulation::transform(&element(0.5), 1.0, true);
        let e = element(0.5);
        let expected = e.disorder_position.lerp(&e.target_position, 0.5);
        assert!(t.position.distance(&expected) < 1e-5);
    }

    #[test]
    fn test_arrival_transform() {
        let e = element(1.2);
        let t = OrnamentPopulation::transform(&e, 1.0, true);
        assert!(t.position.distance(&e.target_position) < 1e-5);
        assert_eq!(t.rotation, e.rotation);
        assert_eq!(t.scale, e.scale);

        let start = OrnamentPopulation::transform(&e, 0.0, false);
        assert_eq!(start.position, e.disorder_position);
        assert!((start.rotation.x - (e.rotation.x + 2.0)).abs() < 1e-6);
        assert_eq!(start.scale, e.scale * 0.5);
    }

    #[test]
    fn test_settle_only_while_assembling() {
        let e = element(1.0);
        let assembling = OrnamentPopulation::transform(&e, 0.9, true);
        let scattering = OrnamentPopulation::transform(&e, 0.9, false);
        let target = e.target_position;
        assert!(assembling.position.distance(&target) < scattering.position.distance(&target));
    }

    #[test]
    fn test_converges_when_weight_allows() {
        let driver = ProgressDriver::new(1.0).unwrap();
        let mut population = OrnamentPopulation::from_elements(
            OrnamentKind::Ball,
            vec![element(1.0), element(1.2), element(1.5)],
            driver,
            Color::BLACK,
        );

        for _ in 0..3000 {
            population.update(&FrameInput::new(TreeState::Assembled, 1.0 / 60.0, 0.0));
        }
        for (i, e) in population.elements().iter().enumerate() {
            assert!(population.position(i).unwrap().distance(&e.target_position) < 1e-3);
        }
    }

    #[test]
    fn test_instance_buffer_finite() {
        let mut population = OrnamentPopulation::new(&OrnamentConfig::boxes(), 12).unwrap();
        population.update(&FrameInput::new(TreeState::Assembled, 0.3, 0.3));
        assert_eq!(population.instance_data().len(), 80 * INSTANCE_STRIDE);
        assert!(population.instance_data().iter().all(|v| v.is_finite()));
    }
}
