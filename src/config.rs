//! Scene configuration
//!
//! Loaded from YAML. A document only needs the keys it wants to change: the
//! parsed document is merged over the serialized defaults before it is
//! deserialized, so `boxes: { count: 40 }` keeps every other box default.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{Result, TreeError};
use crate::math::{parse_palette, Color};
use crate::populations::{FoliageConfig, LightConfig, OrnamentConfig, OrnamentKind, StarConfig};

/// Seed used when neither the document nor the caller supplies one
pub const DEFAULT_SEED: u64 = 0x5EA5_0AB1_E7EE;

/// Post-processing and presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub background: String,
    /// Reinhard tone-mapping exposure
    pub exposure: f32,
    /// Luminance above which pixels feed the bloom
    pub bloom_threshold: f32,
    pub bloom_strength: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,
    /// Device pixel ratios above this are clamped for the foliage points
    pub max_pixel_ratio: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "#020402".to_string(),
            exposure: 1.5,
            bloom_threshold: 0.8,
            bloom_strength: 1.2,
            vignette_offset: 0.1,
            vignette_darkness: 1.1,
            max_pixel_ratio: 2.0,
        }
    }
}

/// Everything needed to build a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    /// Layout seed; `None` lets the caller pick one
    pub seed: Option<u64>,
    /// Start in the assembled state instead of the chaos cloud
    pub start_assembled: bool,
    /// Group spin about Y while assembled, radians per second
    pub assembled_spin: f32,
    /// Group spin about Y while dispersed, radians per second
    pub dispersed_spin: f32,
    pub foliage: FoliageConfig,
    pub boxes: OrnamentConfig,
    pub balls: OrnamentConfig,
    pub lights: LightConfig,
    pub star: StarConfig,
    pub render: RenderConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: None,
            start_assembled: false,
            assembled_spin: 0.12,
            dispersed_spin: 0.03,
            foliage: FoliageConfig::default(),
            boxes: OrnamentConfig::boxes(),
            balls: OrnamentConfig::balls(),
            lights: LightConfig::default(),
            star: StarConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse a (possibly partial) YAML document over the defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut merged = serde_yaml::to_value(SceneConfig::default())?;

        if !yaml.trim().is_empty() {
            let overlay: Value = serde_yaml::from_str(yaml)?;
            if !overlay.is_null() {
                merge(&mut merged, overlay);
            }
        }

        let config: SceneConfig = serde_yaml::from_value(merged)?;
        config.validate()?;

        log::info!(
            "scene config loaded: {} needles, {} boxes, {} balls, {} lights",
            config.foliage.count,
            config.boxes.count,
            config.balls.count,
            config.lights.count
        );
        Ok(config)
    }

    /// The defaults as a YAML document, handy as a template
    pub fn default_yaml() -> Result<String> {
        Ok(serde_yaml::to_string(&SceneConfig::default())?)
    }

    pub fn seed_or(&self, fallback: u64) -> u64 {
        self.seed.unwrap_or(fallback)
    }

    /// Check everything that can be checked without generating elements
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("foliage", self.foliage.count),
            (self.boxes.kind.label(), self.boxes.count),
            (self.balls.kind.label(), self.balls.count),
            ("lights", self.lights.count),
        ];
        for (population, count) in counts {
            if count == 0 {
                return Err(TreeError::EmptyPopulation(population));
            }
        }

        for (section, expected) in [(&self.boxes, OrnamentKind::Box), (&self.balls, OrnamentKind::Ball)] {
            if section.kind != expected {
                return Err(TreeError::InvalidShape {
                    population: expected.label(),
                    reason: format!("section holds {:?} ornaments", section.kind),
                });
            }
            parse_palette(section.kind.label(), &section.palette)?;
            Color::from_hex(&section.emissive)?;
            section.shape.validate(section.kind.label())?;
        }

        if !(0.0..1.0).contains(&self.foliage.spread) {
            return Err(TreeError::InvalidParameter {
                name: "foliage.spread",
                value: self.foliage.spread,
                reason: "must be in [0, 1)",
            });
        }
        self.foliage.shape.validate("foliage")?;
        self.lights.shape.validate("lights")?;

        let rates = [
            ("foliage.approach_rate", self.foliage.approach_rate),
            ("boxes.approach_rate", self.boxes.approach_rate),
            ("balls.approach_rate", self.balls.approach_rate),
            ("lights.approach_rate", self.lights.approach_rate),
            ("star.approach_rate", self.star.approach_rate),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(TreeError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and non-negative",
                });
            }
        }

        for (name, value) in [("assembled_spin", self.assembled_spin), ("dispersed_spin", self.dispersed_spin)] {
            if !value.is_finite() {
                return Err(TreeError::InvalidParameter { name, value, reason: "must be finite" });
            }
        }

        self.render.validate()
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        Color::from_hex(&self.background)?;

        let params = [
            ("render.exposure", self.exposure),
            ("render.bloom_threshold", self.bloom_threshold),
            ("render.bloom_strength", self.bloom_strength),
            ("render.vignette_offset", self.vignette_offset),
            ("render.vignette_darkness", self.vignette_darkness),
        ];
        for (name, value) in params {
            if !value.is_finite() || value < 0.0 {
                return Err(TreeError::InvalidParameter {
                    name,
                    value,
                    reason: "must be finite and non-negative",
                });
            }
        }
        if !(self.max_pixel_ratio.is_finite() && self.max_pixel_ratio >= 1.0) {
            return Err(TreeError::InvalidParameter {
                name: "render.max_pixel_ratio",
                value: self.max_pixel_ratio,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Recursively overlay `overlay` onto `base`.
///
/// Mappings merge key by key. A mapping whose `kind` tag changes is replaced
/// outright, since its remaining keys belong to a different variant.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            let tag = Value::String("kind".to_string());
            if let (Some(old), Some(new)) = (base.get(&tag), overlay.get(&tag)) {
                if old != new {
                    *base = overlay;
                    return;
                }
            }
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Placement;

    #[test]
    fn test_empty_document_gives_defaults() {
        assert_eq!(SceneConfig::from_yaml("").unwrap(), SceneConfig::default());
        assert_eq!(SceneConfig::from_yaml("{}").unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_sibling_defaults() {
        let yaml = r#"
seed: 42
boxes:
  count: 12
lights:
  shape:
    turns: 3.0
"#;
        let config = SceneConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.boxes.count, 12);
        assert_eq!(config.boxes.palette, OrnamentConfig::boxes().palette);
        assert_eq!(config.boxes.weight, 0.8);
        assert_eq!(config.lights.shape.turns, 3.0);
        assert_eq!(config.lights.shape.base_radius, 6.2);
        assert_eq!(config.balls, OrnamentConfig::balls());
    }

    #[test]
    fn test_placement_variant_switch() {
        let yaml = r#"
foliage:
  shape:
    placement:
      kind: surface
      offset: 0.3
"#;
        let config = SceneConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.foliage.shape.placement, Placement::Surface { offset: 0.3, jitter: 0.0 });
    }

    #[test]
    fn test_default_yaml_round_trips() {
        let yaml = SceneConfig::default_yaml().unwrap();
        assert_eq!(SceneConfig::from_yaml(&yaml).unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        let result = SceneConfig::from_yaml("foliage: [unclosed");
        assert!(matches!(result, Err(TreeError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(matches!(SceneConfig::from_yaml("folage: {}"), Err(TreeError::Config(_))));
        assert!(matches!(SceneConfig::from_yaml("star: { sparkle: 1 }"), Err(TreeError::Config(_))));
    }

    #[test]
    fn test_validation_failures() {
        assert!(matches!(
            SceneConfig::from_yaml("lights: { count: 0 }"),
            Err(TreeError::EmptyPopulation("lights"))
        ));
        assert!(matches!(
            SceneConfig::from_yaml("balls: { palette: [] }"),
            Err(TreeError::EmptyPalette("balls"))
        ));
        assert!(matches!(
            SceneConfig::from_yaml("boxes: { palette: ['#12345'] }"),
            Err(TreeError::InvalidColor(_))
        ));
        assert!(SceneConfig::from_yaml("foliage: { spread: 1.2 }").is_err());
        assert!(SceneConfig::from_yaml("star: { approach_rate: -2.0 }").is_err());
        assert!(SceneConfig::from_yaml("render: { max_pixel_ratio: 0.5 }").is_err());
        assert!(SceneConfig::from_yaml("boxes: { kind: ball }").is_err());
        assert!(matches!(
            SceneConfig::from_yaml("lights: { shape: { height_min: -3.0e38, height_max: 3.0e38 } }"),
            Err(TreeError::InvalidShape { population: "lights", .. })
        ));
    }

    #[test]
    fn test_seed_fallback() {
        let config = SceneConfig::default();
        assert_eq!(config.seed_or(DEFAULT_SEED), DEFAULT_SEED);
        let config = SceneConfig { seed: Some(3), ..Default::default() };
        assert_eq!(config.seed_or(DEFAULT_SEED), 3);
    }
}
