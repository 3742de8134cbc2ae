//! Per-element blend engine
//!
//! Pure functions from `(progress, static attributes, time)` to this frame's
//! outputs. Nothing here keeps state, so any element can be evaluated on its
//! own and the results never drift between frames. Every function returns a
//! finite value for finite attributes, whatever progress or time it is given.

use std::f64::consts::TAU;

use super::easing::{ease, Easing};
use crate::math::{Color, Mat4, Vec3};

/// Ornaments above this local progress get the smoothstep finish
pub const SETTLE_THRESHOLD: f32 = 0.8;
/// Extra radians of spin on X and Y while an ornament is fully in transit
pub const TRANSIT_SPIN: f32 = 2.0;
/// Light brightness in the chaos cloud, as a fraction of full brightness
pub const LIGHT_DIM_FLOOR: f32 = 0.2;
/// Blink angular speed (radians per second)
pub const BLINK_RATE: f64 = 3.0;

/// Largest spread accepted; keeps `1 - spread` away from zero
const MAX_SPREAD: f32 = 0.999;

/// Clamp into [0, 1], sending NaN to 0
pub fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// `sin(time * rate + phase)` with the time term reduced in double precision
fn periodic(time: f64, rate: f64, phase: f32) -> f32 {
    let time = if time.is_finite() { time } else { 0.0 };
    let angle = (time * rate).rem_euclid(TAU) as f32 + phase;
    angle.sin()
}

/// Staggered arrival: elements with a larger `offset` start later.
///
/// `local = clamp((p - offset * spread) / (1 - spread), 0, 1)`
pub fn staggered_local(progress: f32, offset: f32, spread: f32) -> f32 {
    let spread = clamp_unit(spread).min(MAX_SPREAD);
    clamp_unit((progress - offset * spread) / (1.0 - spread))
}

/// Weighted arrival: `local = clamp(p * weight, 0, 1)`
pub fn weighted_local(progress: f32, weight: f32) -> f32 {
    clamp_unit(progress * weight)
}

/// Two-phase ornament shaping: linear approach, smoothstep finish past the
/// threshold while the tree is assembling
pub fn settle_finish(local: f32, assembling: bool) -> f32 {
    let local = clamp_unit(local);
    if assembling && local > SETTLE_THRESHOLD {
        ease(local, Easing::Smoothstep)
    } else {
        local
    }
}

/// Componentwise lerp from disorder to target
pub fn blend_position(disorder: Vec3, target: Vec3, eased: f32) -> Vec3 {
    disorder.lerp(&target, clamp_unit(eased))
}

/// Seed rotation plus a spin term that fades out on arrival (Z is left alone)
pub fn transit_rotation(seed: Vec3, eased: f32) -> Vec3 {
    let spin = (1.0 - clamp_unit(eased)) * TRANSIT_SPIN;
    Vec3::new(seed.x + spin, seed.y + spin, seed.z)
}

/// Ornaments grow from half size to full size as they arrive
pub fn arrival_scale(base_scale: f32, eased: f32) -> f32 {
    base_scale * (0.5 + 0.5 * clamp_unit(eased))
}

/// Blink wave for a light, in [-1, 1]
pub fn blink(time: f64, phase: f32) -> f32 {
    periodic(time, BLINK_RATE, phase)
}

/// Colors and gain for the string lights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPalette {
    /// Shown on the positive half of the blink wave
    pub warm: Color,
    /// Shown on the non-positive half
    pub white: Color,
    /// Multiplier pushing the bulbs into bloom range
    pub gain: f32,
}

/// Emitted light color: a fast blink under a slow brightness envelope that
/// follows assembly (`eased`)
pub fn light_color(time: f64, phase: f32, eased: f32, palette: &LightPalette) -> Color {
    let wave = blink(time, phase);
    let base = if wave > 0.0 { palette.warm } else { palette.white };
    let envelope = LIGHT_DIM_FLOOR + (1.0 - LIGHT_DIM_FLOOR) * clamp_unit(eased);
    let intensity = (wave * 0.5 + 0.5).max(0.0) * envelope;
    base.scale(intensity * palette.gain)
}

/// Point-size multiplier for a foliage needle, in [0.8, 1.0]
pub fn breathing(time: f64, random: f32) -> f32 {
    periodic(time, 2.0, random * 10.0) * 0.1 + 0.9
}

/// Position, Euler rotation and uniform scale of one instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_translation_rotation_scale(self.position, self.rotation, self.scale)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> LightPalette {
        LightPalette {
            warm: Color::new(1.0, 0.666, 0.0),
            white: Color::new(1.0, 0.98, 0.878),
            gain: 10.0,
        }
    }

    #[test]
    fn test_staggered_stagger_scenario() {
        // Offsets [0, 0.3, 0.6], spread 0.3, progress jumps 0 -> 1
        let offsets = [0.0, 0.3, 0.6];
        for offset in offsets {
            assert_eq!(staggered_local(0.0, offset, 0.3), 0.0);
            assert_eq!(staggered_local(1.0, offset, 0.3), 1.0);
        }
        // (1 - 0.6 * 0.3) / 0.7 = 1.171.. clamps to 1
        assert_eq!(staggered_local(1.0, 0.6, 0.3), 1.0);
        // Worst case offset 1.0: (1 - 0.3) / 0.7 = 1
        assert!((staggered_local(1.0, 1.0, 0.3) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_staggered_higher_offset_lags() {
        let early = staggered_local(0.5, 0.1, 0.3);
        let late = staggered_local(0.5, 0.9, 0.3);
        assert!(early > late);
        assert!((early - (0.5 - 0.03) / 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_staggered_guards_degenerate_spread() {
        for spread in [1.0, 5.0, f32::NAN, -1.0] {
            let v = staggered_local(0.5, 0.5, spread);
            assert!(v.is_finite() && (0.0..=1.0).contains(&v), "spread {} gave {}", spread, v);
        }
        assert!(staggered_local(f32::NAN, 0.5, 0.3).is_finite());
    }

    #[test]
    fn test_weighted_local() {
        assert_eq!(weighted_local(0.5, 1.2), 0.6);
        assert_eq!(weighted_local(1.0, 1.2), 1.0);
        assert!((weighted_local(1.0, 0.6) - 0.6).abs() < 1e-6);
        assert_eq!(weighted_local(f32::NAN, 1.0), 0.0);
    }

    #[test]
    fn test_settle_finish_two_phase() {
        // Linear up to the threshold
        assert_eq!(settle_finish(0.5, true), 0.5);
        assert_eq!(settle_finish(0.8, true), 0.8);
        // Smoothstep past it while assembling
        assert!((settle_finish(0.9, true) - 0.972).abs() < 1e-5);
        assert_eq!(settle_finish(1.0, true), 1.0);
        // Scattering stays linear
        assert_eq!(settle_finish(0.9, false), 0.9);
    }

    #[test]
    fn test_blend_position_endpoints() {
        let disorder = Vec3::new(-20.0, 12.0, 3.0);
        let target = Vec3::new(1.0, -4.0, 2.0);
        assert_eq!(blend_position(disorder, target, 0.0), disorder);
        assert_eq!(blend_position(disorder, target, 1.0), target);
    }

    #[test]
    fn test_transit_rotation() {
        let seed = Vec3::new(0.1, 0.2, 0.3);
        let in_transit = transit_rotation(seed, 0.0);
        assert!((in_transit.x - 2.1).abs() < 1e-6);
        assert!((in_transit.y - 2.2).abs() < 1e-6);
        assert_eq!(in_transit.z, 0.3);
        assert_eq!(transit_rotation(seed, 1.0), seed);
    }

    #[test]
    fn test_arrival_scale() {
        assert_eq!(arrival_scale(0.8, 0.0), 0.4);
        assert_eq!(arrival_scale(0.8, 1.0), 0.8);
    }

    #[test]
    fn test_light_color_finite_and_non_negative() {
        let palette = palette();
        let times = [0.0, 0.016, 1.0, 123.456, 1e4, 1e7, f64::MAX, f64::NAN, f64::INFINITY];
        let phases = [0.0, 1.0, 3.14159, 6.28318];
        for time in times {
            for phase in phases {
                for eased in [0.0, 0.5, 1.0] {
                    let c = light_color(time, phase, eased, &palette);
                    assert!(c.is_finite(), "non-finite color at t={} phase={}", time, phase);
                    assert!(c.r >= 0.0 && c.g >= 0.0 && c.b >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_light_envelope_brightens_with_assembly() {
        let palette = palette();
        // phase pi/2 puts the blink at its peak at t=0
        let phase = std::f32::consts::FRAC_PI_2;
        let dim = light_color(0.0, phase, 0.0, &palette);
        let bright = light_color(0.0, phase, 1.0, &palette);
        assert!((dim.r - 2.0).abs() < 1e-4);
        assert!((bright.r - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_light_color_selects_by_wave_sign() {
        let palette = palette();
        let warm = light_color(0.0, std::f32::consts::FRAC_PI_2, 1.0, &palette);
        assert!((warm.b).abs() < 1e-6);

        // Trough: white color, but zero intensity
        let trough = light_color(0.0, -std::f32::consts::FRAC_PI_2, 1.0, &palette);
        assert!(trough.r.abs() < 1e-4);
    }

    #[test]
    fn test_periodic_terms_resolve_single_frames_at_large_times() {
        let frame = 1.0 / 60.0;
        for start in [1.0e7, 6.048e5 + 0.3] {
            assert_ne!(blink(start, 0.4), blink(start + frame, 0.4));
            assert_ne!(breathing(start, 0.4), breathing(start + frame, 0.4));
        }
    }

    #[test]
    fn test_breathing_range() {
        for i in 0..1000 {
            let b = breathing(i as f64 * 0.37, (i % 17) as f32 / 17.0);
            assert!((0.8 - 1e-6..=1.0 + 1e-6).contains(&b));
        }
        assert!(breathing(1e7, 0.5).is_finite());
    }

    #[test]
    fn test_transform_matrix() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::ZERO,
            scale: 2.0,
        };
        let p = t.to_matrix().transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert!((p.x - 3.0).abs() < 1e-6);
        assert!(t.is_finite());
    }
}
