//! Shaping functions applied to progress before blending

/// Easing function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Clamped linear
    Linear,
    /// Cubic ease-in-out, symmetric acceleration and deceleration (foliage)
    #[default]
    CubicInOut,
    /// Hermite smoothstep `3t² - 2t³` (lights, ornament settle)
    Smoothstep,
}

/// Apply easing function to a value t in range [0, 1]
pub fn ease(t: f32, easing: Easing) -> f32 {
    // NaN fails both comparisons of clamp's contract, so map it to the start
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    match easing {
        Easing::Linear => t,
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
            }
        }
        Easing::Smoothstep => t * t * (3.0 - 2.0 * t),
    }
}
