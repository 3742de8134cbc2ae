//! Orbit camera around the tree's centre

use std::f32::consts::PI;

use crate::math::{Mat4, Vec3};

pub const MIN_DISTANCE: f32 = 10.0;
pub const MAX_DISTANCE: f32 = 35.0;
pub const MIN_POLAR: f32 = PI / 3.0;
pub const MAX_POLAR: f32 = PI / 1.8;

/// Radians per pixel of drag
const ORBIT_SPEED: f32 = 0.01;
/// Distance per wheel unit
const ZOOM_SPEED: f32 = 0.02;

/// Spherical camera looking at the origin; no panning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub distance: f32,
    /// Angle about Y, 0 looks down -Z from +Z
    pub azimuth: f32,
    /// Angle from +Y
    pub polar: f32,
    /// Vertical field of view, radians
    pub fov: f32,
}

impl Default for OrbitCamera {
    /// Starts at (0, 2, 22)
    fn default() -> Self {
        Self::from_position(Vec3::new(0.0, 2.0, 22.0), 45f32.to_radians())
    }
}

impl OrbitCamera {
    pub fn from_position(position: Vec3, fov: f32) -> Self {
        let distance = position.length().max(f32::EPSILON);
        let camera = Self {
            distance,
            azimuth: position.x.atan2(position.z),
            polar: (position.y / distance).clamp(-1.0, 1.0).acos(),
            fov,
        };
        camera.constrained()
    }

    fn constrained(mut self) -> Self {
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.polar = self.polar.clamp(MIN_POLAR, MAX_POLAR);
        self
    }

    pub fn position(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        Vec3::new(
            self.distance * sin_p * sin_a,
            self.distance * cos_p,
            self.distance * sin_p * cos_a,
        )
    }

    /// Drag by `(dx, dy)` pixels
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.azimuth = (self.azimuth - dx * ORBIT_SPEED).rem_euclid(2.0 * PI);
        self.polar = (self.polar - dy * ORBIT_SPEED).clamp(MIN_POLAR, MAX_POLAR);
    }

    /// Positive `delta` moves away from the tree
    pub fn zoom(&mut self, delta: f32) {
        if !delta.is_finite() {
            return;
        }
        self.distance = (self.distance + delta * ZOOM_SPEED).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position(), Vec3::ZERO, Vec3::UP)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective(self.fov, aspect.max(f32::EPSILON), 0.1, 200.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_position() {
        let camera = OrbitCamera::default();
        let p = camera.position();
        assert!(p.distance(&Vec3::new(0.0, 2.0, 22.0)) < 1e-4);
        assert!((camera.fov - 45f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = OrbitCamera::default();
        camera.zoom(1e6);
        assert_eq!(camera.distance, MAX_DISTANCE);
        camera.zoom(-1e6);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.zoom(f32::NAN);
        assert_eq!(camera.distance, MIN_DISTANCE);
    }

    #[test]
    fn test_polar_clamped() {
        let mut camera = OrbitCamera::default();
        camera.orbit(0.0, 1e4);
        assert_eq!(camera.polar, MIN_POLAR);
        camera.orbit(0.0, -1e4);
        assert_eq!(camera.polar, MAX_POLAR);
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let mut camera = OrbitCamera::default();
        let before = camera.position().length();
        camera.orbit(250.0, 0.0);
        assert!((camera.position().length() - before).abs() < 1e-3);
        assert!((0.0..2.0 * PI).contains(&camera.azimuth));
    }

    #[test]
    fn test_from_position_clamps() {
        let camera = OrbitCamera::from_position(Vec3::new(0.0, 100.0, 1.0), 1.0);
        assert_eq!(camera.distance, MAX_DISTANCE);
        assert_eq!(camera.polar, MIN_POLAR);
    }
}
