//! Population controllers
//!
//! Each controller owns a fixed arena of elements, one progress driver and
//! a preallocated instance buffer that is rewritten in place every frame.

mod foliage;
mod lights;
mod ornaments;
mod star;

pub use foliage::{FoliageConfig, FoliageElement, FoliagePopulation};
pub use lights::{LightConfig, LightElement, LightPopulation};
pub use ornaments::{OrnamentConfig, OrnamentElement, OrnamentKind, OrnamentPopulation};
pub use star::{StarConfig, StarPopulation};

use crate::animation::Transform;
use crate::math::{Color, Vec3};
use crate::state::{FrameInput, TreeState};

/// Floats per foliage point: position(3) + size(1) + color(3) + random(1)
pub const POINT_STRIDE: usize = 8;

/// Floats per mesh instance: model matrix(16) + color(3)
pub const INSTANCE_STRIDE: usize = 19;

/// A fixed-size set of elements animated by one progress driver
pub trait Population {
    /// Short name used in logs and errors
    fn label(&self) -> &'static str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current global progress in [0, 1]
    fn progress(&self) -> f32;

    /// Advance the progress driver and rewrite the instance buffer
    fn update(&mut self, frame: &FrameInput);

    /// Jump straight to a state and rewrite the buffer at `total_elapsed`
    fn snap_to(&mut self, state: TreeState, total_elapsed: f64);

    /// Flat per-instance data, `stride()` floats per element
    fn instance_data(&self) -> &[f32];

    fn stride(&self) -> usize;

    /// Rendered position of element `index` this frame
    fn position(&self, index: usize) -> Option<Vec3>;
}

pub(crate) fn write_point(out: &mut [f32], position: Vec3, size: f32, color: Color, random: f32) {
    out[0] = position.x;
    out[1] = position.y;
    out[2] = position.z;
    out[3] = size;
    out[4] = color.r;
    out[5] = color.g;
    out[6] = color.b;
    out[7] = random;
}

pub(crate) fn write_instance(out: &mut [f32], transform: &Transform, color: Color) {
    out[..16].copy_from_slice(transform.to_matrix().as_slice());
    out[16] = color.r;
    out[17] = color.g;
    out[18] = color.b;
}

pub(crate) fn read_point_position(data: &[f32], index: usize) -> Option<Vec3> {
    let start = index.checked_mul(POINT_STRIDE)?;
    let p = data.get(start..start + 3)?;
    Some(Vec3::new(p[0], p[1], p[2]))
}

pub(crate) fn read_instance_position(data: &[f32], index: usize) -> Option<Vec3> {
    let start = index.checked_mul(INSTANCE_STRIDE)?;
    let p = data.get(start + 12..start + 15)?;
    Some(Vec3::new(p[0], p[1], p[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_round_trip() {
        let mut buffer = vec![0.0; POINT_STRIDE * 2];
        write_point(&mut buffer[POINT_STRIDE..], Vec3::new(1.0, 2.0, 3.0), 1.5, Color::WHITE, 0.25);
        assert_eq!(read_point_position(&buffer, 1), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(buffer[POINT_STRIDE + 3], 1.5);
        assert_eq!(buffer[POINT_STRIDE + 7], 0.25);
        assert_eq!(read_point_position(&buffer, 2), None);
    }

    #[test]
    fn test_instance_layout() {
        let mut buffer = vec![0.0; INSTANCE_STRIDE];
        let transform = Transform {
            position: Vec3::new(4.0, 5.0, 6.0),
            rotation: Vec3::ZERO,
            scale: 0.5,
        };
        write_instance(&mut buffer, &transform, Color::new(0.1, 0.2, 0.3));
        assert_eq!(read_instance_position(&buffer, 0), Some(Vec3::new(4.0, 5.0, 6.0)));
        assert_eq!(buffer[0], 0.5);
        assert_eq!(&buffer[16..], &[0.1, 0.2, 0.3]);
        assert_eq!(read_instance_position(&buffer, 1), None);
    }
}
