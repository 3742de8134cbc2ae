//! Seeded, order-independent generation of element layouts
//!
//! Every element draws from its own random stream derived from
//! `(seed, salt, index)`, so element `i` is the same whether it is built
//! alone, in order, or out of order on another thread.

pub mod cone;

pub use cone::{ConeShape, Placement};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, TreeError};
use crate::math::Vec3;

/// Axis-aligned cube the chaos cloud is drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterBox {
    pub half_extent: f32,
}

impl ScatterBox {
    pub fn new(population: &'static str, half_extent: f32) -> Result<Self> {
        if !half_extent.is_finite() || half_extent <= 0.0 {
            return Err(TreeError::InvalidShape {
                population,
                reason: format!("scatter half-extent must be positive, got {}", half_extent),
            });
        }
        Ok(Self { half_extent })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let mut axis = || (rng.gen::<f32>() - 0.5) * 2.0 * self.half_extent;
        Vec3::new(axis(), axis(), axis())
    }
}

/// SplitMix64 finalizer, spreads nearby inputs across the whole range
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Random stream for one element of one population
pub fn element_rng(seed: u64, salt: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(mix64(mix64(seed ^ salt).wrapping_add(index as u64)))
}

/// Build `count` elements, each from its own stream.
///
/// `count == 0` is rejected: a population always has at least one element.
pub fn generate<T, F>(population: &'static str, count: usize, seed: u64, salt: u64, make: F) -> Result<Vec<T>>
where
    F: Fn(&mut StdRng) -> T,
{
    if count == 0 {
        return Err(TreeError::EmptyPopulation(population));
    }

    let elements: Vec<T> = (0..count)
        .map(|i| make(&mut element_rng(seed, salt, i)))
        .collect();

    log::debug!("generated {} '{}' elements (seed {:#x})", count, population, seed);
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_count_rejected() {
        let result = generate("foliage", 0, 1, 2, |rng| rng.gen::<f32>());
        assert!(matches!(result, Err(TreeError::EmptyPopulation("foliage"))));
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = generate("lights", 64, 42, 3, |rng| rng.gen::<u32>()).unwrap();
        let b = generate("lights", 64, 42, 3, |rng| rng.gen::<u32>()).unwrap();
        let c = generate("lights", 64, 43, 3, |rng| rng.gen::<u32>()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_elements_independent_of_count() {
        // Element i does not depend on how many were generated before it
        let small = generate("foliage", 10, 9, 1, |rng| rng.gen::<u64>()).unwrap();
        let large = generate("foliage", 100, 9, 1, |rng| rng.gen::<u64>()).unwrap();
        assert_eq!(&large[..10], &small[..]);

        let mut rng = element_rng(9, 1, 57);
        assert_eq!(large[57], rng.gen::<u64>());
    }

    #[test]
    fn test_salt_separates_populations() {
        let boxes = generate("boxes", 8, 5, 10, |rng| rng.gen::<u64>()).unwrap();
        let balls = generate("balls", 8, 5, 11, |rng| rng.gen::<u64>()).unwrap();
        assert_ne!(boxes, balls);
    }

    #[test]
    fn test_scatter_within_cube() {
        let scatter = ScatterBox::new("foliage", 25.0).unwrap();
        let mut rng = element_rng(1, 1, 1);
        for _ in 0..5000 {
            let p = scatter.sample(&mut rng);
            assert!(p.x.abs() <= 25.0 && p.y.abs() <= 25.0 && p.z.abs() <= 25.0);
        }
    }

    #[test]
    fn test_scatter_rejects_bad_extent() {
        assert!(ScatterBox::new("lights", 0.0).is_err());
        assert!(ScatterBox::new("lights", -4.0).is_err());
        assert!(ScatterBox::new("lights", f32::NAN).is_err());
    }
}
