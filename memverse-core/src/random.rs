//! Random source helpers.
//!
//! Every generator takes the random source as an explicit `&mut R` where
//! `R: Rng + ?Sized`, so callers pick between a seeded [`StdRng`] for
//! reproducible worlds and `thread_rng()` for fresh ones.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform draw in `[min, max)`. Collapses to `min` for empty ranges instead
/// of panicking.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Uniform draw in `[-half_extent, half_extent)`.
pub fn symmetric<R: Rng + ?Sized>(rng: &mut R, half_extent: f32) -> f32 {
    uniform(rng, -half_extent, half_extent)
}

/// Build the world RNG: seeded when a seed is configured, entropy otherwise.
#[must_use]
pub fn world_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let v = uniform(&mut rng, 0.2, 0.4);
            assert!((0.2..0.4).contains(&v));
        }
    }

    #[test]
    fn empty_range_collapses_to_min() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!((uniform(&mut rng, 3.0, 3.0) - 3.0).abs() < f32::EPSILON);
        assert!((uniform(&mut rng, 3.0, 1.0) - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = world_rng(Some(99));
        let mut b = world_rng(Some(99));
        for _ in 0..10 {
            assert_eq!(a.r#gen::<u64>(), b.r#gen::<u64>());
        }
    }
}
