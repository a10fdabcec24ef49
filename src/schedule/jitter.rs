//! Deterministic per-device jitter.
//!
//! Jitter spreads a population of devices across a window instead of letting
//! them all fire on the same aligned grid point. The offset is a pure function
//! of the device seed and the slot being armed, so re-arming the same slot on
//! the same device reproduces the same fire time, while other devices land
//! elsewhere in the window.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::MathError;

/// Deterministic uniform value in `[lower, upper]`, both bounds inclusive.
///
/// The same `seed` always yields the same value; across many seeds the values
/// are approximately uniform over the range.
///
/// # Errors
/// Returns [`MathError::InvertedRange`] when `upper < lower`.
///
/// # Example
/// ```
/// use ticksync::schedule::random_in_range;
///
/// let v = random_in_range(42, 10, 20).unwrap();
/// assert!((10..=20).contains(&v));
/// assert_eq!(random_in_range(7, 5, 5).unwrap(), 5);
/// assert_eq!(v, random_in_range(42, 10, 20).unwrap());
/// ```
pub fn random_in_range(seed: u64, lower: i64, upper: i64) -> Result<i64, MathError> {
    if upper < lower {
        return Err(MathError::InvertedRange { lower, upper });
    }
    if lower == upper {
        return Ok(lower);
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(rng.random_range(lower..=upper))
}

/// Per-device jitter source, seeded once per installation.
#[derive(Clone, Copy, Debug)]
pub struct Jitter {
    seed: u64,
}

impl Jitter {
    /// Creates a jitter source for the given device seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Returns the device seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Deterministic offset in `[0, range_ms)` for the slot at `anchor_ms`.
    ///
    /// The device seed is mixed with the anchor so distinct slots draw
    /// independent offsets while the same slot always maps to the same one.
    /// A non-positive range yields no offset.
    pub fn offset(&self, anchor_ms: i64, range_ms: i64) -> i64 {
        if range_ms <= 0 {
            return 0;
        }
        // Bounds are valid by the guard above.
        random_in_range(self.seed ^ anchor_ms as u64, 0, range_ms - 1).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_stay_within_inclusive_bounds() {
        for seed in 0..500u64 {
            let v = random_in_range(seed, -10, 10).unwrap();
            assert!((-10..=10).contains(&v), "seed {seed} produced {v}");
        }
    }

    #[test]
    fn equal_bounds_return_that_value() {
        assert_eq!(random_in_range(99, 7, 7).unwrap(), 7);
        assert_eq!(random_in_range(0, -3, -3).unwrap(), -3);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert_eq!(
            random_in_range(1, 10, 5),
            Err(MathError::InvertedRange { lower: 10, upper: 5 })
        );
    }

    #[test]
    fn same_seed_same_value() {
        let a = random_in_range(1234, 0, 1_000_000).unwrap();
        let b = random_in_range(1234, 0, 1_000_000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn distribution_is_roughly_uniform_across_seeds() {
        // Bucket 10k seeds over [0, 9] and check no bucket is wildly off.
        let mut buckets = [0u32; 10];
        for seed in 0..10_000u64 {
            let v = random_in_range(seed, 0, 9).unwrap();
            buckets[v as usize] += 1;
        }
        for (i, count) in buckets.iter().enumerate() {
            assert!(
                (700..=1300).contains(count),
                "bucket {i} has {count} of 10000"
            );
        }
    }

    #[test]
    fn offset_is_stable_per_slot_and_varies_across_slots() {
        let jitter = Jitter::new(0xDEAD_BEEF);
        let a = jitter.offset(1_000_000, 60_000);
        assert_eq!(a, jitter.offset(1_000_000, 60_000));
        assert!((0..60_000).contains(&a));

        let distinct: std::collections::HashSet<i64> = (0..50)
            .map(|slot| jitter.offset(slot * 300_000, 60_000))
            .collect();
        assert!(distinct.len() > 10, "slots collapsed to {}", distinct.len());
    }

    #[test]
    fn offset_with_zero_range_is_zero() {
        let jitter = Jitter::new(1);
        assert_eq!(jitter.offset(12345, 0), 0);
        assert_eq!(jitter.offset(12345, -5), 0);
    }
}
