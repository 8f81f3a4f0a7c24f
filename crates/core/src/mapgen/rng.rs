//! Uniform draws over the generator's random stream, plus runtime seeding.

use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand_chacha::rand_core::Rng;

/// Inclusive uniform integer in `min_value..=max_value`.
pub(super) fn random_in_range<R: Rng + ?Sized>(rng: &mut R, min_value: u32, max_value: u32) -> u32 {
    debug_assert!(min_value <= max_value);
    let range_size = u64::from(max_value - min_value) + 1;
    min_value + (rng.next_u64() % range_size) as u32
}

/// Uniform index into a non-empty slice of `len` elements.
pub(super) fn random_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    debug_assert!(len > 0);
    (rng.next_u64() % len as u64) as usize
}

static RUNTIME_SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Fresh seed per call; maps are not meant to be reproducible outside tests.
pub(super) fn runtime_seed() -> u64 {
    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(process::id());
    let counter = RUNTIME_SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let entropy = (now_nanos as u64)
        ^ ((now_nanos >> 64) as u64)
        ^ pid.rotate_left(17)
        ^ counter.wrapping_mul(0x9E37_79B9_7F4A_7C15);

    mix_seed(entropy)
}

fn mix_seed(mut value: u64) -> u64 {
    value ^= value >> 30;
    value = value.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    value ^= value >> 27;
    value = value.wrapping_mul(0x94D0_49BB_1331_11EB);
    value ^ (value >> 31)
}

#[cfg(test)]
mod tests {
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    #[test]
    fn random_in_range_stays_inside_requested_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(12_345);
        for _ in 0..500 {
            let value = random_in_range(&mut rng, 7, 13);
            assert!((7..=13).contains(&value));
        }
    }

    #[test]
    fn random_in_range_with_equal_bounds_is_constant() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(random_in_range(&mut rng, 4, 4), 4);
        }
    }

    #[test]
    fn random_in_range_reaches_both_ends() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let draws: Vec<u32> = (0..200).map(|_| random_in_range(&mut rng, 1, 3)).collect();
        assert!(draws.contains(&1));
        assert!(draws.contains(&3));
    }

    #[test]
    fn random_index_is_inside_slice() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            assert!(random_index(&mut rng, 3) < 3);
        }
    }

    #[test]
    fn runtime_seed_changes_between_calls() {
        assert_ne!(runtime_seed(), runtime_seed());
    }
}
