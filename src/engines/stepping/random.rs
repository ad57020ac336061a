use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Key of the draw for slot `index` of step `step`.
pub fn sample_key(seed: u64, step: u64, index: u64) -> u64 {
    splitmix64(splitmix64(splitmix64(seed) ^ step) ^ index)
}

/// Uniform sample in `[0, 1)`. Depends only on its arguments, never on scheduling.
pub fn stochastic_sample(seed: u64, step: u64, index: u64) -> f64 {
    StdRng::seed_from_u64(sample_key(seed, step, index)).gen::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_pure() {
        assert_eq!(stochastic_sample(7, 3, 11), stochastic_sample(7, 3, 11));
        let value = stochastic_sample(7, 3, 11);
        assert!((0.0..1.0).contains(&value));
    }

    #[test]
    fn test_keys_differ_across_coordinates() {
        let base = sample_key(1, 1, 1);
        assert_ne!(base, sample_key(2, 1, 1));
        assert_ne!(base, sample_key(1, 2, 1));
        assert_ne!(base, sample_key(1, 1, 2));
        assert_ne!(sample_key(1, 2, 3), sample_key(1, 3, 2));
    }
}
