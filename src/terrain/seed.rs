//! Deterministic seed derivation for generation stages.
//!
//! Every stage that consumes randomness gets its own stream, derived from the
//! master seed with a fixed SplitMix64 mixer. Derived seeds must stay stable
//! across Rust releases, so `std::hash` is not used.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const STREAM_OCTAVE_OFFSETS: u64 = 0x6f63_7461_7665;
const STREAM_GROUND_COVER_NOISE: u64 = 0x6772_6e6f_6973;
const STREAM_GROUND_COVER: u64 = 0x6772_6173_7300;
const STREAM_TREES: u64 = 0x7472_6565_7300;
const STREAM_ISLANDS: u64 = 0x6973_6c61_6e64;

/// One SplitMix64 step.
#[inline]
pub fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derive a stage seed from the master seed and a stream tag.
pub fn derive_seed(master: u32, stream: u64) -> u64 {
    splitmix64(splitmix64(master as u64) ^ stream)
}

/// Seeds for all randomized generation stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationSeeds {
    /// Master seed, also used to seed the terrain Perlin permutation table
    pub master: u32,
    /// Per-octave sampling offsets
    pub octave_offsets: u64,
    /// Permutation seed of the ground-cover gate noise
    pub ground_cover_noise: u32,
    /// Ground-cover density level draws
    pub ground_cover: u64,
    /// Tree rejection sampling
    pub trees: u64,
    /// Floating island placement
    pub islands: u64,
}

impl GenerationSeeds {
    pub fn from_master(master: u32) -> Self {
        Self {
            master,
            octave_offsets: derive_seed(master, STREAM_OCTAVE_OFFSETS),
            ground_cover_noise: (derive_seed(master, STREAM_GROUND_COVER_NOISE) >> 32) as u32,
            ground_cover: derive_seed(master, STREAM_GROUND_COVER),
            trees: derive_seed(master, STREAM_TREES),
            islands: derive_seed(master, STREAM_ISLANDS),
        }
    }
}

/// Deterministic RNG for a derived stage seed.
pub fn stage_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Widest span a uniform `f32` draw accepts. Wider spans overflow while the
/// sampler scales its unit draw.
pub const MAX_SAMPLE_SPAN: f32 = f32::MAX / 2.0;

/// True when `gen_range(lo..=hi)` can draw from the range without panicking.
pub fn sampleable_range(lo: f32, hi: f32) -> bool {
    lo.is_finite() && hi.is_finite() && lo <= hi && hi - lo <= MAX_SAMPLE_SPAN
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_splitmix_reference_values() {
        // First outputs of the reference SplitMix64 generator seeded with 0
        assert_eq!(splitmix64(0), 0xE220_A839_7B1D_CDAF);
        assert_eq!(splitmix64(0x9E37_79B9_7F4A_7C15), 0x6E78_9E6A_A1B9_65F4);
    }

    #[test]
    fn test_seeds_are_deterministic() {
        assert_eq!(GenerationSeeds::from_master(12345), GenerationSeeds::from_master(12345));
    }

    #[test]
    fn test_streams_are_distinct() {
        let s = GenerationSeeds::from_master(12345);
        let all = [s.octave_offsets, s.ground_cover, s.trees, s.islands];
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_ne!(all[i], all[j]);
            }
        }
        assert_ne!(GenerationSeeds::from_master(1).trees, GenerationSeeds::from_master(2).trees);
    }

    #[test]
    fn test_sampleable_range() {
        assert!(sampleable_range(0.8, 1.2));
        assert!(sampleable_range(5.0, 5.0));
        assert!(sampleable_range(0.0, MAX_SAMPLE_SPAN));
        assert!(!sampleable_range(1.2, 0.8));
        assert!(!sampleable_range(-f32::MAX, f32::MAX));
        assert!(!sampleable_range(1.0, f32::MAX));
        assert!(!sampleable_range(0.0, f32::NAN));

        // The widest accepted span still draws
        let mut rng = stage_rng(1);
        let v = rng.gen_range(0.0..=MAX_SAMPLE_SPAN);
        assert!((0.0..=MAX_SAMPLE_SPAN).contains(&v));
    }

    #[test]
    fn test_stage_rng_repeats() {
        let mut a = stage_rng(42);
        let mut b = stage_rng(42);
        for _ in 0..16 {
            assert_eq!(a.gen_range(0..1_000_000u32), b.gen_range(0..1_000_000u32));
        }
    }
}
