//! Seed management for world generation
//!
//! Every tunable of a world is derived from its integer seed through one
//! explicit random stream. The order in which values are drawn is part of the
//! world's identity: changing it changes every world.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Shape coefficient used when no flag modifies the mask falloff.
pub const DEFAULT_SHAPE_COEFF: f32 = 1.0;

/// Explicit pseudo-random stream threaded through every derivation step.
pub struct SeedStream {
    rng: ChaCha8Rng,
}

impl SeedStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Stream for a signed world seed.
    pub fn for_world(seed: i32) -> Self {
        Self::new(world_seed_bits(seed))
    }

    /// Uniform in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Uniform in `[lo, hi)`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.unit() * (hi - lo)
    }

    /// Uniform in `[median - spread, median)`.
    pub fn modifier(&mut self, median: f32, spread: f32) -> f32 {
        (median - spread) + self.unit() * spread
    }

    /// Uniform integer in `[floor(median * (1 - spread)), floor(median * (1 + spread))]`.
    pub fn int_within(&mut self, median: i32, spread: f32) -> i32 {
        let lo = (median as f32 * (1.0 - spread)) as i32;
        let hi = (median as f32 * (1.0 + spread)) as i32;
        self.rng.gen_range(lo.min(hi)..=hi.max(lo))
    }

    /// Integer in `[lo, hi]`.
    pub fn int_between(&mut self, lo: i32, hi: i32) -> i32 {
        self.rng.gen_range(lo..=hi)
    }

    /// Fresh seed for a noise primitive.
    pub fn noise_seed(&mut self) -> u32 {
        self.rng.gen::<u32>()
    }

    /// Direct access for helpers that take an `Rng`.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

/// Reinterpret a signed world seed as the 64-bit stream seed.
pub fn world_seed_bits(seed: i32) -> u64 {
    seed as u32 as u64
}

/// Derive a sub-seed from a world seed and a purpose tag.
pub fn derive_seed(seed: u64, tag: u64) -> u64 {
    // splitmix64 finaliser
    let mut z = seed ^ tag.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Parameters fixed once per world, before any grid is built.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WorldParams {
    /// World seed
    pub seed: i32,
    /// Global jitter factor in [0.05, 0.30)
    pub randomness: f32,
    /// Offset added to every height sample in [0, 1]
    pub height_modifier: f32,
    /// Offset added to every moisture sample in [0, 1]
    pub moisture_modifier: f32,
    /// Mask falloff coefficient (1.0 normally, 0.5 for pangea)
    pub shape_coeff: f32,
}

impl WorldParams {
    /// Draw randomness, then the height modifier, then the moisture modifier.
    pub fn derive(seed: i32, stream: &mut SeedStream) -> Self {
        let randomness = stream.range(0.05, 0.30);
        let height_modifier = stream.modifier(0.0, randomness * 0.8);
        let moisture_modifier = stream.modifier(0.0, randomness * 0.8);
        Self {
            seed,
            randomness,
            height_modifier,
            moisture_modifier,
            shape_coeff: DEFAULT_SHAPE_COEFF,
        }
    }
}

impl std::fmt::Display for WorldParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldParams {{ seed: {}, randomness: {:.4}, height_modifier: {:.4}, \
             moisture_modifier: {:.4}, shape_coeff: {} }}",
            self.seed, self.randomness, self.height_modifier, self.moisture_modifier, self.shape_coeff,
        )
    }
}
