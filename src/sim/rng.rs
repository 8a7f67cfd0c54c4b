//! Deterministic random source
//!
//! A thin PCG32 wrapper. The same seed always yields the same sequence, and
//! independent streams of one seed keep cosmetic draws from disturbing the
//! spawn sequence.

use rand::Rng;
use rand_pcg::Pcg32;

/// Stream used for spawn-tier selection
pub const SPAWN_STREAM: u64 = 0;
/// Stream used for particles and other cosmetics
pub const COSMETIC_STREAM: u64 = 1;

/// Seedable uniform random source
#[derive(Debug, Clone)]
pub struct Random {
    seed: u64,
    rng: Pcg32,
}

impl Random {
    pub fn new(seed: u64) -> Self {
        Self::with_stream(seed, SPAWN_STREAM)
    }

    pub fn with_stream(seed: u64, stream: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::new(seed, stream),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform float in [min, max); returns `min` for an empty range
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..max)
    }

    /// Uniform integer in [min, max] inclusive
    pub fn int(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..=max)
    }
}
