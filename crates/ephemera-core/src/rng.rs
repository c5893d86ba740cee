//! Random number source abstraction for determinism.
//!
//! Fragment placement is random. In production this wraps a seeded-from-OS
//! `StdRng`; tests inject a scripted source instead.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait RandomSource: Send + Sync {
    /// Generate a random `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;

    /// Generate a random index in `[0, len)`. Returns 0 when `len` is 0.
    fn next_index(&mut self, len: usize) -> usize;

    /// Generate a random `f64` in `[min, max)`.
    fn next_between(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

/// Production random source backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct StdRandom(StdRng);

impl StdRandom {
    /// Seeds the generator from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Builds a reproducible generator from a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for StdRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.random::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.0.random_range(0..len)
    }
}
