//! Deterministic random source for the generation passes
//!
//! Every algorithm that needs randomness takes an explicit `&mut impl IndexRng`
//! so runs are reproducible from the seed alone.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform draws consumed by gate selection and lot subdivision
pub trait IndexRng {
    /// Uniform integer in `[min, max)`. Returns `min` when the range is empty.
    fn next_int(&mut self, min: usize, max: usize) -> usize;

    /// Uniform float in `[0, 1)`
    fn next_float(&mut self) -> f64;

    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_float() < p
    }

    /// Bell-shaped value in `[0, 1)`, mean of three uniform draws
    fn next_normal(&mut self) -> f64 {
        (self.next_float() + self.next_float() + self.next_float()) / 3.0
    }
}

/// ChaCha8-backed generator seeded from a `u64`
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl IndexRng for SeededRng {
    fn next_int(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        self.inner.gen_range(min..max)
    }

    fn next_float(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}
