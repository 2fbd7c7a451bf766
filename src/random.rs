//! Random number sources for sampling
//!
//! Every sampling call takes its generator explicitly. [`SamplingRng`] is the
//! crate's default: ChaCha8, seeded from a fixed value for reproducible output
//! or from entropy when reproducibility does not matter.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed used by `SamplingRng::default()`
pub const DEFAULT_SEED: u64 = 0x5EED_B10E_0015_E000;

/// The random draws the samplers need
pub trait RandomSource {
    /// Uniform integer in `[0, n)`; returns 0 when `n` is 0
    fn uniform_int(&mut self, n: u32) -> u32;

    /// Uniform double in `[0, 1)`
    fn uniform_unit(&mut self) -> f64;

    /// Uniform barycentric coordinates over a triangle
    ///
    /// Uses the square-root transform of two unit draws, so the three weights
    /// are non-negative and sum to one.
    fn uniform_barycentric(&mut self) -> [f64; 3] {
        let r1 = self.uniform_unit().sqrt();
        let r2 = self.uniform_unit();
        [1.0 - r1, r1 * (1.0 - r2), r1 * r2]
    }

    /// Fisher-Yates shuffle driven by `uniform_int`
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.uniform_int(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }
}

impl<R: Rng> RandomSource for R {
    fn uniform_int(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.gen_range(0..n)
    }

    fn uniform_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Deterministic generator used by [`crate::MeshSampler`]
#[derive(Debug, Clone)]
pub struct SamplingRng {
    inner: ChaCha8Rng,
}

impl SamplingRng {
    /// Generator that produces the same sequence for the same seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from the thread-local entropy source
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }
}

impl Default for SamplingRng {
    fn default() -> Self {
        Self::seeded(DEFAULT_SEED)
    }
}

impl RngCore for SamplingRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
