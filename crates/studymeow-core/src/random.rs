//! Injectable randomness.
//!
//! Reward rolls never touch a global generator. The engine owns a boxed
//! [`RandomSource`]; production code uses [`SeededSource`], tests hand in a
//! [`FixedSequence`].

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

/// A source of uniform samples in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }
}

/// PCG generator, reproducible when built from a seed.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: Mcg128Xsl64,
}

impl SeededSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mcg128Xsl64::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f64>,
    cursor: usize,
}

impl FixedSequence {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for FixedSequence {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
