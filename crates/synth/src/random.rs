use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform samples the generators draw from.
///
/// Everything is derived from `next_unit`, so a scripted sequence of unit
/// samples fully determines a generator's output.
pub trait RandomSource: Send {
    /// Uniform sample in `[0, 1)`
    fn next_unit(&mut self) -> f64;

    /// `true` with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }

    /// Uniform index in `0..n`; `n` must be non-zero
    fn below(&mut self, n: usize) -> usize {
        let idx = (self.next_unit() * n as f64) as usize;
        idx.min(n.saturating_sub(1))
    }

    /// Uniform integer in `lo..=hi`
    fn between(&mut self, lo: u32, hi: u32) -> u32 {
        lo + self.below((hi - lo) as usize + 1) as u32
    }
}

/// Fisher-Yates shuffle driven by `rng`
pub fn shuffle<T, R: RandomSource + ?Sized>(rng: &mut R, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i + 1);
        items.swap(i, j);
    }
}

/// Up to `count` distinct items, in random order
pub fn sample<T: Clone, R: RandomSource + ?Sized>(rng: &mut R, items: &[T], count: usize) -> Vec<T> {
    let mut pool = items.to_vec();
    shuffle(rng, &mut pool);
    pool.truncate(count);
    pool
}

/// Real randomness backed by `StdRng`
pub struct SystemRandom {
    rng: StdRng,
}

impl SystemRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SystemRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }
}

/// Replays a fixed list of unit samples, cycling when exhausted.
/// Values are clamped into `[0, 1)`.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// How many samples have been drawn so far
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
