//! Deterministic random number generation.
//!
//! Every probability-driven decision in the engine draws from a [`SimRng`].
//! A game or a season owns exactly one stream; nothing re-seeds it halfway.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded pseudo-random stream shared by all engine components of one run.
#[derive(Clone, Debug)]
pub struct SimRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed this stream was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Raw 32-bit draw.
    pub fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    /// Integer in `[low, high]`. Bounds may be given in either order.
    pub fn range(&mut self, low: i32, high: i32) -> i32 {
        let (lo, hi) = if low <= high { (low, high) } else { (high, low) };
        self.inner.gen_range(lo..=hi)
    }

    /// True iff a 1..=100 draw is `<= percent`.
    pub fn chance(&mut self, percent: f64) -> bool {
        let draw = self.range(1, 100);
        f64::from(draw) <= percent
    }

    /// Float in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Bernoulli trial with probability `p` in `[0, 1]`; used for sub-percent events.
    pub fn probability(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Index drawn proportionally to `weights`. Non-positive weights are never
    /// picked unless every weight is non-positive, in which case the first
    /// index is returned. Returns `None` for an empty slice.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 || !total.is_finite() {
            return Some(0);
        }
        let mut target = self.unit() * total;
        let mut last_positive = 0;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            last_positive = i;
            if target < *w {
                return Some(i);
            }
            target -= *w;
        }
        Some(last_positive)
    }
}

/// Seed of the `index`-th run derived from a caller supplied base seed.
pub fn derive_seed(base_seed: u64, index: u64) -> u64 {
    base_seed.wrapping_add(index)
}
