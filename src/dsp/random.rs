use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Uniform random source owned by a module.
///
/// `SmallRng` never allocates or blocks after construction, so drawing on
/// the audio thread is safe. Seed it for reproducible runs.
#[derive(Debug, Clone)]
pub struct Dice {
    rng: SmallRng,
}

impl Dice {
    /// Seed from the operating system. Call off the audio thread.
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Uniform draw in [0, 1).
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform draw in [lo, hi). Returns `lo` for an empty range.
    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo {
            self.rng.random_range(lo..hi)
        } else {
            lo
        }
    }

    /// Bernoulli trial with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }
}
