use crate::error::{BenchError, Result};
use crate::verify::DEFAULT_TOLERANCE;

/// Seed for operand fills when none is given.
pub const DEFAULT_SEED: u64 = 0;

/// How a kernel is measured and checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchConfig {
    /// Untimed calls made before the timer starts.
    pub warmup: usize,
    /// Timed calls; must be at least 1.
    pub repeats: usize,
    /// Relative error tolerance passed to the verifier.
    pub tolerance: f64,
    /// Seed for the operand fills.
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            warmup: 1,
            repeats: 10,
            tolerance: DEFAULT_TOLERANCE,
            seed: DEFAULT_SEED,
        }
    }
}

impl BenchConfig {
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.repeats == 0 {
            return Err(BenchError::InvalidConfig("repeats must be at least 1".into()));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(BenchError::InvalidConfig(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}
