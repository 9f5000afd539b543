//! Warm-up aware timing and verification of kernels.
//!
//! A run allocates and fills its operands once, calls the kernel `warmup`
//! times untimed, then times `repeats` back-to-back calls on the same
//! buffers. The oracle runs once afterwards, outside the timed region, and
//! the verifier folds its verdict into the [`BenchResult`].

pub mod config;
pub mod result;

pub use config::{BenchConfig, DEFAULT_SEED};
pub use result::BenchResult;

use std::hint::black_box;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::error::Result;
use crate::kernels::matvec_naive::matvec_naive;
use crate::kernels::naive_ijk::matmul_naive_ijk;
use crate::kernels::{MatmulKernel, MatvecKernel};
use crate::matrix::fill::random_matrix;
use crate::matrix::{Matrix, MatmulShape, MatvecShape};
use crate::verify::verify;

/// Calls `f` `warmup` times, then times `repeats` further calls.
///
/// Only the second phase is inside the timer. The first error from `f`
/// aborts the run.
pub fn time_phases<F>(warmup: usize, repeats: usize, mut f: F) -> Result<Duration>
where
    F: FnMut() -> Result<()>,
{
    for _ in 0..warmup {
        f()?;
    }
    debug!("warm-up complete after {warmup} calls");

    let start = Instant::now();
    for _ in 0..repeats {
        f()?;
    }
    let elapsed = start.elapsed();
    debug!("timed phase: {repeats} calls in {:.3} ms", elapsed.as_secs_f64() * 1e3);

    Ok(elapsed)
}

/// Benchmarks a matmul kernel on freshly filled `shape` operands.
///
/// A and B are filled from `config.seed`; C is pre-filled with random
/// values too, so a kernel that fails to overwrite it is caught.
pub fn bench_matmul(
    kernel: &dyn MatmulKernel,
    shape: MatmulShape,
    config: &BenchConfig,
) -> Result<BenchResult> {
    config.validate()?;
    let a = random_matrix(shape.k, shape.n, config.seed)?;
    let b = random_matrix(shape.m, shape.k, config.seed.wrapping_add(1))?;
    let mut c = random_matrix(shape.m, shape.n, config.seed.wrapping_add(2))?;

    run_matmul(kernel, &a, &b, &mut c, config)
}

/// Benchmarks a matmul kernel on caller-provided buffers.
pub fn run_matmul(
    kernel: &dyn MatmulKernel,
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    config: &BenchConfig,
) -> Result<BenchResult> {
    config.validate()?;
    let shape = MatmulShape::derive(a, b, c)?;
    let label = kernel.name();

    let elapsed = time_phases(config.warmup, config.repeats, || {
        kernel.apply(black_box(a), black_box(b), black_box(&mut *c))
    })?;

    let mut reference = Matrix::new(shape.m, shape.n)?;
    matmul_naive_ijk(a, b, &mut reference)?;
    let verdict = verify(c.as_slice(), reference.as_slice(), config.tolerance)?;
    if !verdict.passed {
        warn!(
            "{label}: output differs from naive-ijk (max error {:.3e}, first at {:?})",
            verdict.max_error, verdict.first_mismatch
        );
    }

    Ok(BenchResult::new(
        label,
        elapsed,
        config.repeats,
        shape.flops(),
        Some(verdict.passed),
    ))
}

/// Benchmarks a matvec kernel on freshly filled `shape` operands.
pub fn bench_matvec(
    kernel: &dyn MatvecKernel,
    shape: MatvecShape,
    config: &BenchConfig,
) -> Result<BenchResult> {
    config.validate()?;
    let a = random_matrix(shape.k, shape.n, config.seed)?;
    let b = random_matrix(1, shape.k, config.seed.wrapping_add(1))?;
    let mut c = random_matrix(1, shape.n, config.seed.wrapping_add(2))?;

    run_matvec(kernel, &a, &b, &mut c, config)
}

/// Benchmarks a matvec kernel on caller-provided buffers. Calibration
/// kernels are timed but not verified.
pub fn run_matvec(
    kernel: &dyn MatvecKernel,
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    config: &BenchConfig,
) -> Result<BenchResult> {
    config.validate()?;
    let shape = MatvecShape::derive(a, b, c)?;
    let label = kernel.name();

    let elapsed = time_phases(config.warmup, config.repeats, || {
        kernel.apply(black_box(a), black_box(b), black_box(&mut *c))
    })?;

    let correct = if kernel.verifiable() {
        let mut reference = Matrix::column(shape.n)?;
        matvec_naive(a, b, &mut reference)?;
        let verdict = verify(c.as_slice(), reference.as_slice(), config.tolerance)?;
        if !verdict.passed {
            warn!(
                "{label}: output differs from naive matvec (max error {:.3e}, first at {:?})",
                verdict.max_error, verdict.first_mismatch
            );
        }
        Some(verdict.passed)
    } else {
        debug!("{label}: calibration kernel, skipping verification");
        None
    };

    Ok(BenchResult::new(
        label,
        elapsed,
        config.repeats,
        shape.flops(),
        correct,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
    }

    impl MatmulKernel for Counting {
        fn name(&self) -> String {
            "counting".into()
        }

        fn apply(&self, a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            matmul_naive_ijk(a, b, c)
        }
    }

    struct Broken;

    impl MatmulKernel for Broken {
        fn name(&self) -> String {
            "broken".into()
        }

        fn apply(&self, _a: &Matrix, _b: &Matrix, c: &mut Matrix) -> Result<()> {
            c.as_mut_slice().fill(-1.0);
            Ok(())
        }
    }

    #[test]
    fn test_time_phases_call_counts() {
        let mut calls = 0;
        time_phases(3, 5, || {
            calls += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(calls, 8);
    }

    #[test]
    fn test_time_phases_stops_on_error() {
        let mut calls = 0;
        let err = time_phases(2, 5, || {
            calls += 1;
            if calls == 2 {
                Err(BenchError::InvalidConfig("boom".into()))
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        assert_eq!(err, BenchError::InvalidConfig("boom".into()));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_bench_matmul_runs_warmup_and_repeats() {
        let kernel = Counting { calls: Cell::new(0) };
        let config = BenchConfig::default().with_warmup(2).with_repeats(4);
        let result = bench_matmul(&kernel, MatmulShape::new(4, 3, 5), &config).unwrap();

        assert_eq!(kernel.calls.get(), 6);
        assert_eq!(result.label, "counting");
        assert_eq!(result.total_flops, 2 * 4 * 3 * 5 * 4);
        assert!(result.correct && result.verified);
    }

    #[test]
    fn test_bench_matmul_flags_wrong_output() {
        let result =
            bench_matmul(&Broken, MatmulShape::square(8), &BenchConfig::default()).unwrap();
        assert!(!result.correct);
        assert!(result.verified);
    }

    #[test]
    fn test_bench_rejects_zero_repeats() {
        let kernel = Counting { calls: Cell::new(0) };
        let config = BenchConfig::default().with_repeats(0);
        assert!(bench_matmul(&kernel, MatmulShape::square(4), &config).is_err());
        assert_eq!(kernel.calls.get(), 0);
    }
}
