//! Matrix-multiply and matrix-vector kernels with a benchmark harness.
//!
//! I built this to see what loop order, cache tiling and SIMD each buy on
//! a plain single-precision GEMM and GEMV, and to make sure the fast
//! versions still compute the right thing. Every kernel here is timed
//! the same way (warm-up, then repeated calls on the same buffers) and
//! checked against the textbook triple loop.
//!
//! ## Usage
//!
//! ```
//! use matbench::{BenchConfig, KernelRegistry, MatmulShape, MatmulVariant, bench_matmul};
//!
//! let registry = KernelRegistry::with_defaults();
//! let kernel = registry.matmul("tiled-kij-16".parse::<MatmulVariant>()?)?;
//!
//! let config = BenchConfig::default().with_repeats(3);
//! let result = bench_matmul(kernel, MatmulShape::square(64), &config)?;
//!
//! assert!(result.correct);
//! assert_eq!(result.total_flops, 2 * 64 * 64 * 64 * 3);
//! # Ok::<(), matbench::BenchError>(())
//! ```
//!
//! Kernels can also be called directly on [`Matrix`] buffers:
//!
//! ```
//! use matbench::Matrix;
//! use matbench::kernels::naive_kij::matmul_naive_kij;
//!
//! let a = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]])?;
//! let b = Matrix::from_rows(&[&[1.0, 0.0], &[0.0, 1.0]])?;
//! let mut c = Matrix::new(2, 2)?;
//!
//! matmul_naive_kij(&a, &b, &mut c)?;
//! assert_eq!(c.as_slice(), &[1.0, 2.0, 3.0, 4.0]);
//! # Ok::<(), matbench::BenchError>(())
//! ```
//!
//! ## What's inside
//!
//! - naive i-j-k (the oracle) and k-i-j matmul
//! - tiled matmul, 8/16/32 tiles, ijk or kij inside a tile
//! - naive, blocked and vectorized matvec (AVX2+FMA or portable lanes)
//! - a peak-FMA microkernel for calibrating the achievable FLOP rate

pub mod error;
pub mod harness;
pub mod kernels;
pub mod matrix;
pub mod simd;
pub mod verify;

pub use error::{BenchError, Result};
pub use harness::{
    BenchConfig, BenchResult, bench_matmul, bench_matvec, run_matmul, run_matvec, time_phases,
};
pub use kernels::{KernelRegistry, MatmulKernel, MatmulVariant, MatvecKernel, MatvecVariant};
pub use matrix::{Matrix, MatmulShape, MatvecShape};
pub use verify::{Verification, is_same, verify};
