//! Matrix-multiply and matrix-vector kernels.
//!
//! Every kernel derives its shape from the operands, validates it, then
//! overwrites the pre-allocated output. None of them allocate or resize.
//!
//! Matmul (`C = A * B`):
//! - `naive_ijk`: textbook triple loop, the reference oracle
//! - `naive_kij`: k-outer reordering, stride-1 inner loop
//! - `tiled`: const-generic `TN × TM × TK` tiles, ijk or kij inside a tile
//!
//! Matvec (`c = A * b`):
//! - `matvec_naive`: one scalar accumulator per row, the matvec oracle
//! - `matvec_blocked`: blocked inner reduction with a scalar remainder
//! - `matvec_simd`: chunked vector reduction over a [`VectorLane`]
//! - `peak`: FMA-only calibration microkernel
//!
//! [`VectorLane`]: crate::simd::VectorLane

pub mod matvec_blocked;
pub mod matvec_naive;
pub mod matvec_simd;
pub mod naive_ijk;
pub mod naive_kij;
pub mod peak;
pub mod registry;
pub mod tiled;

pub use registry::{KernelRegistry, MatmulVariant, MatvecVariant};
pub use tiled::InnerOrder;

use crate::error::Result;
use crate::matrix::Matrix;

/// Signature shared by the matmul kernel functions.
pub type MatmulFn = fn(&Matrix, &Matrix, &mut Matrix) -> Result<()>;

/// Signature shared by the parameterized matvec kernel functions.
pub type MatvecFn = fn(&Matrix, &Matrix, &mut Matrix, usize) -> Result<()>;

/// A matrix-multiply implementation selectable at runtime.
pub trait MatmulKernel {
    /// Identifier used in reports.
    fn name(&self) -> String;

    /// Computes `c = a * b`, overwriting every element of `c`.
    fn apply(&self, a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()>;
}

/// A matrix-vector implementation selectable at runtime.
pub trait MatvecKernel {
    fn name(&self) -> String;

    /// Computes `c = a * b` for a length-k vector `b`.
    fn apply(&self, a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()>;

    /// Whether the output is a real product that can be checked against
    /// the oracle. Calibration kernels return false.
    fn verifiable(&self) -> bool {
        true
    }
}

/// A plain matmul function paired with its identifier.
#[derive(Clone, Copy)]
pub struct FnMatmul {
    pub variant: MatmulVariant,
    pub func: MatmulFn,
}

impl MatmulKernel for FnMatmul {
    fn name(&self) -> String {
        self.variant.to_string()
    }

    fn apply(&self, a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
        (self.func)(a, b, c)
    }
}

/// A matvec function with its runtime parameter bound in.
#[derive(Clone, Copy)]
pub struct FnMatvec {
    pub variant: MatvecVariant,
    pub func: MatvecFn,
    pub param: usize,
}

impl MatvecKernel for FnMatvec {
    fn name(&self) -> String {
        self.variant.to_string()
    }

    fn apply(&self, a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
        (self.func)(a, b, c, self.param)
    }

    fn verifiable(&self) -> bool {
        !matches!(self.variant, MatvecVariant::Peak(_))
    }
}
