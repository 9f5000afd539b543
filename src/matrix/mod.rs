//! Dense row-major buffers, shape derivation and operand fills.
//!
//! Kernels never allocate: they receive buffers built here, derive their
//! shape from them, and write into a pre-existing output.

pub mod dense;
pub mod fill;
pub mod shape;

pub use dense::Matrix;
pub use shape::{MatmulShape, MatvecShape};
