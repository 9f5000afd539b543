//! Operand shape derivation and validation.
//!
//! Shapes are read from the operands rather than passed alongside them:
//! A is `n × k`, B is `k × m` (or a length-`k` vector) and C is `n × m`
//! (or length `n`). Every kernel entry point derives its shape here before
//! touching the unchecked accessors, so a mismatch is reported instead of
//! reading out of bounds.

use super::dense::Matrix;
use crate::error::{BenchError, Result};

/// Dimensions of `C[n×m] = A[n×k] · B[k×m]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatmulShape {
    pub n: usize,
    pub m: usize,
    pub k: usize,
}

impl MatmulShape {
    pub fn new(n: usize, m: usize, k: usize) -> Self {
        MatmulShape { n, m, k }
    }

    /// Square `size × size × size` problem.
    pub fn square(size: usize) -> Self {
        Self::new(size, size, size)
    }

    /// Reads `n`, `m`, `k` from the operands and checks that they agree.
    pub fn derive<T>(a: &Matrix<T>, b: &Matrix<T>, c: &Matrix<T>) -> Result<Self> {
        let shape = MatmulShape {
            n: a.height(),
            m: b.width(),
            k: a.width(),
        };

        if b.height() != shape.k {
            return Err(BenchError::shape(
                "matmul",
                format!("A is {}x{} but B has {} rows", shape.n, shape.k, b.height()),
            ));
        }
        if c.height() != shape.n || c.width() != shape.m {
            return Err(BenchError::shape(
                "matmul",
                format!(
                    "C is {}x{}, expected {}x{}",
                    c.height(),
                    c.width(),
                    shape.n,
                    shape.m
                ),
            ));
        }
        Ok(shape)
    }

    /// FLOPs for one invocation: one multiply and one add per term.
    pub fn flops(&self) -> u64 {
        2 * self.n as u64 * self.k as u64 * self.m as u64
    }

    /// Fails unless every tile extent evenly divides its dimension.
    pub fn check_tiles(&self, tile_n: usize, tile_m: usize, tile_k: usize) -> Result<()> {
        check_divides("N", self.n, tile_n)?;
        check_divides("M", self.m, tile_m)?;
        check_divides("K", self.k, tile_k)
    }
}

/// Dimensions of `c[n] = A[n×k] · b[k]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatvecShape {
    pub n: usize,
    pub k: usize,
}

impl MatvecShape {
    pub fn new(n: usize, k: usize) -> Self {
        MatvecShape { n, k }
    }

    /// Vectors are identified by length only, whatever their width/height.
    pub fn derive<T>(a: &Matrix<T>, b: &Matrix<T>, c: &Matrix<T>) -> Result<Self> {
        let shape = MatvecShape {
            n: a.height(),
            k: a.width(),
        };

        if b.len() != shape.k {
            return Err(BenchError::shape(
                "matvec",
                format!("A is {}x{} but b has length {}", shape.n, shape.k, b.len()),
            ));
        }
        if c.len() != shape.n {
            return Err(BenchError::shape(
                "matvec",
                format!("c has length {}, expected {}", c.len(), shape.n),
            ));
        }
        Ok(shape)
    }

    pub fn flops(&self) -> u64 {
        2 * self.n as u64 * self.k as u64
    }
}

pub(crate) fn check_divides(dim: &'static str, extent: usize, tile: usize) -> Result<()> {
    if tile == 0 || extent % tile != 0 {
        return Err(BenchError::UnsupportedTileSize { dim, extent, tile });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_shape_derivation() {
        // A is 3x5 (width 5, height 3), B is 5x4, C is 3x4
        let a: Matrix = Matrix::new(5, 3).unwrap();
        let b: Matrix = Matrix::new(4, 5).unwrap();
        let c: Matrix = Matrix::new(4, 3).unwrap();

        let shape = MatmulShape::derive(&a, &b, &c).unwrap();
        assert_eq!(shape, MatmulShape { n: 3, m: 4, k: 5 });
        assert_eq!(shape.flops(), 2 * 3 * 4 * 5);
    }

    #[test]
    fn test_matmul_shape_rejects_inner_mismatch() {
        let a: Matrix = Matrix::new(5, 3).unwrap();
        let b: Matrix = Matrix::new(4, 6).unwrap();
        let c: Matrix = Matrix::new(4, 3).unwrap();
        assert!(matches!(
            MatmulShape::derive(&a, &b, &c),
            Err(BenchError::ShapeMismatch { op: "matmul", .. })
        ));
    }

    #[test]
    fn test_matmul_shape_rejects_bad_output() {
        let a: Matrix = Matrix::new(5, 3).unwrap();
        let b: Matrix = Matrix::new(4, 5).unwrap();
        let c: Matrix = Matrix::new(3, 4).unwrap();
        assert!(MatmulShape::derive(&a, &b, &c).is_err());
    }

    #[test]
    fn test_matvec_shape_derivation() {
        let a: Matrix = Matrix::new(6, 4).unwrap();
        let b: Matrix = Matrix::column(6).unwrap();
        let c: Matrix = Matrix::column(4).unwrap();

        let shape = MatvecShape::derive(&a, &b, &c).unwrap();
        assert_eq!(shape, MatvecShape { n: 4, k: 6 });
        assert_eq!(shape.flops(), 48);

        let short: Matrix = Matrix::column(5).unwrap();
        assert!(MatvecShape::derive(&a, &short, &c).is_err());
        assert!(MatvecShape::derive(&a, &b, &short).is_err());
    }

    #[test]
    fn test_tile_divisibility() {
        let shape = MatmulShape::new(16, 32, 8);
        assert!(shape.check_tiles(8, 8, 8).is_ok());
        assert_eq!(
            shape.check_tiles(16, 16, 16),
            Err(BenchError::UnsupportedTileSize {
                dim: "K",
                extent: 8,
                tile: 16
            })
        );
        assert!(shape.check_tiles(0, 8, 8).is_err());
    }
}
