use crate::error::Result;
use crate::matrix::{Matrix, MatmulShape};

/// Textbook matrix multiplication using i-j-k loop order: C = A * B.
///
/// Each output cell is the dot product of row i of A and column j of B,
/// summed with k ascending. This is the reference oracle: its accumulation
/// order defines the rounding every other variant is compared against.
/// The inner loop walks B with stride `m`, so it is slow on anything that
/// does not fit in cache.
///
/// Every element of `c` is overwritten; its previous contents are ignored.
///
/// # Errors
///
/// [`BenchError::ShapeMismatch`](crate::BenchError::ShapeMismatch) if the
/// operands are not `n×k`, `k×m`, `n×m`.
pub fn matmul_naive_ijk(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
    let MatmulShape { n, m, k } = MatmulShape::derive(a, b, c)?;

    for i in 0..n {
        for j in 0..m {
            let mut acc = 0.0f32;
            for p in 0..k {
                // i < n, j < m, p < k checked by derive
                acc += unsafe { a.read(i, p) * b.read(p, j) };
            }
            unsafe { *c.access(i, j) = acc };
        }
    }
    Ok(())
}
