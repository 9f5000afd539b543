use crate::error::{BenchError, Result};
use crate::matrix::{Matrix, MatvecShape};

/// Matrix-vector product with a blocked inner reduction.
///
/// K is walked in blocks of `block_k`: for each block every row adds its
/// `block_k` partial products into `c`, so the slice of b being reduced
/// stays hot across all rows. Columns left over when `block_k` does not
/// divide K are summed in a final scalar pass.
///
/// # Errors
///
/// `InvalidConfig` if `block_k` is zero, `ShapeMismatch` on bad operands.
pub fn matvec_blocked(a: &Matrix, b: &Matrix, c: &mut Matrix, block_k: usize) -> Result<()> {
    let MatvecShape { k, .. } = MatvecShape::derive(a, b, c)?;
    if block_k == 0 {
        return Err(BenchError::InvalidConfig("block_k must be at least 1".into()));
    }
    let b = b.as_slice();
    let c = c.as_mut_slice();

    c.fill(0.0);

    for outer in 0..k / block_k {
        let k0 = outer * block_k;
        for (row, out) in c.iter_mut().enumerate() {
            let mut acc = *out;
            for (p, &b_p) in b[k0..k0 + block_k].iter().enumerate() {
                acc += unsafe { a.read(row, k0 + p) } * b_p;
            }
            *out = acc;
        }
    }

    let tail = k / block_k * block_k;
    if tail < k {
        for (row, out) in c.iter_mut().enumerate() {
            for (p, &b_p) in b[tail..k].iter().enumerate() {
                *out += unsafe { a.read(row, tail + p) } * b_p;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::matvec_naive::matvec_naive;
    use crate::matrix::fill::random_matrix;

    #[test]
    fn test_blocked_matches_naive_with_remainder() {
        let (n, k) = (9, 37);
        let a = random_matrix(k, n, 5).unwrap();
        let b = random_matrix(1, k, 6).unwrap();
        let mut c_ref = Matrix::column(n).unwrap();
        matvec_naive(&a, &b, &mut c_ref).unwrap();

        for block_k in [1, 2, 4, 5, 8, 37, 64] {
            let mut c = random_matrix(1, n, 7).unwrap();
            matvec_blocked(&a, &b, &mut c, block_k).unwrap();
            for (x, y) in c_ref.as_slice().iter().zip(c.as_slice()) {
                assert!((x - y).abs() < 1e-4, "block_k={block_k}: {x} vs {y}");
            }
        }
    }

    #[test]
    fn test_blocked_rejects_zero_block() {
        let a = Matrix::new(4, 2).unwrap();
        let b = Matrix::column(4).unwrap();
        let mut c = Matrix::column(2).unwrap();
        assert!(matches!(
            matvec_blocked(&a, &b, &mut c, 0),
            Err(BenchError::InvalidConfig(_))
        ));
    }
}
