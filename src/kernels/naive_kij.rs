use crate::error::Result;
use crate::matrix::{Matrix, MatmulShape};

/// Loop-reordered matrix multiplication using k-i-j order.
///
/// C is zeroed in a separate pass, then for every k the row k of B is
/// streamed once per row of A. The inner loop reads B and writes C with
/// stride 1. The same terms are summed as in
/// [`matmul_naive_ijk`](super::naive_ijk::matmul_naive_ijk), but the
/// partial sums live in C between k steps, so rounding may differ slightly.
pub fn matmul_naive_kij(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
    let MatmulShape { n, m, k } = MatmulShape::derive(a, b, c)?;

    c.as_mut_slice().fill(0.0);

    for p in 0..k {
        for i in 0..n {
            let a_ip = unsafe { a.read(i, p) };
            for j in 0..m {
                unsafe { *c.access(i, j) += a_ip * b.read(p, j) };
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::naive_ijk::matmul_naive_ijk;
    use crate::matrix::fill::random_matrix;

    #[test]
    fn test_naive_kij_matches_ijk() {
        let (n, m, k) = (7, 5, 11);
        let a = random_matrix(k, n, 1).unwrap();
        let b = random_matrix(m, k, 2).unwrap();
        let mut c_ref = Matrix::new(m, n).unwrap();
        let mut c_kij = random_matrix(m, n, 3).unwrap();

        matmul_naive_ijk(&a, &b, &mut c_ref).unwrap();
        matmul_naive_kij(&a, &b, &mut c_kij).unwrap();

        for (x, y) in c_ref.as_slice().iter().zip(c_kij.as_slice()) {
            assert!((x - y).abs() < 1e-4, "ijk={x}, kij={y}");
        }
    }
}
