//! Cache-tiled matrix multiplication with compile-time tile extents.
//!
//! N, M and K are split into `TN × TM × TK` tiles. For each output tile a
//! stack-resident `TN × TM` accumulator is zeroed once, receives the
//! partial products of every `tile_k` step, and is written to C once at
//! the end. Tile extents must divide their dimension; there is no
//! remainder path.

use crate::error::Result;
use crate::matrix::{Matrix, MatmulShape};

/// Loop order used inside one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InnerOrder {
    /// Dot product per accumulator cell.
    Ijk,
    /// Rank-1 updates of the whole tile, one k at a time.
    Kij,
}

impl InnerOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            InnerOrder::Ijk => "ijk",
            InnerOrder::Kij => "kij",
        }
    }
}

/// Tiled C = A * B with the given inner order.
///
/// # Errors
///
/// - `ShapeMismatch` if the operand shapes are incompatible
/// - `UnsupportedTileSize` if `TN`, `TM` or `TK` does not divide `n`, `m`
///   or `k` (or is zero)
pub fn matmul_tiled<const TN: usize, const TM: usize, const TK: usize>(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    order: InnerOrder,
) -> Result<()> {
    let shape = MatmulShape::derive(a, b, c)?;
    shape.check_tiles(TN, TM, TK)?;

    match order {
        InnerOrder::Ijk => {
            tiled_loop::<TN, TM, TK, _>(a, b, c, shape, accumulate_ijk::<TN, TM, TK>)
        }
        InnerOrder::Kij => {
            tiled_loop::<TN, TM, TK, _>(a, b, c, shape, accumulate_kij::<TN, TM, TK>)
        }
    }
    Ok(())
}

/// [`matmul_tiled`] with the i-j-k inner order.
pub fn matmul_tiled_ijk<const TN: usize, const TM: usize, const TK: usize>(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
) -> Result<()> {
    matmul_tiled::<TN, TM, TK>(a, b, c, InnerOrder::Ijk)
}

/// [`matmul_tiled`] with the k-i-j inner order.
pub fn matmul_tiled_kij<const TN: usize, const TM: usize, const TK: usize>(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
) -> Result<()> {
    matmul_tiled::<TN, TM, TK>(a, b, c, InnerOrder::Kij)
}

#[inline(always)]
fn tiled_loop<const TN: usize, const TM: usize, const TK: usize, F>(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    shape: MatmulShape,
    accumulate: F,
) where
    F: Fn(&Matrix, &Matrix, &mut [[f32; TM]; TN], usize, usize, usize),
{
    for tile_i in 0..shape.n / TN {
        for tile_j in 0..shape.m / TM {
            let (i0, j0) = (tile_i * TN, tile_j * TM);
            let mut tile = [[0.0f32; TM]; TN];

            // The accumulator spans every k tile; writing back inside this
            // loop would keep only the last tile_k partial sum.
            for tile_k in 0..shape.k / TK {
                accumulate(a, b, &mut tile, i0, j0, tile_k * TK);
            }

            for (ii, row) in tile.iter().enumerate() {
                for (jj, &value) in row.iter().enumerate() {
                    unsafe { *c.access(i0 + ii, j0 + jj) = value };
                }
            }
        }
    }
}

// All indices below stay inside the tile origin + extent, which
// check_tiles proved lies inside the operands.

#[inline(always)]
fn accumulate_ijk<const TN: usize, const TM: usize, const TK: usize>(
    a: &Matrix,
    b: &Matrix,
    tile: &mut [[f32; TM]; TN],
    i0: usize,
    j0: usize,
    k0: usize,
) {
    for (ii, row) in tile.iter_mut().enumerate() {
        for (jj, cell) in row.iter_mut().enumerate() {
            let mut acc = *cell;
            for kk in 0..TK {
                acc += unsafe { a.read(i0 + ii, k0 + kk) * b.read(k0 + kk, j0 + jj) };
            }
            *cell = acc;
        }
    }
}

#[inline(always)]
fn accumulate_kij<const TN: usize, const TM: usize, const TK: usize>(
    a: &Matrix,
    b: &Matrix,
    tile: &mut [[f32; TM]; TN],
    i0: usize,
    j0: usize,
    k0: usize,
) {
    for kk in 0..TK {
        for (ii, row) in tile.iter_mut().enumerate() {
            let a_ik = unsafe { a.read(i0 + ii, k0 + kk) };
            for (jj, cell) in row.iter_mut().enumerate() {
                *cell += a_ik * unsafe { b.read(k0 + kk, j0 + jj) };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::kernels::naive_ijk::matmul_naive_ijk;
    use crate::matrix::fill::{fill_constant, random_matrix};
    use proptest::prelude::*;

    fn assert_close(expected: &Matrix, actual: &Matrix, name: &str) {
        for (idx, (x, y)) in expected.as_slice().iter().zip(actual.as_slice()).enumerate() {
            assert!(
                (x - y).abs() <= 1e-3 * x.abs().max(1.0),
                "{name}: mismatch at {idx}: expected {x}, got {y}"
            );
        }
    }

    #[test]
    fn test_tiled_accumulates_across_k_tiles() {
        // With K split into two tiles, keeping only the last tile_k partial
        // sum would yield 2 instead of 4.
        let mut a = Matrix::new(4, 4).unwrap();
        let mut b = Matrix::new(4, 4).unwrap();
        fill_constant(&mut a, 1.0);
        fill_constant(&mut b, 1.0);

        for order in [InnerOrder::Ijk, InnerOrder::Kij] {
            let mut c = Matrix::new(4, 4).unwrap();
            matmul_tiled::<2, 2, 2>(&a, &b, &mut c, order).unwrap();
            assert!(c.as_slice().iter().all(|&v| v == 4.0), "{order:?}: {:?}", c.as_slice());
        }
    }

    #[test]
    fn test_tiled_rectangular_tiles() {
        let (n, m, k) = (16, 24, 32);
        let a = random_matrix(k, n, 10).unwrap();
        let b = random_matrix(m, k, 11).unwrap();
        let mut c_ref = Matrix::new(m, n).unwrap();
        matmul_naive_ijk(&a, &b, &mut c_ref).unwrap();

        let mut c = random_matrix(m, n, 12).unwrap();
        matmul_tiled_kij::<4, 8, 16>(&a, &b, &mut c).unwrap();
        assert_close(&c_ref, &c, "tiled_kij_4x8x16");

        let mut c = random_matrix(m, n, 13).unwrap();
        matmul_tiled_ijk::<8, 4, 2>(&a, &b, &mut c).unwrap();
        assert_close(&c_ref, &c, "tiled_ijk_8x4x2");
    }

    #[test]
    fn test_tiled_rejects_indivisible_dims() {
        let a = Matrix::new(12, 10).unwrap();
        let b = Matrix::new(8, 12).unwrap();
        let mut c = Matrix::new(8, 10).unwrap();

        let err = matmul_tiled_ijk::<4, 4, 4>(&a, &b, &mut c).unwrap_err();
        assert_eq!(
            err,
            BenchError::UnsupportedTileSize {
                dim: "N",
                extent: 10,
                tile: 4
            }
        );
    }

    proptest! {
        #[test]
        fn tiled_variants_match_oracle(tn in 1usize..4, tm in 1usize..4, tk in 1usize..5, seed in any::<u64>()) {
            let (n, m, k) = (tn * 4, tm * 4, tk * 4);
            let a = random_matrix(k, n, seed).unwrap();
            let b = random_matrix(m, k, seed ^ 0x9E37_79B9).unwrap();
            let mut c_ref = Matrix::new(m, n).unwrap();
            matmul_naive_ijk(&a, &b, &mut c_ref).unwrap();

            let mut c_ijk = Matrix::new(m, n).unwrap();
            let mut c_kij = Matrix::new(m, n).unwrap();
            matmul_tiled_ijk::<4, 4, 4>(&a, &b, &mut c_ijk).unwrap();
            matmul_tiled_kij::<4, 4, 4>(&a, &b, &mut c_kij).unwrap();

            for idx in 0..c_ref.len() {
                let r = c_ref.as_slice()[idx];
                prop_assert!((c_ijk.as_slice()[idx] - r).abs() <= 1e-3 * r.abs().max(1.0));
                prop_assert!((c_kij.as_slice()[idx] - r).abs() <= 1e-3 * r.abs().max(1.0));
            }
        }
    }
}
