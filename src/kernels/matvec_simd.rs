//! Vectorized matrix-vector product with a chunked register reduction.
//!
//! b is processed in chunks of `LANES * num_inner_reduction` elements. A
//! chunk of b is loaded into `num_inner_reduction` registers once, then
//! every row of A multiplies against those registers, collapses the
//! vector partial sum with a horizontal reduction and adds it to its
//! output element. K values beyond the last full chunk go through a scalar
//! remainder loop.

use crate::error::{BenchError, Result};
use crate::matrix::{Matrix, MatvecShape};
use crate::simd::{PortableLane, VectorLane};
#[cfg(target_arch = "x86_64")]
use crate::simd::{Avx2Lane, avx2_available};

/// Upper bound on registers held per chunk of b.
pub const MAX_INNER_REDUCTION: usize = 32;

/// Vectorized matvec on the best lane this CPU supports (AVX2+FMA when
/// detected, otherwise the portable lane).
///
/// # Errors
///
/// `InvalidConfig` unless `1 <= num_inner_reduction <= 32`;
/// `ShapeMismatch` on bad operands.
pub fn matvec_simd(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    num_inner_reduction: usize,
) -> Result<()> {
    let shape = MatvecShape::derive(a, b, c)?;
    check_reduction(num_inner_reduction)?;

    #[cfg(target_arch = "x86_64")]
    {
        if avx2_available() {
            unsafe { matvec_simd_avx2(a, b, c, shape, num_inner_reduction) };
            return Ok(());
        }
    }

    // Portable lane has no feature requirement; shape was checked above.
    unsafe {
        matvec_lanes::<PortableLane>(
            a.as_slice(),
            b.as_slice(),
            c.as_mut_slice(),
            shape,
            num_inner_reduction,
        )
    };
    Ok(())
}

/// Same as [`matvec_simd`] but always uses the portable `wide` lane.
pub fn matvec_simd_portable(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    num_inner_reduction: usize,
) -> Result<()> {
    let shape = MatvecShape::derive(a, b, c)?;
    check_reduction(num_inner_reduction)?;
    unsafe {
        matvec_lanes::<PortableLane>(
            a.as_slice(),
            b.as_slice(),
            c.as_mut_slice(),
            shape,
            num_inner_reduction,
        )
    };
    Ok(())
}

fn check_reduction(num_inner_reduction: usize) -> Result<()> {
    if !(1..=MAX_INNER_REDUCTION).contains(&num_inner_reduction) {
        return Err(BenchError::InvalidConfig(format!(
            "num_inner_reduction must be in 1..={MAX_INNER_REDUCTION}, got {num_inner_reduction}"
        )));
    }
    Ok(())
}

/// # Safety
///
/// Caller must ensure the CPU supports AVX2 and FMA and that `shape`
/// was derived from these operands.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn matvec_simd_avx2(
    a: &Matrix,
    b: &Matrix,
    c: &mut Matrix,
    shape: MatvecShape,
    num_inner_reduction: usize,
) {
    matvec_lanes::<Avx2Lane>(
        a.as_slice(),
        b.as_slice(),
        c.as_mut_slice(),
        shape,
        num_inner_reduction,
    )
}

/// # Safety
///
/// - `L` must be usable on this CPU
/// - `a.len() == n * k`, `b.len() == k`, `c.len() == n`
/// - `1 <= r <= MAX_INNER_REDUCTION`
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn matvec_lanes<L: VectorLane>(
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    shape: MatvecShape,
    r: usize,
) {
    let MatvecShape { n, k } = shape;
    let chunk = L::LANES * r;
    let blocks = k / chunk;

    c.fill(0.0);

    let mut b_regs = [L::zero(); MAX_INNER_REDUCTION];
    for block in 0..blocks {
        let base = block * chunk;

        // Load this chunk of b once, reuse it for every row.
        for (q, reg) in b_regs[..r].iter_mut().enumerate() {
            *reg = L::load(b.as_ptr().add(base + q * L::LANES));
        }

        for (row, out) in c.iter_mut().enumerate() {
            let a_ptr = a.as_ptr().add(row * k + base);
            let mut acc = L::zero();
            for (q, b_reg) in b_regs[..r].iter().enumerate() {
                acc = acc.mul_add(L::load(a_ptr.add(q * L::LANES)), *b_reg);
            }
            *out += acc.horizontal_sum();
        }
    }

    let tail = blocks * chunk;
    if tail < k {
        for row in 0..n {
            let a_row = &a[row * k + tail..(row + 1) * k];
            let mut acc = 0.0f32;
            for (&a_p, &b_p) in a_row.iter().zip(&b[tail..]) {
                acc += a_p * b_p;
            }
            c[row] += acc;
        }
    }
}
