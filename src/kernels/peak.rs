//! Peak floating-point throughput microkernel.
//!
//! Not a matvec: it issues back-to-back fused multiply-adds on registers
//! loaded once from A and b, with no memory traffic in the loop. The FLOP
//! target is the same `2 * n * k` a real matvec of the operand shape would
//! cost, so its throughput is directly comparable with the other matvec
//! variants. Used for calibration only; its output is not a product.

use crate::error::{BenchError, Result};
use crate::matrix::{Matrix, MatvecShape};
use crate::simd::{PortableLane, VectorLane};
#[cfg(target_arch = "x86_64")]
use crate::simd::{Avx2Lane, avx2_available};

/// Upper bound on independent accumulation chains.
pub const MAX_FMA_CHAINS: usize = 32;

/// Runs `2 * n * k` FLOPs of register-only FMAs spread over `fma_chains`
/// independent accumulators. The accumulators are folded into the first
/// eight elements of `c` so the work cannot be discarded.
///
/// Two FMA ports per core typically saturate at two or more chains.
///
/// # Errors
///
/// `InvalidConfig` unless `1 <= fma_chains <= 32`; `ShapeMismatch` if the
/// operands are inconsistent or shorter than one register.
pub fn peak_fma(a: &Matrix, b: &Matrix, c: &mut Matrix, fma_chains: usize) -> Result<()> {
    let shape = MatvecShape::derive(a, b, c)?;
    check_operands(a, b, c, fma_chains)?;

    #[cfg(target_arch = "x86_64")]
    {
        if avx2_available() {
            unsafe {
                peak_fma_avx2(a.as_slice(), b.as_slice(), c.as_mut_slice(), shape, fma_chains)
            };
            return Ok(());
        }
    }

    unsafe {
        peak_lanes::<PortableLane>(a.as_slice(), b.as_slice(), c.as_mut_slice(), shape, fma_chains)
    };
    Ok(())
}

fn check_operands(a: &Matrix, b: &Matrix, c: &Matrix, fma_chains: usize) -> Result<()> {
    if !(1..=MAX_FMA_CHAINS).contains(&fma_chains) {
        return Err(BenchError::InvalidConfig(format!(
            "fma_chains must be in 1..={MAX_FMA_CHAINS}, got {fma_chains}"
        )));
    }
    let lanes = PortableLane::LANES;
    if a.len() < lanes || b.len() < lanes || c.len() < lanes {
        return Err(BenchError::shape(
            "peak_fma",
            format!("operands must hold at least {lanes} elements"),
        ));
    }
    Ok(())
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn peak_fma_avx2(a: &[f32], b: &[f32], c: &mut [f32], shape: MatvecShape, chains: usize) {
    peak_lanes::<Avx2Lane>(a, b, c, shape, chains)
}

/// # Safety
///
/// `L` must be usable on this CPU, every slice must hold at least
/// `L::LANES` elements and `1 <= chains <= MAX_FMA_CHAINS`.
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn peak_lanes<L: VectorLane>(
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
    shape: MatvecShape,
    chains: usize,
) {
    let a_reg = L::load(a.as_ptr());
    let b_reg = L::load(b.as_ptr());
    let mut acc = [L::zero(); MAX_FMA_CHAINS];

    let target_flop = shape.flops();
    let flop_per_iter = (2 * L::LANES * chains) as u64;
    let iterations = target_flop / flop_per_iter;
    let remainder = target_flop % flop_per_iter;

    for _ in 0..iterations {
        for reg in acc[..chains].iter_mut() {
            *reg = reg.mul_add(a_reg, b_reg);
        }
    }

    // Leftover flops as scalar multiply-adds, two flop each.
    let mut tail = 0.0f32;
    for i in 0..(remainder / 2) as usize {
        let lane = i % L::LANES;
        tail += a[lane] * b[lane];
    }

    let mut out = L::load(c.as_ptr());
    for reg in &acc[..chains] {
        out = out.add(*reg);
    }
    out.store(c.as_mut_ptr());
    c[0] += tail;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::fill::fill_constant;

    #[test]
    fn test_peak_accumulates_expected_total() {
        // n = 8, k = 16 -> 256 flop. 8 lanes x 2 chains = 32 flop per
        // iteration, so 8 iterations of 0.5 * 2.0 on each chain.
        let mut a = Matrix::new(16, 8).unwrap();
        let mut b = Matrix::column(16).unwrap();
        fill_constant(&mut a, 0.5);
        fill_constant(&mut b, 2.0);
        let mut c = Matrix::column(8).unwrap();

        peak_fma(&a, &b, &mut c, 2).unwrap();
        assert!(c.as_slice().iter().all(|&v| v == 16.0), "{:?}", c.as_slice());
    }

    #[test]
    fn test_peak_rejects_output_shorter_than_register() {
        let a = Matrix::new(16, 4).unwrap();
        let b = Matrix::column(16).unwrap();
        let mut c = Matrix::column(4).unwrap();
        assert!(matches!(
            peak_fma(&a, &b, &mut c, 2),
            Err(BenchError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_peak_remainder_goes_to_first_element() {
        // 2 * 8 * 9 = 144 flop, 1 chain -> 16 flop per iteration,
        // 9 iterations, no remainder.
        let mut a = Matrix::new(9, 8).unwrap();
        let mut b = Matrix::column(9).unwrap();
        fill_constant(&mut a, 1.0);
        fill_constant(&mut b, 1.0);
        let mut c = Matrix::column(8).unwrap();
        peak_fma(&a, &b, &mut c, 1).unwrap();
        assert!(c.as_slice().iter().all(|&v| v == 9.0));

        // 3 chains -> 48 flop per iteration, 3 iterations, nothing left.
        let mut c = Matrix::column(8).unwrap();
        peak_fma(&a, &b, &mut c, 3).unwrap();
        assert!(c.as_slice().iter().all(|&v| v == 9.0));

        // 5 chains -> 80 flop per iteration: 1 iteration, 64 flop left as
        // 32 scalar products on element 0.
        let mut c = Matrix::column(8).unwrap();
        peak_fma(&a, &b, &mut c, 5).unwrap();
        assert_eq!(c.as_slice()[0], 5.0 + 32.0);
        assert!(c.as_slice()[1..].iter().all(|&v| v == 5.0));
    }

    #[test]
    fn test_peak_rejects_bad_chain_count() {
        let a = Matrix::new(8, 8).unwrap();
        let b = Matrix::column(8).unwrap();
        let mut c = Matrix::column(8).unwrap();
        assert!(peak_fma(&a, &b, &mut c, 0).is_err());
        assert!(peak_fma(&a, &b, &mut c, 33).is_err());
    }
}
