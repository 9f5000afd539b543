//! AVX2 + FMA vector lane (x86_64 only).

use std::arch::x86_64::*;

use super::VectorLane;

/// Eight `f32` lanes in one YMM register.
///
/// Every method requires AVX2 and FMA; construct this lane only after
/// [`super::avx2_available`] returned true.
#[derive(Clone, Copy, Debug)]
pub struct Avx2Lane(__m256);

impl VectorLane for Avx2Lane {
    const LANES: usize = 8;

    #[inline(always)]
    unsafe fn zero() -> Self {
        unsafe { Avx2Lane(_mm256_setzero_ps()) }
    }

    #[inline(always)]
    unsafe fn load(src: *const f32) -> Self {
        unsafe { Avx2Lane(_mm256_loadu_ps(src)) }
    }

    #[inline(always)]
    unsafe fn store(self, dst: *mut f32) {
        unsafe { _mm256_storeu_ps(dst, self.0) }
    }

    #[inline(always)]
    unsafe fn mul_add(self, a: Self, b: Self) -> Self {
        unsafe { Avx2Lane(_mm256_fmadd_ps(a.0, b.0, self.0)) }
    }

    #[inline(always)]
    unsafe fn add(self, other: Self) -> Self {
        unsafe { Avx2Lane(_mm256_add_ps(self.0, other.0)) }
    }

    /// Halve the register three times: 8 -> 4 -> 2 -> 1 lanes.
    #[inline(always)]
    unsafe fn horizontal_sum(self) -> f32 {
        unsafe {
            let hi = _mm256_extractf128_ps(self.0, 1);
            let lo = _mm256_castps256_ps128(self.0);
            // (x0+x4, x1+x5, x2+x6, x3+x7)
            let quad = _mm_add_ps(lo, hi);
            // (x0+x4+x2+x6, x1+x5+x3+x7, ..)
            let dual = _mm_add_ps(quad, _mm_movehl_ps(quad, quad));
            let sum = _mm_add_ss(dual, _mm_shuffle_ps(dual, dual, 0x1));
            _mm_cvtss_f32(sum)
        }
    }
}
