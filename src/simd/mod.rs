//! Fixed-width vector lanes used by the vectorized matvec kernels.
//!
//! The chunked-reduction algorithm only needs four operations from the
//! hardware: load, fused multiply-add, store and a horizontal sum. Each
//! target provides them behind [`VectorLane`]; kernels are written once,
//! generic over the lane.
//!
//! - `portable`: `wide::f32x8`, available everywhere
//! - `avx2`: raw AVX2/FMA intrinsics on x86_64

pub mod portable;

#[cfg(target_arch = "x86_64")]
pub mod avx2;

pub use portable::PortableLane;

#[cfg(target_arch = "x86_64")]
pub use avx2::Avx2Lane;

/// One SIMD register worth of `f32` lanes.
///
/// # Safety
///
/// All operations are `unsafe` because hardware-backed implementations
/// require the matching CPU features; callers must check them (see
/// [`avx2_available`]) before using such a lane. Loads and stores
/// additionally require `LANES` valid elements behind the pointer.
pub trait VectorLane: Copy {
    /// Number of `f32` values in one register.
    const LANES: usize;

    unsafe fn zero() -> Self;

    /// Unaligned load of `LANES` values.
    unsafe fn load(src: *const f32) -> Self;

    /// Unaligned store of `LANES` values.
    unsafe fn store(self, dst: *mut f32);

    /// `self + a * b`, fused where the hardware supports it.
    unsafe fn mul_add(self, a: Self, b: Self) -> Self;

    unsafe fn add(self, other: Self) -> Self;

    /// Sum of all lanes.
    unsafe fn horizontal_sum(self) -> f32;
}

/// True when the AVX2 lane can be used on this CPU.
pub fn avx2_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")
    }

    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

/// Name of the lane implementation the auto-dispatching kernels pick.
pub fn active_lane() -> &'static str {
    if avx2_available() { "avx2" } else { "portable" }
}
