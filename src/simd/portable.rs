//! Portable 8-lane vector built on `wide`.

use wide::f32x8;

use super::VectorLane;

/// Eight `f32` lanes in a `wide::f32x8`. Safe on every target; the
/// compiler lowers it to whatever vector width is available.
#[derive(Clone, Copy, Debug)]
pub struct PortableLane(f32x8);

impl VectorLane for PortableLane {
    const LANES: usize = 8;

    #[inline(always)]
    unsafe fn zero() -> Self {
        PortableLane(f32x8::splat(0.0))
    }

    #[inline(always)]
    unsafe fn load(src: *const f32) -> Self {
        let vals: [f32; 8] = unsafe { src.cast::<[f32; 8]>().read_unaligned() };
        PortableLane(f32x8::from(vals))
    }

    #[inline(always)]
    unsafe fn store(self, dst: *mut f32) {
        let vals: [f32; 8] = self.0.into();
        unsafe { dst.cast::<[f32; 8]>().write_unaligned(vals) };
    }

    #[inline(always)]
    unsafe fn mul_add(self, a: Self, b: Self) -> Self {
        PortableLane(a.0 * b.0 + self.0)
    }

    #[inline(always)]
    unsafe fn add(self, other: Self) -> Self {
        PortableLane(self.0 + other.0)
    }

    #[inline(always)]
    unsafe fn horizontal_sum(self) -> f32 {
        let vals: [f32; 8] = self.0.into();
        // Pairwise, matching the register-halving order of the AVX2 lane.
        let quad = [
            vals[0] + vals[4],
            vals[1] + vals[5],
            vals[2] + vals[6],
            vals[3] + vals[7],
        ];
        (quad[0] + quad[2]) + (quad[1] + quad[3])
    }
}
