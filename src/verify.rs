//! Element-wise comparison of a candidate output against the oracle.
//!
//! Kernels that sum in a different order than the oracle round
//! differently, so results are compared with a relative tolerance rather
//! than bit-for-bit. Where the reference is too close to zero for a
//! relative error to mean anything, the absolute error is used instead.

use crate::error::{BenchError, Result};

/// Default relative tolerance. Deliberately loose: accumulation order
/// differs between variants.
pub const DEFAULT_TOLERANCE: f64 = 1e-2;

/// References with magnitude below this are compared by absolute error.
pub const ABS_FLOOR: f64 = 1e-6;

/// Outcome of comparing two buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verification {
    pub passed: bool,
    /// Largest per-element error seen (relative, or absolute near zero).
    pub max_error: f64,
    /// Index of the first element at or above the tolerance.
    pub first_mismatch: Option<usize>,
}

/// `|candidate - reference| / |reference|`, or the absolute difference when
/// `|reference| < ABS_FLOOR`. Returns NaN if either value is NaN.
pub fn relative_error(candidate: f32, reference: f32) -> f64 {
    let (c, r) = (candidate as f64, reference as f64);
    let diff = (c - r).abs();
    if r.abs() < ABS_FLOOR { diff } else { diff / r.abs() }
}

/// Compares `candidate` with `reference` element by element.
///
/// An element passes when its error is strictly below `tolerance`. NaN or
/// infinite errors never pass.
///
/// # Errors
///
/// `ShapeMismatch` if the slices differ in length.
pub fn verify(candidate: &[f32], reference: &[f32], tolerance: f64) -> Result<Verification> {
    if candidate.len() != reference.len() {
        return Err(BenchError::shape(
            "verify",
            format!(
                "candidate has {} elements, reference has {}",
                candidate.len(),
                reference.len()
            ),
        ));
    }

    let mut max_error = 0.0f64;
    let mut first_mismatch = None;
    for (idx, (&c, &r)) in candidate.iter().zip(reference).enumerate() {
        let err = relative_error(c, r);
        let ok = err.is_finite() && err < tolerance;
        if !ok && first_mismatch.is_none() {
            first_mismatch = Some(idx);
        }
        if err.is_nan() {
            max_error = f64::NAN;
        } else if err > max_error {
            max_error = err;
        }
    }

    Ok(Verification {
        passed: first_mismatch.is_none(),
        max_error,
        first_mismatch,
    })
}

/// True iff every element is within `tolerance`; false on length mismatch.
pub fn is_same(candidate: &[f32], reference: &[f32], tolerance: f64) -> bool {
    verify(candidate, reference, tolerance).is_ok_and(|v| v.passed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_buffers_pass() {
        let v = verify(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], DEFAULT_TOLERANCE).unwrap();
        assert!(v.passed);
        assert_eq!(v.max_error, 0.0);
        assert_eq!(v.first_mismatch, None);
    }

    #[test]
    fn test_relative_tolerance_boundary() {
        // 0.5% off passes, 2% off fails
        assert!(is_same(&[100.5], &[100.0], DEFAULT_TOLERANCE));
        let v = verify(&[1.0, 102.0], &[1.0, 100.0], DEFAULT_TOLERANCE).unwrap();
        assert!(!v.passed);
        assert_eq!(v.first_mismatch, Some(1));
        assert!((v.max_error - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_near_zero_reference_uses_absolute_error() {
        assert!((relative_error(0.001, 0.0) - 0.001).abs() < 1e-9);
        assert!(is_same(&[0.001], &[0.0], DEFAULT_TOLERANCE));
        assert!(is_same(&[0.0], &[0.0], DEFAULT_TOLERANCE));
        assert!(!is_same(&[0.5], &[0.0], DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_nan_never_passes() {
        assert!(!is_same(&[f32::NAN], &[1.0], DEFAULT_TOLERANCE));
        assert!(!is_same(&[1.0], &[f32::NAN], DEFAULT_TOLERANCE));
        assert!(!is_same(&[f32::INFINITY], &[1.0], DEFAULT_TOLERANCE));
        assert!(verify(&[f32::NAN], &[1.0], DEFAULT_TOLERANCE).unwrap().max_error.is_nan());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            verify(&[1.0], &[1.0, 2.0], DEFAULT_TOLERANCE),
            Err(BenchError::ShapeMismatch { op: "verify", .. })
        ));
        assert!(!is_same(&[1.0], &[1.0, 2.0], DEFAULT_TOLERANCE));
    }
}
