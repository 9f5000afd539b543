use crate::error::Result;
use crate::matrix::{Matrix, MatvecShape};

/// Baseline matrix-vector product c = A * b.
///
/// One scalar accumulator per output row, summed with k ascending. Serves
/// as the reference oracle for the matvec family.
pub fn matvec_naive(a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
    MatvecShape::derive(a, b, c)?;
    let b = b.as_slice();
    let c = c.as_mut_slice();

    for (row, out) in c.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        for (p, &b_p) in b.iter().enumerate() {
            acc += unsafe { a.read(row, p) } * b_p;
        }
        *out = acc;
    }
    Ok(())
}
