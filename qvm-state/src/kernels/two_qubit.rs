//! Generic two-qubit gate kernel

use num_complex::Complex64;
use qvm_gates::matrices::Matrix4;
use rayon::prelude::*;

/// Apply a 4×4 unitary to the (control, target) pair of bit positions
///
/// The matrix rows/columns are indexed by (control_bit, target_bit) with
/// control as the high bit: basis order |00⟩, |01⟩, |10⟩, |11⟩. The kernel
/// visits every 4-tuple of indices that differ only in the two bits, loading
/// the quartet once and writing it back once.
///
/// `control` and `target` must be distinct and caller-validated.
pub fn apply_two_qubit_gate(
    state: &mut [Complex64],
    matrix: &Matrix4,
    control: usize,
    target: usize,
    parallel: bool,
) {
    let c_mask = 1usize << control;
    let t_mask = 1usize << target;
    // Chunks spanning the higher of the two bits contain whole quartets.
    let span = 1usize << (control.max(target) + 1);

    if parallel && state.len() > span {
        state
            .par_chunks_mut(span)
            .for_each(|chunk| apply_to_chunk(chunk, matrix, c_mask, t_mask));
    } else {
        for chunk in state.chunks_mut(span) {
            apply_to_chunk(chunk, matrix, c_mask, t_mask);
        }
    }
}

#[inline]
fn apply_to_chunk(chunk: &mut [Complex64], m: &Matrix4, c_mask: usize, t_mask: usize) {
    for base in 0..chunk.len() {
        if base & c_mask != 0 || base & t_mask != 0 {
            continue;
        }

        let i00 = base;
        let i01 = base | t_mask;
        let i10 = base | c_mask;
        let i11 = base | c_mask | t_mask;

        let a00 = chunk[i00];
        let a01 = chunk[i01];
        let a10 = chunk[i10];
        let a11 = chunk[i11];

        chunk[i00] = m[0][0] * a00 + m[0][1] * a01 + m[0][2] * a10 + m[0][3] * a11;
        chunk[i01] = m[1][0] * a00 + m[1][1] * a01 + m[1][2] * a10 + m[1][3] * a11;
        chunk[i10] = m[2][0] * a00 + m[2][1] * a01 + m[2][2] * a10 + m[2][3] * a11;
        chunk[i11] = m[3][0] * a00 + m[3][1] * a01 + m[3][2] * a10 + m[3][3] * a11;
    }
}
