//! Single-qubit gate kernel

use num_complex::Complex64;
use qvm_gates::matrices::Matrix2;
use rayon::prelude::*;

/// Apply a 2×2 unitary to bit position `qubit`, in place
///
/// For every index pair (i, i ⊕ 2^qubit) with the qubit bit of i clear, the
/// pair (a_i, a_j) is replaced by (U₀₀·a_i + U₀₁·a_j, U₁₀·a_i + U₁₁·a_j).
/// One pass, two temporaries per pair.
///
/// # Arguments
/// * `state` - amplitude slice of length 2^num_qubits
/// * `matrix` - 2×2 gate matrix in row-major order
/// * `qubit` - target bit position (caller-validated)
/// * `parallel` - whether to split the pass across threads
pub fn apply_single_qubit_gate(
    state: &mut [Complex64],
    matrix: &Matrix2,
    qubit: usize,
    parallel: bool,
) {
    let stride = 1usize << qubit;

    if parallel {
        // Each chunk of 2·stride amplitudes holds complete (low, high) pairs,
        // so chunks can be transformed independently.
        state
            .par_chunks_mut(stride * 2)
            .for_each(|chunk| apply_to_chunk(chunk, matrix, stride));
    } else {
        for chunk in state.chunks_mut(stride * 2) {
            apply_to_chunk(chunk, matrix, stride);
        }
    }
}

#[inline]
fn apply_to_chunk(chunk: &mut [Complex64], matrix: &Matrix2, stride: usize) {
    let m00 = matrix[0][0];
    let m01 = matrix[0][1];
    let m10 = matrix[1][0];
    let m11 = matrix[1][1];

    let (lo, hi) = chunk.split_at_mut(stride);
    for k in 0..stride {
        let a0 = lo[k];
        let a1 = hi[k];
        lo[k] = m00 * a0 + m01 * a1;
        hi[k] = m10 * a0 + m11 * a1;
    }
}
