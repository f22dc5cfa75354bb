//! Specialized kernels for controlled and permutation gates
//!
//! CNOT, SWAP, Toffoli and Fredkin permute amplitudes and CZ flips a single
//! phase, so none of them need matrix multiplication. Each loop masks the
//! iteration down to the indices that actually move, halving or quartering
//! the touched amplitudes relative to the generic path.

use num_complex::Complex64;
use qvm_gates::matrices::Matrix2;

/// Apply CNOT: for every index with the control bit set, swap the pair that
/// differs in the target bit. No multiplications.
pub fn apply_cnot(state: &mut [Complex64], control: usize, target: usize) {
    let c_mask = 1usize << control;
    let t_mask = 1usize << target;

    for i in 0..state.len() {
        if i & c_mask != 0 && i & t_mask == 0 {
            state.swap(i, i | t_mask);
        }
    }
}

/// Apply CZ: negate the amplitude of every index with both bits set
pub fn apply_cz(state: &mut [Complex64], a: usize, b: usize) {
    let mask = (1usize << a) | (1usize << b);

    for (i, amp) in state.iter_mut().enumerate() {
        if i & mask == mask {
            *amp = -*amp;
        }
    }
}

/// Apply SWAP: exchange amplitudes of every index pair that differs in
/// exactly the two bits. Iterating only indices with bit `a` clear and bit
/// `b` set halves the workload.
pub fn apply_swap(state: &mut [Complex64], a: usize, b: usize) {
    let a_mask = 1usize << a;
    let b_mask = 1usize << b;
    let both = a_mask | b_mask;

    for i in 0..state.len() {
        if i & a_mask == 0 && i & b_mask != 0 {
            state.swap(i, i ^ both);
        }
    }
}

/// Apply Toffoli: swap the target pair wherever both control bits are set
pub fn apply_toffoli(state: &mut [Complex64], c1: usize, c2: usize, target: usize) {
    let controls = (1usize << c1) | (1usize << c2);
    let t_mask = 1usize << target;

    for i in 0..state.len() {
        if i & controls == controls && i & t_mask == 0 {
            state.swap(i, i | t_mask);
        }
    }
}

/// Apply Fredkin (controlled SWAP): swap the target pair wherever the
/// control bit is set
pub fn apply_fredkin(state: &mut [Complex64], control: usize, a: usize, b: usize) {
    let c_mask = 1usize << control;
    let a_mask = 1usize << a;
    let b_mask = 1usize << b;
    let both = a_mask | b_mask;

    for i in 0..state.len() {
        if i & c_mask != 0 && i & a_mask == 0 && i & b_mask != 0 {
            state.swap(i, i ^ both);
        }
    }
}

/// Apply an arbitrary controlled-U: the 2×2 unitary acts on the target pair
/// wherever the control bit is set
pub fn apply_controlled_u(
    state: &mut [Complex64],
    control: usize,
    target: usize,
    u: &Matrix2,
) {
    let c_mask = 1usize << control;
    let t_mask = 1usize << target;

    for i in 0..state.len() {
        if i & c_mask != 0 && i & t_mask == 0 {
            let j = i | t_mask;
            let a0 = state[i];
            let a1 = state[j];
            state[i] = u[0][0] * a0 + u[0][1] * a1;
            state[j] = u[1][0] * a0 + u[1][1] * a1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::two_qubit::apply_two_qubit_gate;
    use approx::assert_relative_eq;
    use qvm_gates::matrices::{self, PAULI_X};

    fn probe_state(n: usize) -> Vec<Complex64> {
        let dim = 1usize << n;
        let mut amps: Vec<Complex64> = (0..dim)
            .map(|i| Complex64::new((i as f64 * 0.41).sin(), (i as f64 * 0.23).cos()))
            .collect();
        let norm: f64 = amps.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        for a in amps.iter_mut() {
            *a /= norm;
        }
        amps
    }

    #[test]
    fn test_cnot_fast_path_matches_generic_kernel() {
        for (c, t) in [(0usize, 1usize), (1, 0), (2, 0), (0, 2), (3, 1)] {
            let mut fast = probe_state(4);
            let mut generic = fast.clone();

            apply_cnot(&mut fast, c, t);
            apply_two_qubit_gate(&mut generic, &matrices::CNOT, c, t, false);

            for (a, b) in fast.iter().zip(generic.iter()) {
                assert_relative_eq!(a.re, b.re, epsilon = 1e-10);
                assert_relative_eq!(a.im, b.im, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_swap_fast_path_matches_generic_kernel() {
        let mut fast = probe_state(4);
        let mut generic = fast.clone();

        apply_swap(&mut fast, 1, 3);
        apply_two_qubit_gate(&mut generic, &matrices::SWAP, 1, 3, false);

        for (a, b) in fast.iter().zip(generic.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-10);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_cz_fast_path_matches_generic_kernel() {
        let mut fast = probe_state(3);
        let mut generic = fast.clone();

        apply_cz(&mut fast, 0, 2);
        apply_two_qubit_gate(&mut generic, &matrices::CZ, 0, 2, false);

        for (a, b) in fast.iter().zip(generic.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-10);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_controlled_u_with_x_equals_cnot() {
        let mut cu = probe_state(3);
        let mut cnot = cu.clone();

        apply_controlled_u(&mut cu, 2, 0, &PAULI_X);
        apply_cnot(&mut cnot, 2, 0);

        for (a, b) in cu.iter().zip(cnot.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-10);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_toffoli_flips_only_when_both_controls_set() {
        // |110⟩ (index 6) → |111⟩ (index 7) with controls 1,2 and target 0
        let mut state = vec![Complex64::new(0.0, 0.0); 8];
        state[6] = Complex64::new(1.0, 0.0);
        apply_toffoli(&mut state, 1, 2, 0);
        assert_relative_eq!(state[7].norm(), 1.0, epsilon = 1e-10);

        // |010⟩ (index 2) stays put: only one control set
        let mut state = vec![Complex64::new(0.0, 0.0); 8];
        state[2] = Complex64::new(1.0, 0.0);
        apply_toffoli(&mut state, 1, 2, 0);
        assert_relative_eq!(state[2].norm(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_fredkin_swaps_targets_when_control_set() {
        // control = bit 2, targets = bits 0, 1
        // |101⟩ (index 5) → |110⟩ (index 6)
        let mut state = vec![Complex64::new(0.0, 0.0); 8];
        state[5] = Complex64::new(1.0, 0.0);
        apply_fredkin(&mut state, 2, 0, 1);
        assert_relative_eq!(state[6].norm(), 1.0, epsilon = 1e-10);

        // |001⟩ (index 1) untouched: control clear
        let mut state = vec![Complex64::new(0.0, 0.0); 8];
        state[1] = Complex64::new(1.0, 0.0);
        apply_fredkin(&mut state, 2, 0, 1);
        assert_relative_eq!(state[1].norm(), 1.0, epsilon = 1e-10);
    }
}
