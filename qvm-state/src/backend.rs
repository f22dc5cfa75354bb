//! State-backend abstraction
//!
//! The interpreter and engines are written against the dense
//! [`StateVector`], but the operations they need form a small capability set
//! that alternative representations (density matrix, stabilizer tableau,
//! matrix product state) can also provide. This trait pins that set down so
//! a different backend can slot in without touching the interpreter.

use crate::error::Result;
use crate::state_vector::StateVector;
use num_complex::Complex64;
use qvm_gates::matrices::{Matrix2, Matrix4};

/// Capability set required of any quantum state representation
pub trait StateBackend {
    /// Number of allocated qubits
    fn num_qubits(&self) -> usize;

    /// Allocate one qubit in |0⟩; returns its bit position
    fn allocate(&mut self) -> Result<usize>;

    /// Apply a 2×2 unitary to one qubit
    fn apply_single_qubit_gate(&mut self, qubit: usize, matrix: &Matrix2) -> Result<()>;

    /// Apply a 4×4 unitary to a (control, target) pair
    fn apply_two_qubit_gate(&mut self, control: usize, target: usize, matrix: &Matrix4)
        -> Result<()>;

    /// CNOT fast path
    fn apply_cnot(&mut self, control: usize, target: usize) -> Result<()>;

    /// SWAP fast path
    fn apply_swap(&mut self, a: usize, b: usize) -> Result<()>;

    /// Collapsing measurement of one qubit given a uniform draw from [0, 1)
    fn measure(&mut self, qubit: usize, random_value: f64) -> Result<u8>;

    /// Rescale to unit norm if drifted
    fn normalize(&mut self);

    /// Probability of one basis state
    fn probability(&mut self, basis_state: usize) -> Result<f64>;

    /// Copy of the dense amplitude representation
    fn snapshot(&self) -> Vec<Complex64>;
}

impl StateBackend for StateVector {
    fn num_qubits(&self) -> usize {
        StateVector::num_qubits(self)
    }

    fn allocate(&mut self) -> Result<usize> {
        StateVector::allocate(self)
    }

    fn apply_single_qubit_gate(&mut self, qubit: usize, matrix: &Matrix2) -> Result<()> {
        StateVector::apply_single_qubit_gate(self, qubit, matrix)
    }

    fn apply_two_qubit_gate(
        &mut self,
        control: usize,
        target: usize,
        matrix: &Matrix4,
    ) -> Result<()> {
        StateVector::apply_two_qubit_gate(self, control, target, matrix)
    }

    fn apply_cnot(&mut self, control: usize, target: usize) -> Result<()> {
        StateVector::apply_cnot(self, control, target)
    }

    fn apply_swap(&mut self, a: usize, b: usize) -> Result<()> {
        StateVector::apply_swap(self, a, b)
    }

    fn measure(&mut self, qubit: usize, random_value: f64) -> Result<u8> {
        StateVector::measure_qubit(self, qubit, random_value)
    }

    fn normalize(&mut self) {
        StateVector::normalize(self)
    }

    fn probability(&mut self, basis_state: usize) -> Result<f64> {
        StateVector::probability(self, basis_state)
    }

    fn snapshot(&self) -> Vec<Complex64> {
        StateVector::snapshot(self)
    }
}
