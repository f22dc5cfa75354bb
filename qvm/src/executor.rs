//! Gate executor
//!
//! Thin translation layer between handle-level gate requests and the
//! bit-position kernels: resolves handles through the registry, records
//! entanglement for every multi-qubit gate, builds rotation matrices on the
//! fly, and keeps per-gate-name counters. Fixed controlled gates bypass the
//! generic matrix kernels entirely.

use crate::error::Result;
use crate::qubit::QubitHandle;
use crate::registry::QubitRegistry;
use ahash::AHashMap;
use qvm_gates::matrices::{self, Matrix2};
use qvm_gates::validation;
use qvm_qbc::{RotationGate, SingleGate, ThreeQubitGate, TwoQubitGate};
use qvm_state::StateVector;
use tracing::warn;

/// Dispatches gate requests to the state-vector kernels
#[derive(Debug, Default)]
pub struct GateExecutor {
    total: u64,
    by_gate: AHashMap<&'static str, u64>,
    debug: bool,
}

impl GateExecutor {
    /// Create an executor; `debug` enables unitarity checks on
    /// caller-supplied matrices
    pub fn new(debug: bool) -> Self {
        Self {
            total: 0,
            by_gate: AHashMap::new(),
            debug,
        }
    }

    fn record(&mut self, name: &'static str) {
        self.total += 1;
        *self.by_gate.entry(name).or_insert(0) += 1;
    }

    /// Total gates applied since the last reset
    pub fn total_gates(&self) -> u64 {
        self.total
    }

    /// Applications of one named gate
    pub fn gate_count(&self, name: &str) -> u64 {
        self.by_gate.get(name).copied().unwrap_or(0)
    }

    /// Per-gate counters, sorted by name
    pub fn counters(&self) -> Vec<(&'static str, u64)> {
        let mut counts: Vec<_> = self.by_gate.iter().map(|(&k, &v)| (k, v)).collect();
        counts.sort_unstable_by_key(|&(name, _)| name);
        counts
    }

    /// Clear all counters
    pub fn reset(&mut self) {
        self.total = 0;
        self.by_gate.clear();
    }

    /// Apply a fixed single-qubit gate
    pub fn apply_single(
        &mut self,
        state: &mut StateVector,
        registry: &QubitRegistry,
        handle: QubitHandle,
        gate: SingleGate,
    ) -> Result<()> {
        let qubit = registry.index_of(handle)?;
        let (name, matrix): (&'static str, &Matrix2) = match gate {
            SingleGate::X => ("X", &matrices::PAULI_X),
            SingleGate::Y => ("Y", &matrices::PAULI_Y),
            SingleGate::Z => ("Z", &matrices::PAULI_Z),
            SingleGate::H => ("H", &matrices::HADAMARD),
            SingleGate::S => ("S", &matrices::S_GATE),
            SingleGate::T => ("T", &matrices::T_GATE),
        };
        state.apply_single_qubit_gate(qubit, matrix)?;
        self.record(name);
        Ok(())
    }

    /// Apply a rotation gate built from the angle
    pub fn apply_rotation(
        &mut self,
        state: &mut StateVector,
        registry: &QubitRegistry,
        handle: QubitHandle,
        gate: RotationGate,
        theta: f64,
    ) -> Result<()> {
        let qubit = registry.index_of(handle)?;
        let (name, matrix) = match gate {
            RotationGate::Rx => ("RX", matrices::rotation_x(theta)),
            RotationGate::Ry => ("RY", matrices::rotation_y(theta)),
            RotationGate::Rz => ("RZ", matrices::rotation_z(theta)),
            RotationGate::Phase => ("PHASE", matrices::phase(theta)),
        };
        state.apply_single_qubit_gate(qubit, &matrix)?;
        self.record(name);
        Ok(())
    }

    /// Apply a caller-supplied 2×2 unitary
    ///
    /// In debug mode the matrix is checked for unitarity first; a failure
    /// logs a warning and the gate is applied anyway.
    pub fn apply_matrix(
        &mut self,
        state: &mut StateVector,
        registry: &QubitRegistry,
        handle: QubitHandle,
        matrix: &Matrix2,
    ) -> Result<()> {
        let qubit = registry.index_of(handle)?;
        if self.debug {
            if let Err(err) = validation::is_unitary_2x2(matrix, state.precision()) {
                warn!(%err, "applying a matrix that failed the unitarity check");
            }
        }
        state.apply_single_qubit_gate(qubit, matrix)?;
        self.record("U");
        Ok(())
    }

    /// Apply a fixed two-qubit gate and record the entanglement
    pub fn apply_two(
        &mut self,
        state: &mut StateVector,
        registry: &mut QubitRegistry,
        gate: TwoQubitGate,
        a: QubitHandle,
        b: QubitHandle,
    ) -> Result<()> {
        let qa = registry.index_of(a)?;
        let qb = registry.index_of(b)?;
        registry.record_entanglement(a, b)?;

        let name = match gate {
            TwoQubitGate::Cnot => {
                state.apply_cnot(qa, qb)?;
                "CNOT"
            }
            TwoQubitGate::Cz => {
                state.apply_cz(qa, qb)?;
                "CZ"
            }
            TwoQubitGate::Swap => {
                state.apply_swap(qa, qb)?;
                "SWAP"
            }
            TwoQubitGate::ISwap => {
                // No permutation structure to exploit; generic 4×4 kernel
                state.apply_two_qubit_gate(qa, qb, &matrices::ISWAP)?;
                "ISWAP"
            }
        };
        self.record(name);
        Ok(())
    }

    /// Apply a fixed three-qubit gate and record the entanglement
    pub fn apply_three(
        &mut self,
        state: &mut StateVector,
        registry: &mut QubitRegistry,
        gate: ThreeQubitGate,
        a: QubitHandle,
        b: QubitHandle,
        c: QubitHandle,
    ) -> Result<()> {
        let qa = registry.index_of(a)?;
        let qb = registry.index_of(b)?;
        let qc = registry.index_of(c)?;
        registry.record_entanglement(a, b)?;
        registry.record_entanglement(b, c)?;

        let name = match gate {
            ThreeQubitGate::Toffoli => {
                state.apply_toffoli(qa, qb, qc)?;
                "TOFFOLI"
            }
            ThreeQubitGate::Fredkin => {
                state.apply_fredkin(qa, qb, qc)?;
                "FREDKIN"
            }
        };
        self.record(name);
        Ok(())
    }

    /// Apply a controlled arbitrary 2×2 through the specialized kernel
    pub fn apply_controlled(
        &mut self,
        state: &mut StateVector,
        registry: &mut QubitRegistry,
        control: QubitHandle,
        target: QubitHandle,
        u: &Matrix2,
    ) -> Result<()> {
        let qc = registry.index_of(control)?;
        let qt = registry.index_of(target)?;
        if self.debug {
            if let Err(err) = validation::is_unitary_2x2(u, state.precision()) {
                warn!(%err, "applying a controlled matrix that failed the unitarity check");
            }
        }
        registry.record_entanglement(control, target)?;
        state.apply_controlled_u(qc, qt, u)?;
        self.record("CU");
        Ok(())
    }
}
