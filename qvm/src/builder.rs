//! Circuit builder
//!
//! A convenience layer over the bytecode format: gate calls append
//! instructions, `compile` emits a QBC program, and `run_on` executes it
//! against a VM. The builder is opaque to the core; everything it does goes
//! through the same instructions a hand-written image would use.

use crate::error::{Result, VmError};
use crate::interpreter::{ExecOptions, ExecOutcome};
use crate::vm::Vm;
use num_complex::Complex64;
use qvm_qbc::{
    Instruction, Program, RotationGate, SingleGate, ThreeQubitGate, TwoQubitGate,
};
use smallvec::SmallVec;

/// Records a gate sequence and compiles it to QBC
///
/// # Example
///
/// ```
/// use qvm::{CircuitBuilder, ExecOptions, Vm, VmConfig};
///
/// let mut circuit = CircuitBuilder::new();
/// let q0 = circuit.allocate().unwrap();
/// let q1 = circuit.allocate().unwrap();
/// circuit.h(q0).cnot(q0, q1).measure(q0, 0).measure(q1, 1);
///
/// let mut vm = Vm::new(VmConfig::default().with_seed(9));
/// let outcome = circuit.run_on(&mut vm, &ExecOptions::default()).unwrap();
/// assert!(outcome.success);
/// // Bell pair: the two outcomes agree
/// assert_eq!(outcome.measurements[&q0], outcome.measurements[&q1]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CircuitBuilder {
    instructions: Vec<Instruction>,
    next_slot: u16,
    metadata: Vec<u8>,
}

impl CircuitBuilder {
    /// Create an empty circuit
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an opaque metadata blob (JSON by convention)
    pub fn with_metadata(mut self, metadata: impl Into<Vec<u8>>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Allocate a qubit slot
    ///
    /// # Errors
    /// The bytecode addresses at most 256 slots.
    pub fn allocate(&mut self) -> Result<u8> {
        if self.next_slot > u8::MAX as u16 {
            return Err(VmError::InvalidArgument(
                "bytecode addresses at most 256 qubit slots".to_string(),
            ));
        }
        let slot = self.next_slot as u8;
        self.next_slot += 1;
        self.instructions.push(Instruction::Alloc { slot });
        Ok(slot)
    }

    /// Allocate `count` qubit slots; `count` must be positive
    pub fn allocate_many(&mut self, count: usize) -> Result<SmallVec<[u8; 4]>> {
        if count == 0 {
            return Err(VmError::InvalidArgument(
                "cannot allocate zero qubits".to_string(),
            ));
        }
        (0..count).map(|_| self.allocate()).collect()
    }

    /// Release a qubit slot
    pub fn deallocate(&mut self, slot: u8) -> &mut Self {
        self.instructions.push(Instruction::Dealloc { slot });
        self
    }

    fn single(&mut self, gate: SingleGate, slot: u8) -> &mut Self {
        self.instructions.push(Instruction::Single { gate, slot });
        self
    }

    /// Pauli-X
    pub fn x(&mut self, slot: u8) -> &mut Self {
        self.single(SingleGate::X, slot)
    }

    /// Pauli-Y
    pub fn y(&mut self, slot: u8) -> &mut Self {
        self.single(SingleGate::Y, slot)
    }

    /// Pauli-Z
    pub fn z(&mut self, slot: u8) -> &mut Self {
        self.single(SingleGate::Z, slot)
    }

    /// Hadamard
    pub fn h(&mut self, slot: u8) -> &mut Self {
        self.single(SingleGate::H, slot)
    }

    /// Phase gate S
    pub fn s(&mut self, slot: u8) -> &mut Self {
        self.single(SingleGate::S, slot)
    }

    /// π/8 gate T
    pub fn t(&mut self, slot: u8) -> &mut Self {
        self.single(SingleGate::T, slot)
    }

    fn rotation(&mut self, gate: RotationGate, slot: u8, angle: f64) -> &mut Self {
        self.instructions.push(Instruction::Rotation {
            gate,
            slot,
            angle: angle as f32,
        });
        self
    }

    /// Rotation about X
    pub fn rx(&mut self, slot: u8, theta: f64) -> &mut Self {
        self.rotation(RotationGate::Rx, slot, theta)
    }

    /// Rotation about Y
    pub fn ry(&mut self, slot: u8, theta: f64) -> &mut Self {
        self.rotation(RotationGate::Ry, slot, theta)
    }

    /// Rotation about Z
    pub fn rz(&mut self, slot: u8, theta: f64) -> &mut Self {
        self.rotation(RotationGate::Rz, slot, theta)
    }

    /// Phase rotation
    pub fn phase(&mut self, slot: u8, phi: f64) -> &mut Self {
        self.rotation(RotationGate::Phase, slot, phi)
    }

    fn two(&mut self, gate: TwoQubitGate, a: u8, b: u8) -> &mut Self {
        self.instructions.push(Instruction::Two { gate, a, b });
        self
    }

    /// Controlled-NOT
    pub fn cnot(&mut self, control: u8, target: u8) -> &mut Self {
        self.two(TwoQubitGate::Cnot, control, target)
    }

    /// Controlled-Z
    pub fn cz(&mut self, a: u8, b: u8) -> &mut Self {
        self.two(TwoQubitGate::Cz, a, b)
    }

    /// SWAP
    pub fn swap(&mut self, a: u8, b: u8) -> &mut Self {
        self.two(TwoQubitGate::Swap, a, b)
    }

    /// iSWAP
    pub fn iswap(&mut self, a: u8, b: u8) -> &mut Self {
        self.two(TwoQubitGate::ISwap, a, b)
    }

    /// Toffoli (CCNOT)
    pub fn toffoli(&mut self, c1: u8, c2: u8, target: u8) -> &mut Self {
        self.instructions.push(Instruction::Three {
            gate: ThreeQubitGate::Toffoli,
            a: c1,
            b: c2,
            c: target,
        });
        self
    }

    /// Fredkin (CSWAP)
    pub fn fredkin(&mut self, control: u8, a: u8, b: u8) -> &mut Self {
        self.instructions.push(Instruction::Three {
            gate: ThreeQubitGate::Fredkin,
            a: control,
            b: a,
            c: b,
        });
        self
    }

    /// Measure a slot into a classical address
    pub fn measure(&mut self, slot: u8, dst: u8) -> &mut Self {
        self.instructions.push(Instruction::Measure { slot, dst });
        self
    }

    /// Measure every live qubit
    pub fn measure_all(&mut self) -> &mut Self {
        self.instructions.push(Instruction::MeasureAll);
        self
    }

    /// Prepare α|0⟩ + β|1⟩ on a freshly allocated slot, β real
    ///
    /// The pair is normalized first, then realized as a single RY whose
    /// angle comes from atan2(β, α), so negative components work too.
    pub fn prepare_state(&mut self, slot: u8, alpha: f64, beta: f64) -> Result<&mut Self> {
        if alpha == 0.0 && beta == 0.0 {
            return Err(VmError::InvalidArgument(
                "state amplitudes cannot both be zero".to_string(),
            ));
        }
        let theta = 2.0 * beta.atan2(alpha);
        Ok(self.ry(slot, theta))
    }

    /// Prepare α|0⟩ + β|1⟩ with a complex β
    ///
    /// Extension of [`prepare_state`](Self::prepare_state): the magnitude
    /// goes through RY and the phase of β through a PHASE gate.
    pub fn prepare_state_complex(
        &mut self,
        slot: u8,
        alpha: f64,
        beta: Complex64,
    ) -> Result<&mut Self> {
        if alpha == 0.0 && beta.norm_sqr() == 0.0 {
            return Err(VmError::InvalidArgument(
                "state amplitudes cannot both be zero".to_string(),
            ));
        }
        let theta = 2.0 * beta.norm().atan2(alpha);
        let phi = beta.im.atan2(beta.re);
        self.ry(slot, theta);
        if phi != 0.0 {
            self.phase(slot, phi);
        }
        Ok(self)
    }

    /// Number of recorded instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether no instructions have been recorded
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Compile to a QBC program, appending END if missing
    pub fn compile(&self) -> Program {
        let mut instructions = self.instructions.clone();
        if instructions.last() != Some(&Instruction::End) {
            instructions.push(Instruction::End);
        }
        Program::new(self.next_slot, instructions, self.metadata.clone())
    }

    /// Compile and execute on a VM
    pub fn run_on(&self, vm: &mut Vm, options: &ExecOptions) -> Result<ExecOutcome> {
        let program = self.compile();
        Ok(vm.run_program(&program, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VmConfig;
    use approx::assert_relative_eq;

    #[test]
    fn test_compile_appends_end() {
        let mut circuit = CircuitBuilder::new();
        let q = circuit.allocate().unwrap();
        circuit.h(q);
        let program = circuit.compile();
        assert_eq!(program.instructions.last(), Some(&Instruction::End));
        assert_eq!(program.qubit_count, 1);
    }

    #[test]
    fn test_slots_are_sequential() {
        let mut circuit = CircuitBuilder::new();
        assert_eq!(circuit.allocate().unwrap(), 0);
        assert_eq!(circuit.allocate().unwrap(), 1);
        let more = circuit.allocate_many(2).unwrap();
        assert_eq!(more.as_slice(), &[2, 3]);
    }

    #[test]
    fn test_bell_pair_through_bytecode() {
        let mut circuit = CircuitBuilder::new();
        let q0 = circuit.allocate().unwrap();
        let q1 = circuit.allocate().unwrap();
        circuit.h(q0).cnot(q0, q1);

        let mut vm = Vm::new(VmConfig::default().with_seed(13));
        let outcome = circuit.run_on(&mut vm, &ExecOptions::default()).unwrap();
        assert!(outcome.success, "{:?}", outcome.error);

        let amps = vm.state_vector();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert_relative_eq!(amps[0].re, h, epsilon = 1e-6);
        assert_relative_eq!(amps[3].re, h, epsilon = 1e-6);
    }

    #[test]
    fn test_prepare_state_amplitudes() {
        let mut circuit = CircuitBuilder::new();
        let q = circuit.allocate().unwrap();
        circuit.prepare_state(q, 0.6, 0.8).unwrap();

        let mut vm = Vm::new(VmConfig::default().with_seed(1));
        circuit.run_on(&mut vm, &ExecOptions::default()).unwrap();

        let amps = vm.state_vector();
        // f32 angle on the wire costs some precision
        assert_relative_eq!(amps[0].re, 0.6, epsilon = 1e-6);
        assert_relative_eq!(amps[1].re, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_prepare_state_complex_phase() {
        let mut circuit = CircuitBuilder::new();
        let q = circuit.allocate().unwrap();
        circuit
            .prepare_state_complex(q, 0.6, Complex64::new(0.0, 0.8))
            .unwrap();

        let mut vm = Vm::new(VmConfig::default().with_seed(1));
        circuit.run_on(&mut vm, &ExecOptions::default()).unwrap();

        let amps = vm.state_vector();
        assert_relative_eq!(amps[0].re, 0.6, epsilon = 1e-6);
        assert_relative_eq!(amps[1].im, 0.8, epsilon = 1e-6);
        assert_relative_eq!(amps[1].re, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_prepare_state_rejects_null() {
        let mut circuit = CircuitBuilder::new();
        let q = circuit.allocate().unwrap();
        assert!(circuit.prepare_state(q, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_metadata_round_trip() {
        let mut circuit = CircuitBuilder::new().with_metadata(br#"{"shots":100}"#.to_vec());
        let q = circuit.allocate().unwrap();
        circuit.h(q);
        let program = circuit.compile();
        let decoded = Program::decode(&program.encode()).unwrap();
        assert_eq!(decoded.metadata, br#"{"shots":100}"#);
    }
}
