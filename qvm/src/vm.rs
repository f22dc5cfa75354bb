//! The VM facade
//!
//! One `Vm` value owns every mutable piece of the machine: the dense state
//! vector, the qubit registry, the gate executor, the measurement engine and
//! the measurement RNG. All public entry points run to completion before the
//! next may begin; two VMs are fully independent. There is no process-wide
//! instance: callers pass the `Vm` they own.

use crate::builder::CircuitBuilder;
use crate::config::VmConfig;
use crate::error::{Result, VmError};
use crate::executor::GateExecutor;
use crate::interpreter::{ExecOptions, ExecOutcome, Interpreter};
use crate::measurement::{MeasurementEngine, MeasurementMetrics, MeasurementRecord};
use crate::qubit::QubitHandle;
use crate::registry::QubitRegistry;
use ahash::AHashMap;
use num_complex::Complex64;
use qvm_gates::matrices::Matrix2;
use qvm_qbc::{Program, RotationGate, SingleGate, ThreeQubitGate, TwoQubitGate};
use qvm_state::StateVector;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::warn;

/// A quantum virtual machine instance
///
/// # Example
///
/// ```
/// use qvm::{Vm, VmConfig};
/// use qvm_qbc::TwoQubitGate;
///
/// let mut vm = Vm::new(VmConfig::default().with_seed(1));
/// let q0 = vm.allocate_qubit().unwrap();
/// let q1 = vm.allocate_qubit().unwrap();
/// vm.apply_single(q0, qvm_qbc::SingleGate::H).unwrap();
/// vm.apply_two(TwoQubitGate::Cnot, q0, q1).unwrap();
/// assert!(vm.are_entangled(q0, q1).unwrap());
/// ```
pub struct Vm {
    pub(crate) config: VmConfig,
    pub(crate) state: StateVector,
    pub(crate) registry: QubitRegistry,
    pub(crate) executor: GateExecutor,
    pub(crate) measurements: MeasurementEngine,
    pub(crate) rng: StdRng,
}

fn build_state(config: &VmConfig) -> StateVector {
    StateVector::new(config.max_qubits as usize)
        .with_precision(config.precision)
        .with_parallel_threshold(config.parallel_threshold)
}

fn build_rng(config: &VmConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl Vm {
    /// Create a VM with the given configuration
    ///
    /// # Panics
    /// Panics if the configuration is invalid.
    pub fn new(config: VmConfig) -> Self {
        config.validate().expect("Invalid VM configuration");

        Self {
            state: build_state(&config),
            registry: QubitRegistry::new(config.max_qubits as usize),
            executor: GateExecutor::new(config.debug),
            measurements: MeasurementEngine::new(),
            rng: build_rng(&config),
            config,
        }
    }

    /// Create a VM with the default configuration
    pub fn with_defaults() -> Self {
        Self::new(VmConfig::default())
    }

    /// Create a VM configured from the `QVM_*` environment variables
    pub fn from_env() -> Self {
        Self::new(VmConfig::from_env())
    }

    /// Replace the configuration of an unused VM
    ///
    /// Once any qubit has been allocated or outcome recorded, reconfiguring
    /// is a no-op with a warning; reset the VM first to apply a new
    /// configuration.
    pub fn configure(&mut self, config: VmConfig) {
        if self.state.num_qubits() > 0
            || !self.registry.is_empty()
            || self.measurements.metrics().total > 0
        {
            warn!("ignoring reconfiguration of a VM that is already in use");
            return;
        }
        if let Err(err) = config.validate() {
            warn!(%err, "ignoring invalid reconfiguration");
            return;
        }
        self.state = build_state(&config);
        self.registry = QubitRegistry::new(config.max_qubits as usize);
        self.executor = GateExecutor::new(config.debug);
        self.rng = build_rng(&config);
        self.config = config;
    }

    /// Current configuration
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Allocate one qubit
    pub fn allocate_qubit(&mut self) -> Result<QubitHandle> {
        self.registry.allocate(&mut self.state)
    }

    /// Allocate several qubits; `count` must be positive
    pub fn allocate_qubits(&mut self, count: usize) -> Result<Vec<QubitHandle>> {
        self.registry.allocate_many(&mut self.state, count)
    }

    /// Release a qubit; false when the handle is unknown
    pub fn deallocate_qubit(&mut self, handle: QubitHandle) -> bool {
        self.registry.deallocate(handle)
    }

    /// Number of live qubits
    pub fn qubit_count(&self) -> usize {
        self.registry.len()
    }

    /// Live handles ordered by bit position
    pub fn qubits(&self) -> Vec<QubitHandle> {
        self.registry.handles()
    }

    /// Apply a fixed single-qubit gate
    pub fn apply_single(&mut self, handle: QubitHandle, gate: SingleGate) -> Result<()> {
        self.executor
            .apply_single(&mut self.state, &self.registry, handle, gate)
    }

    /// Apply a rotation gate
    pub fn apply_rotation(
        &mut self,
        handle: QubitHandle,
        gate: RotationGate,
        theta: f64,
    ) -> Result<()> {
        self.executor
            .apply_rotation(&mut self.state, &self.registry, handle, gate, theta)
    }

    /// Apply a caller-supplied 2×2 unitary
    pub fn apply_matrix(&mut self, handle: QubitHandle, matrix: &Matrix2) -> Result<()> {
        self.executor
            .apply_matrix(&mut self.state, &self.registry, handle, matrix)
    }

    /// Apply a fixed two-qubit gate
    pub fn apply_two(
        &mut self,
        gate: TwoQubitGate,
        a: QubitHandle,
        b: QubitHandle,
    ) -> Result<()> {
        self.executor
            .apply_two(&mut self.state, &mut self.registry, gate, a, b)
    }

    /// Apply a fixed three-qubit gate
    pub fn apply_three(
        &mut self,
        gate: ThreeQubitGate,
        a: QubitHandle,
        b: QubitHandle,
        c: QubitHandle,
    ) -> Result<()> {
        self.executor
            .apply_three(&mut self.state, &mut self.registry, gate, a, b, c)
    }

    /// Apply a controlled arbitrary 2×2 unitary
    pub fn apply_controlled(
        &mut self,
        control: QubitHandle,
        target: QubitHandle,
        u: &Matrix2,
    ) -> Result<()> {
        self.executor
            .apply_controlled(&mut self.state, &mut self.registry, control, target, u)
    }

    /// Measure one qubit; collapsing unless `collapsing` is false
    pub fn measure_qubit(&mut self, handle: QubitHandle, collapsing: bool) -> Result<u8> {
        self.measurements.measure(
            &mut self.state,
            &self.registry,
            &mut self.rng,
            handle,
            collapsing,
        )
    }

    /// Measure several qubits in order
    pub fn measure_qubits(
        &mut self,
        handles: &[QubitHandle],
        collapsing: bool,
    ) -> Result<Vec<u8>> {
        self.measurements.measure_many(
            &mut self.state,
            &self.registry,
            &mut self.rng,
            handles,
            collapsing,
        )
    }

    /// Measure every live qubit; bit string is position-ordered, MSB first
    pub fn measure_all(&mut self) -> Result<String> {
        self.measurements
            .measure_all(&mut self.state, &self.registry, &mut self.rng)
    }

    /// Marginal probability that `handle` reads `value`
    pub fn probability(&self, handle: QubitHandle, value: u8) -> Result<f64> {
        self.measurements
            .probability(&self.state, &self.registry, handle, value)
    }

    /// Joint probability of a set of (handle, value) constraints
    pub fn joint_probability(&self, constraints: &[(QubitHandle, u8)]) -> Result<f64> {
        self.measurements
            .joint_probability(&self.state, &self.registry, constraints)
    }

    /// Sample the chosen qubits without mutating the state
    pub fn sample(
        &mut self,
        shots: usize,
        handles: Option<&[QubitHandle]>,
    ) -> Result<AHashMap<String, usize>> {
        self.measurements
            .sample(&self.state, &self.registry, &mut self.rng, shots, handles)
    }

    /// Pack stored outcomes into an integer, LSB-first over `handles`
    pub fn measurements_to_integer(&self, handles: &[QubitHandle]) -> Result<u64> {
        self.measurements.outcomes_as_integer(handles)
    }

    /// Whether two handles share an entanglement class
    pub fn are_entangled(&self, a: QubitHandle, b: QubitHandle) -> Result<bool> {
        self.registry.are_entangled(a, b)
    }

    /// Live handles entangled with `handle`, excluding itself
    pub fn entangled_qubits(&self, handle: QubitHandle) -> Result<Vec<QubitHandle>> {
        self.registry.entangled_with(handle)
    }

    /// Read-only copy of the amplitude vector
    pub fn state_vector(&self) -> Vec<Complex64> {
        self.state.snapshot()
    }

    /// Execute a full QBC image
    ///
    /// The image is validated and decoded first; malformed bytecode is
    /// reported to the caller. Errors inside individual instructions are
    /// captured in the returned record instead.
    pub fn execute(&mut self, image: &[u8], options: &ExecOptions) -> Result<ExecOutcome> {
        let mut interpreter = Interpreter::new();
        self.execute_with(&mut interpreter, image, options)
    }

    /// Execute a full QBC image through a caller-owned interpreter
    ///
    /// Use this to install instrumentation hooks before the run.
    pub fn execute_with(
        &mut self,
        interpreter: &mut Interpreter,
        image: &[u8],
        options: &ExecOptions,
    ) -> Result<ExecOutcome> {
        let program = Program::decode(image).map_err(VmError::from)?;
        Ok(self.run_program_with(interpreter, &program, options))
    }

    /// Execute an already decoded program
    pub fn run_program(&mut self, program: &Program, options: &ExecOptions) -> ExecOutcome {
        let mut interpreter = Interpreter::new();
        self.run_program_with(&mut interpreter, program, options)
    }

    /// Execute an already decoded program through a caller-owned interpreter
    pub fn run_program_with(
        &mut self,
        interpreter: &mut Interpreter,
        program: &Program,
        options: &ExecOptions,
    ) -> ExecOutcome {
        let data = program.instruction_bytes();
        interpreter.run(self, &data, options)
    }

    /// Start a circuit targeting this VM's QBC format
    pub fn circuit(&self) -> CircuitBuilder {
        CircuitBuilder::new()
    }

    /// Executor gate counters
    pub fn gate_statistics(&self) -> &GateExecutor {
        &self.executor
    }

    /// Measurement counters
    pub fn measurement_metrics(&self) -> MeasurementMetrics {
        self.measurements.metrics()
    }

    /// Append-only measurement history
    pub fn measurement_history(&self) -> &[MeasurementRecord] {
        self.measurements.history()
    }

    /// Clear all state, keeping the configuration
    ///
    /// Returns the VM to zero qubits, an empty registry and an empty
    /// measurement log. A configured seed restarts the random stream so a
    /// reset VM replays the same measurement statistics.
    pub fn reset(&mut self) {
        self.state.reset();
        self.registry.reset();
        self.executor.reset();
        self.measurements.reset();
        self.rng = build_rng(&self.config);
    }
}
