//! QBC interpreter
//!
//! A fetch-decode-execute loop over the packed instruction stream. The
//! program counter is a byte offset, jumps are absolute offsets into the
//! stream, and every delegate error is captured into the result record
//! rather than propagated.

use crate::alu;
use crate::error::{Result, VmError};
use crate::qubit::QubitHandle;
use crate::vm::Vm;
use ahash::AHashMap;
use qvm_qbc::Instruction;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Caller-supplied execution bounds; 0 disables a bound
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOptions {
    /// Maximum number of instructions to execute
    pub max_instructions: u64,
    /// Wall-clock limit in milliseconds
    pub timeout_ms: u64,
}

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ExecMetrics {
    /// Instructions executed
    pub instructions: u64,
    /// Classical memory and ALU instructions
    pub classical_ops: u64,
    /// Allocation, gate and measurement instructions
    pub quantum_ops: u64,
    /// Jump instructions, taken or not
    pub jump_ops: u64,
    /// Wall-clock duration of the run
    pub wall_time_ms: u64,
}

/// Why the run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HaltReason {
    /// The program counter ran past the end of the stream
    EndOfStream,
    /// An explicit END instruction
    End,
    /// The instruction cap fired
    InstructionLimit,
    /// The wall-clock cap fired
    Timeout,
    /// A delegate reported an error
    Error,
}

/// Result record of one interpreter run
#[derive(Debug, Serialize)]
pub struct ExecOutcome {
    /// False when any error or bound stopped the run
    pub success: bool,
    /// Message of the error that stopped the run, if any
    pub error: Option<String>,
    /// Byte offset of the instruction that failed, if any
    pub error_pc: Option<usize>,
    /// Measurement outcomes, keyed by bytecode qubit slot
    pub measurements: AHashMap<u8, u8>,
    /// Snapshot of classical memory after the run
    pub classical_memory: AHashMap<u8, i32>,
    /// Per-run counters
    pub metrics: ExecMetrics,
    /// Why execution stopped
    pub halt: HaltReason,
}

/// Hook invoked around each instruction with its byte offset
pub type InstructionHook = Box<dyn FnMut(usize, &Instruction)>;
/// Hook invoked when an instruction fails
pub type ErrorHook = Box<dyn FnMut(usize, &VmError)>;

enum Step {
    Continue(usize),
    Halt,
}

/// Fetch-decode-execute driver with optional instrumentation hooks
#[derive(Default)]
pub struct Interpreter {
    before: Option<InstructionHook>,
    after: Option<InstructionHook>,
    on_error: Option<ErrorHook>,
}

impl Interpreter {
    /// Create an interpreter with no hooks installed
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a hook that runs before each instruction
    pub fn on_before_instruction(&mut self, hook: InstructionHook) {
        self.before = Some(hook);
    }

    /// Install a hook that runs after each successful instruction
    pub fn on_after_instruction(&mut self, hook: InstructionHook) {
        self.after = Some(hook);
    }

    /// Install a hook that fires when an instruction fails
    pub fn on_error(&mut self, hook: ErrorHook) {
        self.on_error = Some(hook);
    }

    /// Sweep the stream once, collecting every jump-target offset
    ///
    /// Useful for debugging and validation; execution does not depend on it.
    pub fn scan_jump_targets(data: &[u8]) -> Result<Vec<usize>> {
        let mut targets = Vec::new();
        let mut offset = 0;
        while offset < data.len() {
            let (instr, next) = Instruction::decode_at(data, offset)?;
            match instr {
                Instruction::Jump { target } | Instruction::CondJump { target, .. } => {
                    targets.push(target as usize);
                }
                _ => {}
            }
            offset = next;
        }
        Ok(targets)
    }

    /// Execute a packed instruction stream against a VM
    ///
    /// Runs until the stream ends, END executes, a bound fires, or a
    /// delegate fails. Errors never propagate out of this method: they are
    /// captured in the returned record and reported to the `on_error` hook.
    pub fn run(&mut self, vm: &mut Vm, data: &[u8], options: &ExecOptions) -> ExecOutcome {
        let start = Instant::now();
        let mut metrics = ExecMetrics::default();
        let mut memory: AHashMap<u8, i32> = AHashMap::new();
        let mut slots: AHashMap<u8, QubitHandle> = AHashMap::new();
        let mut measurements: AHashMap<u8, u8> = AHashMap::new();

        let mut halt = HaltReason::EndOfStream;
        let mut error: Option<String> = None;
        let mut error_pc: Option<usize> = None;
        let mut pc = 0usize;

        if let Ok(targets) = Self::scan_jump_targets(data) {
            if !targets.is_empty() {
                debug!(?targets, "pre-scanned jump targets");
            }
        }

        let mut running = true;
        while running {
            if pc >= data.len() {
                halt = HaltReason::EndOfStream;
                break;
            }
            if options.max_instructions > 0 && metrics.instructions >= options.max_instructions {
                halt = HaltReason::InstructionLimit;
                error = Some(
                    VmError::InstructionLimit {
                        limit: options.max_instructions,
                    }
                    .to_string(),
                );
                break;
            }
            if options.timeout_ms > 0 && start.elapsed().as_millis() as u64 >= options.timeout_ms {
                halt = HaltReason::Timeout;
                error = Some(
                    VmError::Timeout {
                        ms: options.timeout_ms,
                    }
                    .to_string(),
                );
                break;
            }

            let (instr, next_pc) = match Instruction::decode_at(data, pc) {
                Ok(decoded) => decoded,
                Err(err) => {
                    let err = VmError::from(err);
                    if let Some(hook) = self.on_error.as_mut() {
                        hook(pc, &err);
                    }
                    halt = HaltReason::Error;
                    error = Some(err.to_string());
                    error_pc = Some(pc);
                    break;
                }
            };

            if let Some(hook) = self.before.as_mut() {
                hook(pc, &instr);
            }

            let step = Self::execute_instruction(
                vm,
                &instr,
                next_pc,
                data.len(),
                &mut memory,
                &mut slots,
                &mut measurements,
                &mut metrics,
            );
            metrics.instructions += 1;

            match step {
                Ok(Step::Continue(new_pc)) => {
                    if let Some(hook) = self.after.as_mut() {
                        hook(pc, &instr);
                    }
                    pc = new_pc;
                }
                Ok(Step::Halt) => {
                    if let Some(hook) = self.after.as_mut() {
                        hook(pc, &instr);
                    }
                    halt = HaltReason::End;
                    running = false;
                }
                Err(err) => {
                    if let Some(hook) = self.on_error.as_mut() {
                        hook(pc, &err);
                    }
                    halt = HaltReason::Error;
                    error = Some(err.to_string());
                    error_pc = Some(pc);
                    running = false;
                }
            }
        }

        metrics.wall_time_ms = start.elapsed().as_millis() as u64;

        ExecOutcome {
            success: error.is_none(),
            error,
            error_pc,
            measurements,
            classical_memory: memory,
            metrics,
            halt,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_instruction(
        vm: &mut Vm,
        instr: &Instruction,
        next_pc: usize,
        stream_len: usize,
        memory: &mut AHashMap<u8, i32>,
        slots: &mut AHashMap<u8, QubitHandle>,
        measurements: &mut AHashMap<u8, u8>,
        metrics: &mut ExecMetrics,
    ) -> Result<Step> {
        fn resolve(slots: &AHashMap<u8, QubitHandle>, slot: u8) -> Result<QubitHandle> {
            slots
                .get(&slot)
                .copied()
                .ok_or(VmError::UnboundSlot { slot })
        }

        fn load(memory: &AHashMap<u8, i32>, addr: u8) -> Result<i32> {
            memory
                .get(&addr)
                .copied()
                .ok_or(VmError::UnsetAddress { addr })
        }

        fn check_target(target: u32, stream_len: usize) -> Result<usize> {
            let offset = target as usize;
            if offset >= stream_len {
                return Err(VmError::JumpOutOfBounds {
                    target,
                    len: stream_len,
                });
            }
            Ok(offset)
        }

        match *instr {
            Instruction::Alloc { slot } => {
                metrics.quantum_ops += 1;
                if slots.contains_key(&slot) {
                    return Err(VmError::InvalidArgument(format!(
                        "slot {slot} is already bound to a qubit"
                    )));
                }
                let handle = vm.registry.allocate(&mut vm.state)?;
                slots.insert(slot, handle);
            }
            Instruction::Dealloc { slot } => {
                metrics.quantum_ops += 1;
                let handle = slots.remove(&slot).ok_or(VmError::UnboundSlot { slot })?;
                vm.registry.deallocate(handle);
            }
            Instruction::Single { gate, slot } => {
                metrics.quantum_ops += 1;
                let handle = resolve(slots, slot)?;
                vm.executor
                    .apply_single(&mut vm.state, &vm.registry, handle, gate)?;
            }
            Instruction::Rotation { gate, slot, angle } => {
                metrics.quantum_ops += 1;
                let handle = resolve(slots, slot)?;
                vm.executor
                    .apply_rotation(&mut vm.state, &vm.registry, handle, gate, angle as f64)?;
            }
            Instruction::Two { gate, a, b } => {
                metrics.quantum_ops += 1;
                let ha = resolve(slots, a)?;
                let hb = resolve(slots, b)?;
                vm.executor
                    .apply_two(&mut vm.state, &mut vm.registry, gate, ha, hb)?;
            }
            Instruction::Three { gate, a, b, c } => {
                metrics.quantum_ops += 1;
                let ha = resolve(slots, a)?;
                let hb = resolve(slots, b)?;
                let hc = resolve(slots, c)?;
                vm.executor
                    .apply_three(&mut vm.state, &mut vm.registry, gate, ha, hb, hc)?;
            }
            Instruction::Measure { slot, dst } => {
                metrics.quantum_ops += 1;
                let handle = resolve(slots, slot)?;
                let outcome =
                    vm.measurements
                        .measure(&mut vm.state, &vm.registry, &mut vm.rng, handle, true)?;
                memory.insert(dst, outcome as i32);
                measurements.insert(slot, outcome);
            }
            Instruction::MeasureAll => {
                metrics.quantum_ops += 1;
                vm.measurements
                    .measure_all(&mut vm.state, &vm.registry, &mut vm.rng)?;
                for (&slot, &handle) in slots.iter() {
                    if let Some(outcome) = vm.measurements.outcome_of(handle) {
                        measurements.insert(slot, outcome);
                    }
                }
            }
            Instruction::CondJump { cond, target } => {
                metrics.jump_ops += 1;
                let condition = load(memory, cond)?;
                if condition != 0 {
                    return Ok(Step::Continue(check_target(target, stream_len)?));
                }
            }
            Instruction::Jump { target } => {
                metrics.jump_ops += 1;
                return Ok(Step::Continue(check_target(target, stream_len)?));
            }
            Instruction::Store { addr, value } => {
                metrics.classical_ops += 1;
                memory.insert(addr, value);
            }
            Instruction::Load { src, dst } => {
                metrics.classical_ops += 1;
                let value = load(memory, src)?;
                memory.insert(dst, value);
            }
            Instruction::Binary { op, a, b, dst } => {
                metrics.classical_ops += 1;
                let va = load(memory, a)?;
                let vb = load(memory, b)?;
                memory.insert(dst, alu::eval_binary(op, va, vb)?);
            }
            Instruction::Not { a, dst } => {
                metrics.classical_ops += 1;
                let value = load(memory, a)?;
                memory.insert(dst, alu::eval_not(value));
            }
            Instruction::End => return Ok(Step::Halt),
        }

        Ok(Step::Continue(next_pc))
    }
}
