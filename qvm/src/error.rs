//! Error types for the virtual machine

use crate::qubit::QubitHandle;
use qvm_qbc::CodecError;
use qvm_state::StateError;
use thiserror::Error;

/// Errors surfaced by the VM facade, registry, engines and interpreter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VmError {
    /// State-vector failure (capacity, allocation, bad index)
    #[error(transparent)]
    State(#[from] StateError),

    /// Malformed bytecode image
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Allocating one more handle would exceed the live-qubit limit
    #[error("Qubit allocation would exceed the limit of {limit} live qubits")]
    CapacityExceeded { limit: usize },

    /// A handle that is not (or no longer) registered
    #[error("Unknown qubit handle {0}")]
    UnknownHandle(QubitHandle),

    /// Bytecode referenced a slot with no bound qubit
    #[error("Bytecode slot {slot} is not bound to a qubit")]
    UnboundSlot { slot: u8 },

    /// Classical read from an address that was never stored
    #[error("Classical address {addr} was never written")]
    UnsetAddress { addr: u8 },

    /// Classical DIV with a zero divisor
    #[error("Classical division by zero")]
    DivisionByZero,

    /// Jump target outside the instruction stream
    #[error("Jump target {target} outside instruction stream of {len} bytes")]
    JumpOutOfBounds { target: u32, len: usize },

    /// The caller-supplied instruction cap fired
    #[error("Instruction limit of {limit} reached")]
    InstructionLimit { limit: u64 },

    /// The caller-supplied wall-clock cap fired
    #[error("Execution timed out after {ms} ms")]
    Timeout { ms: u64 },

    /// Handle has no stored measurement outcome
    #[error("Qubit {0} has no recorded measurement outcome")]
    MissingOutcome(QubitHandle),

    /// Catch-all for argument validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for VM operations
pub type Result<T> = std::result::Result<T, VmError>;
