//! Error types for state-vector operations

use thiserror::Error;

/// Errors that can occur during state-vector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Allocating one more qubit would exceed the configured limit
    #[error("Qubit allocation would exceed the limit of {limit} qubits")]
    CapacityExceeded { limit: usize },

    /// Invalid qubit bit position
    #[error("Invalid qubit index {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// The same bit position was passed for two distinct gate operands
    #[error("Gate operands must be distinct, got qubit {index} twice")]
    IdenticalQubits { index: usize },

    /// Basis-state index outside [0, 2^n)
    #[error("Basis state {index} out of range for dimension {dimension}")]
    InvalidBasisState { index: usize, dimension: usize },

    /// Replacement amplitude vector has the wrong length
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Memory reservation for the doubled vector failed
    #[error("Failed to reserve {bytes} bytes for state amplitudes")]
    AllocationError { bytes: usize },
}

/// Result type for state-vector operations
pub type Result<T> = std::result::Result<T, StateError>;
