//! Error types for gate construction and amplitude arithmetic

use thiserror::Error;

/// Errors that can occur while constructing or validating gates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    /// Division by a zero-magnitude complex value
    #[error("Division by a complex value with zero squared magnitude")]
    DivisionByZero,

    /// Matrix is not unitary within the given tolerance
    #[error("Matrix is not unitary: max deviation {deviation} exceeds tolerance {tolerance}")]
    NotUnitary { deviation: f64, tolerance: f64 },
}

/// Result type for gate operations
pub type Result<T> = std::result::Result<T, GateError>;
