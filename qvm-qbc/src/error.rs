//! Error types for QBC encoding and decoding

use thiserror::Error;

/// Errors produced while reading or writing a QBC image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The image does not start with the "QBC\0" magic
    #[error("Bad magic {found:02x?}, expected [51, 42, 43, 00]")]
    BadMagic { found: [u8; 4] },

    /// The version field is not one this codec understands
    #[error("Unsupported QBC version {version}")]
    UnsupportedVersion { version: u16 },

    /// An opcode byte outside the instruction table
    #[error("Unknown opcode 0x{opcode:02x} at offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },

    /// The buffer ends inside an operand
    #[error("Truncated instruction at offset {offset}: {needed} more bytes required")]
    Truncated { offset: usize, needed: usize },

    /// A declared header length disagrees with the actual bytes
    #[error("{field} mismatch: header declares {declared}, found {actual}")]
    LengthMismatch {
        field: &'static str,
        declared: usize,
        actual: usize,
    },
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
