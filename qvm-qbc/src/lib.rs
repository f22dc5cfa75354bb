//! Quantum bytecode (QBC) codec
//!
//! QBC is the compact binary program format the virtual machine executes: a
//! 20-byte header, a packed instruction stream, and an opaque metadata blob.
//! This crate owns the wire format only; execution lives in the `qvm` crate.
//!
//! # Example
//!
//! ```
//! use qvm_qbc::{Instruction, Program, SingleGate};
//!
//! let program = Program::new(
//!     1,
//!     vec![
//!         Instruction::Alloc { slot: 0 },
//!         Instruction::Single { gate: SingleGate::H, slot: 0 },
//!         Instruction::Measure { slot: 0, dst: 0 },
//!         Instruction::End,
//!     ],
//!     Vec::new(),
//! );
//!
//! let bytes = program.encode();
//! assert_eq!(Program::decode(&bytes).unwrap(), program);
//! ```

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

pub use error::{CodecError, Result};
pub use instruction::{
    BinaryOp, Instruction, RotationGate, SingleGate, ThreeQubitGate, TwoQubitGate,
};
pub use opcode::Opcode;
pub use program::{Program, HEADER_LEN, MAGIC, VERSION};
