//! Quantum virtual machine
//!
//! A software simulator that executes quantum circuits against a dense
//! complex amplitude vector, interleaved with probabilistic measurement and
//! a small classical ALU. Programs arrive either through the [`Vm`] facade
//! directly, through the [`CircuitBuilder`], or as compact binary QBC images
//! executed by the [`Interpreter`].
//!
//! # Example
//!
//! ```
//! use qvm::{ExecOptions, Vm, VmConfig};
//!
//! let mut vm = Vm::new(VmConfig::default().with_seed(42));
//!
//! let mut circuit = vm.circuit();
//! let q0 = circuit.allocate().unwrap();
//! let q1 = circuit.allocate().unwrap();
//! circuit.h(q0).cnot(q0, q1).measure(q0, 0).measure(q1, 1);
//!
//! let outcome = circuit.run_on(&mut vm, &ExecOptions::default()).unwrap();
//! assert!(outcome.success);
//! assert_eq!(outcome.measurements[&q0], outcome.measurements[&q1]);
//! ```

pub mod alu;
pub mod builder;
pub mod config;
pub mod error;
pub mod executor;
pub mod interpreter;
pub mod measurement;
pub mod qubit;
pub mod registry;
pub mod vm;

pub use builder::CircuitBuilder;
pub use config::VmConfig;
pub use error::{Result, VmError};
pub use executor::GateExecutor;
pub use interpreter::{
    ExecMetrics, ExecOptions, ExecOutcome, HaltReason, Interpreter,
};
pub use measurement::{MeasurementEngine, MeasurementMetrics, MeasurementRecord};
pub use qubit::QubitHandle;
pub use registry::QubitRegistry;
pub use vm::Vm;

// Re-export the sibling crates so downstream users need only one dependency.
pub use qvm_gates as gates;
pub use qvm_qbc as qbc;
pub use qvm_state as state;
