//! Dense quantum state backend for the QVM
//!
//! This crate holds the exponential-size heart of the virtual machine: a
//! growable dense amplitude vector, in-place gate-application kernels with
//! optional rayon parallelism, collapsing measurement, and a small cache of
//! recently requested basis-state probabilities.
//!
//! # Example
//!
//! ```
//! use qvm_state::StateVector;
//! use qvm_gates::matrices;
//!
//! let mut state = StateVector::new(8);
//! state.allocate().unwrap();
//! state.allocate().unwrap();
//! state.apply_single_qubit_gate(0, &matrices::HADAMARD).unwrap();
//! state.apply_cnot(0, 1).unwrap();
//!
//! // Bell pair: only |00⟩ and |11⟩ carry probability
//! assert!((state.probability(0).unwrap() - 0.5).abs() < 1e-10);
//! assert!((state.probability(3).unwrap() - 0.5).abs() < 1e-10);
//! ```

pub mod backend;
pub mod error;
pub mod kernels;
pub mod prob_cache;
pub mod state_vector;

pub use backend::StateBackend;
pub use error::{Result, StateError};
pub use prob_cache::ProbabilityCache;
pub use state_vector::{
    StateVector, DEFAULT_MAX_QUBITS, DEFAULT_PARALLEL_THRESHOLD, DEFAULT_PRECISION,
};
