//! In-place gate-application kernels
//!
//! Every kernel is a single read-then-write pass over the amplitude slice.
//! The generic 2×2 and 4×4 paths have rayon-parallel variants used above a
//! caller-supplied threshold; the specialized controlled paths are swap- or
//! phase-only and stay sequential because they are memory-bound.
//!
//! Basis convention: qubit k is bit k of the basis index (qubit 0 is the
//! least-significant bit).

pub mod controlled;
pub mod single_qubit;
pub mod two_qubit;

pub use controlled::{
    apply_cnot, apply_controlled_u, apply_cz, apply_fredkin, apply_swap, apply_toffoli,
};
pub use single_qubit::apply_single_qubit_gate;
pub use two_qubit::apply_two_qubit_gate;
