//! Canonical gate matrices and rotation constructors
//!
//! Fixed gates are compile-time constants; parameterized gates are built on
//! the fly from trig of θ/2 (θ for PHASE). Two-qubit matrices are indexed by
//! (control, target) with control as the high bit, i.e. basis order
//! |00⟩, |01⟩, |10⟩, |11⟩.

use num_complex::Complex64;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);
const NEG_I: Complex64 = Complex64::new(0.0, -1.0);
const NEG_ONE: Complex64 = Complex64::new(-1.0, 0.0);

const INV_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// A 2×2 single-qubit unitary
pub type Matrix2 = [[Complex64; 2]; 2];
/// A 4×4 two-qubit unitary
pub type Matrix4 = [[Complex64; 4]; 4];
/// An 8×8 three-qubit unitary
pub type Matrix8 = [[Complex64; 8]; 8];

// Single-qubit gates (2×2)

/// Identity gate
/// I = [[1, 0],
///      [0, 1]]
pub const IDENTITY: Matrix2 = [[ONE, ZERO], [ZERO, ONE]];

/// Pauli-X gate (NOT)
/// X = [[0, 1],
///      [1, 0]]
pub const PAULI_X: Matrix2 = [[ZERO, ONE], [ONE, ZERO]];

/// Pauli-Y gate
/// Y = [[0, -i],
///      [i,  0]]
pub const PAULI_Y: Matrix2 = [[ZERO, NEG_I], [I, ZERO]];

/// Pauli-Z gate
/// Z = [[1,  0],
///      [0, -1]]
pub const PAULI_Z: Matrix2 = [[ONE, ZERO], [ZERO, NEG_ONE]];

/// Hadamard gate
/// H = 1/√2 * [[1,  1],
///             [1, -1]]
pub const HADAMARD: Matrix2 = [
    [
        Complex64::new(INV_SQRT2, 0.0),
        Complex64::new(INV_SQRT2, 0.0),
    ],
    [
        Complex64::new(INV_SQRT2, 0.0),
        Complex64::new(-INV_SQRT2, 0.0),
    ],
];

/// S gate (phase gate, √Z)
/// S = [[1, 0],
///      [0, i]]
pub const S_GATE: Matrix2 = [[ONE, ZERO], [ZERO, I]];

/// S† gate (adjoint of S)
pub const S_DAGGER: Matrix2 = [[ONE, ZERO], [ZERO, NEG_I]];

/// T gate (π/8 gate, √S)
/// T = [[1, 0],
///      [0, e^(iπ/4)]]
pub const T_GATE: Matrix2 = [
    [ONE, ZERO],
    [ZERO, Complex64::new(INV_SQRT2, INV_SQRT2)],
];

/// T† gate (adjoint of T)
pub const T_DAGGER: Matrix2 = [
    [ONE, ZERO],
    [ZERO, Complex64::new(INV_SQRT2, -INV_SQRT2)],
];

// Two-qubit gates (4×4)

/// CNOT gate (controlled-NOT)
/// CNOT = [[1, 0, 0, 0],
///         [0, 1, 0, 0],
///         [0, 0, 0, 1],
///         [0, 0, 1, 0]]
pub const CNOT: Matrix4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ONE],
    [ZERO, ZERO, ONE, ZERO],
];

/// CZ gate (controlled-Z)
/// CZ = diag(1, 1, 1, -1)
pub const CZ: Matrix4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ONE, ZERO],
    [ZERO, ZERO, ZERO, NEG_ONE],
];

/// SWAP gate
/// SWAP = [[1, 0, 0, 0],
///         [0, 0, 1, 0],
///         [0, 1, 0, 0],
///         [0, 0, 0, 1]]
pub const SWAP: Matrix4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ONE, ZERO],
    [ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ONE],
];

/// iSWAP gate
/// iSWAP = [[1, 0, 0, 0],
///          [0, 0, i, 0],
///          [0, i, 0, 0],
///          [0, 0, 0, 1]]
pub const ISWAP: Matrix4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ZERO, I, ZERO],
    [ZERO, I, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ONE],
];

// Three-qubit gates (8×8)
//
// The executor applies these through specialized bit-pattern kernels; the
// full matrices exist for cross-checking and for the generic dispatch path.

/// Toffoli gate (CCNOT): flips the target when both controls are 1
pub const TOFFOLI: Matrix8 = [
    [ONE, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ONE, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ONE, ZERO, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ONE],
    [ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ONE, ZERO],
];

/// Fredkin gate (CSWAP): swaps the two targets when the control is 1
pub const FREDKIN: Matrix8 = [
    [ONE, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ONE, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ONE, ZERO, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ONE, ZERO],
    [ZERO, ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ONE],
];

// Parameterized gate constructors

/// Rotation about the X axis
/// RX(θ) = [[cos(θ/2),    -i·sin(θ/2)],
///          [-i·sin(θ/2),  cos(θ/2)]]
#[inline]
pub fn rotation_x(theta: f64) -> Matrix2 {
    let half = theta / 2.0;
    let (sin, cos) = half.sin_cos();
    [
        [Complex64::new(cos, 0.0), Complex64::new(0.0, -sin)],
        [Complex64::new(0.0, -sin), Complex64::new(cos, 0.0)],
    ]
}

/// Rotation about the Y axis
/// RY(θ) = [[cos(θ/2), -sin(θ/2)],
///          [sin(θ/2),  cos(θ/2)]]
#[inline]
pub fn rotation_y(theta: f64) -> Matrix2 {
    let half = theta / 2.0;
    let (sin, cos) = half.sin_cos();
    [
        [Complex64::new(cos, 0.0), Complex64::new(-sin, 0.0)],
        [Complex64::new(sin, 0.0), Complex64::new(cos, 0.0)],
    ]
}

/// Rotation about the Z axis
/// RZ(θ) = [[e^(-iθ/2), 0        ],
///          [0,          e^(iθ/2)]]
#[inline]
pub fn rotation_z(theta: f64) -> Matrix2 {
    let half = theta / 2.0;
    let (sin, cos) = half.sin_cos();
    [
        [Complex64::new(cos, -sin), ZERO],
        [ZERO, Complex64::new(cos, sin)],
    ]
}

/// Phase gate
/// P(φ) = [[1, 0     ],
///         [0, e^(iφ)]]
#[inline]
pub fn phase(phi: f64) -> Matrix2 {
    let (sin, cos) = phi.sin_cos();
    [[ONE, ZERO], [ZERO, Complex64::new(cos, sin)]]
}

/// Lift an arbitrary 2×2 unitary to its controlled 4×4 form
///
/// The result is diag(I₂, U) in the (control, target) basis: U acts on the
/// target only when the control bit is 1.
#[inline]
pub fn controlled(u: &Matrix2) -> Matrix4 {
    [
        [ONE, ZERO, ZERO, ZERO],
        [ZERO, ONE, ZERO, ZERO],
        [ZERO, ZERO, u[0][0], u[0][1]],
        [ZERO, ZERO, u[1][0], u[1][1]],
    ]
}
