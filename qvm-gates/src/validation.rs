//! Unitarity checks for caller-supplied matrices
//!
//! Matrix shape is enforced by the type system; unitarity is only verified
//! when the VM runs in debug mode. A failed check is reported to the caller,
//! who logs a warning and applies the matrix anyway.

use crate::error::{GateError, Result};
use crate::matrices::{Matrix2, Matrix4};
use num_complex::Complex64;

/// Default tolerance for unitarity checks
pub const DEFAULT_UNITARITY_TOLERANCE: f64 = 1e-10;

/// Check whether a 2×2 matrix is unitary: U·U† = I within `tolerance`
///
/// # Errors
/// Returns [`GateError::NotUnitary`] carrying the largest deviation found.
pub fn is_unitary_2x2(m: &Matrix2, tolerance: f64) -> Result<()> {
    let mut deviation: f64 = 0.0;
    for i in 0..2 {
        for j in 0..2 {
            let mut sum = Complex64::new(0.0, 0.0);
            for k in 0..2 {
                sum += m[i][k] * m[j][k].conj();
            }
            let expected = if i == j { 1.0 } else { 0.0 };
            deviation = deviation.max((sum.re - expected).abs()).max(sum.im.abs());
        }
    }
    if deviation > tolerance {
        return Err(GateError::NotUnitary {
            deviation,
            tolerance,
        });
    }
    Ok(())
}

/// Check whether a 4×4 matrix is unitary: U·U† = I within `tolerance`
///
/// # Errors
/// Returns [`GateError::NotUnitary`] carrying the largest deviation found.
pub fn is_unitary_4x4(m: &Matrix4, tolerance: f64) -> Result<()> {
    let mut deviation: f64 = 0.0;
    for i in 0..4 {
        for j in 0..4 {
            let mut sum = Complex64::new(0.0, 0.0);
            for k in 0..4 {
                sum += m[i][k] * m[j][k].conj();
            }
            let expected = if i == j { 1.0 } else { 0.0 };
            deviation = deviation.max((sum.re - expected).abs()).max(sum.im.abs());
        }
    }
    if deviation > tolerance {
        return Err(GateError::NotUnitary {
            deviation,
            tolerance,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrices;

    #[test]
    fn test_standard_gates_are_unitary() {
        for m in [
            &matrices::IDENTITY,
            &matrices::PAULI_X,
            &matrices::PAULI_Y,
            &matrices::PAULI_Z,
            &matrices::HADAMARD,
            &matrices::S_GATE,
            &matrices::S_DAGGER,
            &matrices::T_GATE,
            &matrices::T_DAGGER,
        ] {
            is_unitary_2x2(m, DEFAULT_UNITARITY_TOLERANCE).unwrap();
        }
    }

    #[test]
    fn test_rotations_are_unitary() {
        for theta in [-2.5, -0.1, 0.0, 0.3, 1.0, 3.14] {
            is_unitary_2x2(&matrices::rotation_x(theta), 1e-10).unwrap();
            is_unitary_2x2(&matrices::rotation_y(theta), 1e-10).unwrap();
            is_unitary_2x2(&matrices::rotation_z(theta), 1e-10).unwrap();
            is_unitary_2x2(&matrices::phase(theta), 1e-10).unwrap();
        }
    }

    #[test]
    fn test_two_qubit_gates_are_unitary() {
        for m in [
            &matrices::CNOT,
            &matrices::CZ,
            &matrices::SWAP,
            &matrices::ISWAP,
        ] {
            is_unitary_4x4(m, DEFAULT_UNITARITY_TOLERANCE).unwrap();
        }
    }

    #[test]
    fn test_non_unitary_rejected() {
        let mut m = matrices::HADAMARD;
        m[0][0] = num_complex::Complex64::new(2.0, 0.0);
        let err = is_unitary_2x2(&m, 1e-10).unwrap_err();
        assert!(matches!(err, GateError::NotUnitary { .. }));
    }
}
