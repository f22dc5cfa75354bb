//! Amplitude arithmetic helpers
//!
//! Amplitudes are `num_complex::Complex64` values: 16 bytes each, mutated in
//! place by the gate kernels without allocation. This module adds the few
//! operations the crate does not provide directly: tolerance-based equality
//! and division that fails instead of producing NaNs.

use crate::error::{GateError, Result};
use num_complex::Complex64;

/// Default tolerance for approximate amplitude comparison
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Compare two amplitudes for approximate equality
///
/// Both the real and imaginary components must agree within `tolerance`.
#[inline]
pub fn approx_eq(a: Complex64, b: Complex64, tolerance: f64) -> bool {
    (a.re - b.re).abs() <= tolerance && (a.im - b.im).abs() <= tolerance
}

/// Divide `a` by `b`, failing if `b` has zero squared magnitude
///
/// # Errors
/// Returns [`GateError::DivisionByZero`] when `|b|² == 0`.
#[inline]
pub fn checked_div(a: Complex64, b: Complex64) -> Result<Complex64> {
    if b.norm_sqr() == 0.0 {
        return Err(GateError::DivisionByZero);
    }
    Ok(a / b)
}

/// Construct an amplitude from polar coordinates (r, θ)
#[inline]
pub fn from_polar(r: f64, theta: f64) -> Complex64 {
    Complex64::from_polar(r, theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_approx_eq_within_tolerance() {
        let a = Complex64::new(0.5, -0.25);
        let b = Complex64::new(0.5 + 1e-12, -0.25 - 1e-12);
        assert!(approx_eq(a, b, DEFAULT_TOLERANCE));
        assert!(!approx_eq(a, Complex64::new(0.5 + 1e-6, -0.25), DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_checked_div() {
        let a = Complex64::new(1.0, 1.0);
        let b = Complex64::new(0.0, 2.0);
        let q = checked_div(a, b).unwrap();
        assert_relative_eq!(q.re, 0.5, epsilon = 1e-12);
        assert_relative_eq!(q.im, -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_checked_div_by_zero() {
        let a = Complex64::new(1.0, 0.0);
        let err = checked_div(a, Complex64::new(0.0, 0.0)).unwrap_err();
        assert_eq!(err, GateError::DivisionByZero);
    }

    #[test]
    fn test_from_polar() {
        let z = from_polar(2.0, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(z.re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(z.im, 2.0, epsilon = 1e-12);
    }
}
