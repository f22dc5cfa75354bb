//! Classical ALU
//!
//! Integer arithmetic on 32-bit signed values with wrapping overflow,
//! two's-complement bitwise operators, and comparisons yielding 1 or 0.
//! DIV truncates toward zero; a zero divisor is an error.

use crate::error::{Result, VmError};
use qvm_qbc::BinaryOp;

/// Evaluate a binary ALU operation
pub fn eval_binary(op: BinaryOp, a: i32, b: i32) -> Result<i32> {
    Ok(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                return Err(VmError::DivisionByZero);
            }
            a.wrapping_div(b)
        }
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Eq => (a == b) as i32,
        BinaryOp::Neq => (a != b) as i32,
        BinaryOp::Lt => (a < b) as i32,
        BinaryOp::Gt => (a > b) as i32,
    })
}

/// Bitwise complement
pub fn eval_not(a: i32) -> i32 {
    !a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval_binary(BinaryOp::Add, 5, 3).unwrap(), 8);
        assert_eq!(eval_binary(BinaryOp::Sub, 5, 3).unwrap(), 2);
        assert_eq!(eval_binary(BinaryOp::Mul, -4, 3).unwrap(), -12);
    }

    #[test]
    fn test_div_truncates_toward_zero() {
        assert_eq!(eval_binary(BinaryOp::Div, 7, 2).unwrap(), 3);
        assert_eq!(eval_binary(BinaryOp::Div, -7, 2).unwrap(), -3);
        assert_eq!(eval_binary(BinaryOp::Div, 7, -2).unwrap(), -3);
    }

    #[test]
    fn test_div_by_zero_fails() {
        assert_eq!(
            eval_binary(BinaryOp::Div, 1, 0).unwrap_err(),
            VmError::DivisionByZero
        );
    }

    #[test]
    fn test_overflow_wraps() {
        assert_eq!(
            eval_binary(BinaryOp::Add, i32::MAX, 1).unwrap(),
            i32::MIN
        );
        assert_eq!(
            eval_binary(BinaryOp::Div, i32::MIN, -1).unwrap(),
            i32::MIN
        );
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(eval_binary(BinaryOp::And, 0b1100, 0b1010).unwrap(), 0b1000);
        assert_eq!(eval_binary(BinaryOp::Or, 0b1100, 0b1010).unwrap(), 0b1110);
        assert_eq!(eval_binary(BinaryOp::Xor, 0b1100, 0b1010).unwrap(), 0b0110);
        assert_eq!(eval_not(0), -1);
        assert_eq!(eval_not(-1), 0);
    }

    #[test]
    fn test_comparisons_yield_flags() {
        assert_eq!(eval_binary(BinaryOp::Eq, 2, 2).unwrap(), 1);
        assert_eq!(eval_binary(BinaryOp::Neq, 2, 2).unwrap(), 0);
        assert_eq!(eval_binary(BinaryOp::Lt, 1, 2).unwrap(), 1);
        assert_eq!(eval_binary(BinaryOp::Gt, 1, 2).unwrap(), 0);
        assert_eq!(eval_binary(BinaryOp::Gt, -1, -2).unwrap(), 1);
    }
}
