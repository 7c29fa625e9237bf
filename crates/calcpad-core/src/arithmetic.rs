//! # Arithmetic
//!
//! Floating point operations rounded to a fixed number of decimal digits.
//!
//! ## Why Round Every Result?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Binary floating point cannot represent 0.1 exactly:                    │
//! │                                                                         │
//! │     0.1 + 0.2            = 0.30000000000000004                          │
//! │     round(x * 10^10)/10^10 = 0.3                                        │
//! │                                                                         │
//! │  Ten decimal digits remove the noise while keeping every digit a        │
//! │  12-digit display can show.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation returns [`CalcResult<f64>`]. The state machine turns a
//! failure into the sticky error message; nothing here panics.

use crate::error::{CalcError, CalcResult};
use crate::types::Operation;
use crate::PRECISION;

// =============================================================================
// Rounding
// =============================================================================

/// Rounds `n` to `precision` decimal digits.
///
/// Halves round away from zero. Values too large to scale are returned
/// unchanged; they carry no fractional digits anyway.
pub fn round_to_precision(n: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    let scaled = n * factor;
    if !scaled.is_finite() {
        return n;
    }
    scaled.round() / factor
}

#[inline]
fn finish(value: f64, precision: i32) -> CalcResult<f64> {
    if !value.is_finite() {
        return Err(CalcError::Overflow);
    }
    Ok(round_to_precision(value, precision))
}

// =============================================================================
// Operations
// =============================================================================

pub fn add(a: f64, b: f64) -> CalcResult<f64> {
    finish(a + b, PRECISION)
}

pub fn subtract(a: f64, b: f64) -> CalcResult<f64> {
    finish(a - b, PRECISION)
}

pub fn multiply(a: f64, b: f64) -> CalcResult<f64> {
    finish(a * b, PRECISION)
}

/// Divides `a` by `b`.
///
/// ## Errors
/// [`CalcError::DivisionByZero`] when `b == 0` (including `-0.0`).
pub fn divide(a: f64, b: f64) -> CalcResult<f64> {
    if b == 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    finish(a / b, PRECISION)
}

/// `a / 100`.
pub fn percentage(a: f64) -> CalcResult<f64> {
    finish(a / 100.0, PRECISION)
}

/// Square root of `a`.
///
/// ## Errors
/// [`CalcError::NegativeSquareRoot`] when `a < 0`.
pub fn square_root(a: f64) -> CalcResult<f64> {
    if a < 0.0 {
        return Err(CalcError::NegativeSquareRoot);
    }
    finish(a.sqrt(), PRECISION)
}

/// `a` raised to `b`.
///
/// ## Errors
/// [`CalcError::Overflow`] when the result is not finite (`10 ^ 400`,
/// `0 ^ -1`, or a NaN such as `(-8) ^ 0.5`).
pub fn power(a: f64, b: f64) -> CalcResult<f64> {
    finish(a.powf(b), PRECISION)
}

// =============================================================================
// Dispatch
// =============================================================================

/// Applies `operation` with the default precision.
///
/// Unary operators (`%`, `√`) ignore `previous` and act on `next`.
pub fn calculate(previous: f64, next: f64, operation: Operation) -> CalcResult<f64> {
    calculate_with_precision(previous, next, operation, PRECISION)
}

/// Applies `operation`, rounding the result to `precision` decimal digits.
pub fn calculate_with_precision(
    previous: f64,
    next: f64,
    operation: Operation,
    precision: i32,
) -> CalcResult<f64> {
    let raw = match operation {
        Operation::Add => previous + next,
        Operation::Subtract => previous - next,
        Operation::Multiply => previous * next,
        Operation::Divide => {
            if next == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            previous / next
        }
        Operation::Percent => next / 100.0,
        Operation::SquareRoot => {
            if next < 0.0 {
                return Err(CalcError::NegativeSquareRoot);
            }
            next.sqrt()
        }
        Operation::Power => previous.powf(next),
    };
    finish(raw, precision)
}

// =============================================================================
// Operand Parsing
// =============================================================================

/// Parses display text into an operand.
///
/// Surrounding whitespace is ignored. `"3."` parses as `3`.
///
/// ## Errors
/// [`CalcError::InvalidInput`] for empty, unparseable or non-finite text
/// (`"Error"`, `"inf"`, `"1e999"`).
pub fn parse_calculator_input(input: &str) -> CalcResult<f64> {
    let trimmed = input.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(CalcError::InvalidInput(input.to_string())),
    }
}

/// Returns true when `input` is a finite number. `""` and `"."` are not.
pub fn is_valid_number(input: &str) -> bool {
    parse_calculator_input(input).is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_hides_float_noise() {
        assert_eq!(add(0.1, 0.2).unwrap(), 0.3);
        assert_eq!(subtract(0.3, 0.1).unwrap(), 0.2);
        assert_eq!(multiply(0.1, 3.0).unwrap(), 0.3);
    }

    #[test]
    fn test_divide() {
        assert_eq!(divide(10.0, 4.0).unwrap(), 2.5);
        assert_eq!(divide(1.0, 3.0).unwrap(), 0.3333333333);
        assert_eq!(divide(5.0, 0.0), Err(CalcError::DivisionByZero));
        assert_eq!(divide(5.0, -0.0), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn test_unary_operations() {
        assert_eq!(percentage(50.0).unwrap(), 0.5);
        assert_eq!(square_root(16.0).unwrap(), 4.0);
        assert_eq!(square_root(0.0).unwrap(), 0.0);
        assert_eq!(square_root(-4.0), Err(CalcError::NegativeSquareRoot));
    }

    #[test]
    fn test_power() {
        assert_eq!(power(2.0, 10.0).unwrap(), 1024.0);
        assert_eq!(power(4.0, 0.5).unwrap(), 2.0);
        assert_eq!(power(10.0, 400.0), Err(CalcError::Overflow));
        assert_eq!(power(-8.0, 0.5), Err(CalcError::Overflow));
    }

    #[test]
    fn test_overflow_from_any_operation() {
        assert_eq!(multiply(f64::MAX, 10.0), Err(CalcError::Overflow));
        assert_eq!(add(f64::MAX, f64::MAX), Err(CalcError::Overflow));
    }

    #[test]
    fn test_calculate_dispatch() {
        assert_eq!(calculate(2.0, 3.0, Operation::Add).unwrap(), 5.0);
        assert_eq!(calculate(2.0, 3.0, Operation::Subtract).unwrap(), -1.0);
        assert_eq!(calculate(2.0, 3.0, Operation::Multiply).unwrap(), 6.0);
        assert_eq!(calculate(3.0, 2.0, Operation::Divide).unwrap(), 1.5);
        assert_eq!(calculate(2.0, 3.0, Operation::Power).unwrap(), 8.0);
        // Unary operators only look at the right operand
        assert_eq!(calculate(99.0, 25.0, Operation::Percent).unwrap(), 0.25);
        assert_eq!(calculate(99.0, 9.0, Operation::SquareRoot).unwrap(), 3.0);
    }

    #[test]
    fn test_calculate_with_precision() {
        let third = calculate_with_precision(1.0, 3.0, Operation::Divide, 2).unwrap();
        assert_eq!(third, 0.33);
    }

    #[test]
    fn test_round_to_precision() {
        assert_eq!(round_to_precision(1.23456, 2), 1.23);
        assert_eq!(round_to_precision(2.5, 0), 3.0);
        assert_eq!(round_to_precision(1e300, 10), 1e300);
    }

    #[test]
    fn test_parse_calculator_input() {
        assert_eq!(parse_calculator_input("42").unwrap(), 42.0);
        assert_eq!(parse_calculator_input(" -3.5 ").unwrap(), -3.5);
        assert_eq!(parse_calculator_input("3.").unwrap(), 3.0);
        assert!(matches!(
            parse_calculator_input("Error"),
            Err(CalcError::InvalidInput(_))
        ));
        assert!(parse_calculator_input("inf").is_err());
        assert!(parse_calculator_input("").is_err());
    }

    #[test]
    fn test_is_valid_number() {
        assert!(is_valid_number("0.5"));
        assert!(is_valid_number("-12"));
        assert!(!is_valid_number(""));
        assert!(!is_valid_number("."));
        assert!(!is_valid_number("abc"));
        assert!(!is_valid_number("NaN"));
    }
}
