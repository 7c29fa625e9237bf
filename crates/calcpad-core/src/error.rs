//! # Error Types
//!
//! Domain-specific error types for calcpad-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  calcpad-core errors (this file)                                       │
//! │  ├── CalcError        - Arithmetic and operand parsing failures        │
//! │  ├── ValidationError  - Calculator state consistency failures          │
//! │  └── HistoryError     - Malformed history / import payloads            │
//! │                                                                         │
//! │  calcpad-db errors (separate crate)                                    │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  Host app errors                                                       │
//! │  └── AppError         - Startup, I/O, clipboard                        │
//! │                                                                         │
//! │  Flow: CalcError → sticky `error` field → "Error" on the display       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. `Display` is the developer message; `user_message()` is what the
//!    calculator shows
//! 3. Errors are enum variants, never String

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Calculation Error
// =============================================================================

/// Failures raised by arithmetic and operand parsing.
///
/// None of these are fatal: the state machine catches them and turns them
/// into the sticky error message plus an `"Error"` display.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Right operand of a division was zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// Square root of a negative operand.
    #[error("Square root of negative number")]
    NegativeSquareRoot,

    /// The mathematical result is not a finite number.
    ///
    /// ## When This Occurs
    /// - `10 ^ 400`
    /// - Multiplying two values near `f64::MAX`
    #[error("Result overflow")]
    Overflow,

    /// Operand text could not be parsed as a finite number.
    #[error("Invalid number: {0:?}")]
    InvalidInput(String),

    /// Operator tag outside the closed operator set.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
}

impl CalcError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::DivisionByZero => ErrorKind::DivisionByZero,
            CalcError::NegativeSquareRoot => ErrorKind::InvalidOperation,
            CalcError::Overflow => ErrorKind::Overflow,
            CalcError::InvalidInput(_) => ErrorKind::InvalidInput,
            CalcError::UnknownOperation(_) => ErrorKind::InvalidOperation,
        }
    }

    /// Returns the message shown to the user while the error is sticky.
    ///
    /// ## Mapping
    /// ```text
    /// DivisionByZero     → "Cannot divide by zero"
    /// NegativeSquareRoot → "Invalid operation"
    /// Overflow           → "Result too large"
    /// InvalidInput       → "Invalid input"
    /// UnknownOperation   → "Invalid operation"
    /// ```
    pub fn user_message(&self) -> &'static str {
        match self {
            CalcError::DivisionByZero => "Cannot divide by zero",
            CalcError::NegativeSquareRoot => "Invalid operation",
            CalcError::Overflow => "Result too large",
            CalcError::InvalidInput(_) => "Invalid input",
            CalcError::UnknownOperation(_) => "Invalid operation",
        }
    }
}

/// Error category reported alongside a calculator error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DivisionByZero,
    InvalidInput,
    Overflow,
    Underflow,
    InvalidOperation,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Calculator state consistency failures.
///
/// Produced by [`crate::validation::validate_calculator_state`]. A failed
/// check describes an invalid state; it never aborts anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Display text is not a number.
    #[error("Invalid display value")]
    InvalidDisplay,

    /// An operator is staged without a left operand.
    #[error("Missing previous value for operation")]
    MissingPreviousValue,

    /// A division is pending and the display is zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// A square root is pending on a negative display value.
    #[error("Square root of negative number")]
    NegativeSquareRoot,
}

// =============================================================================
// History Error
// =============================================================================

/// Failures while decoding or encoding history payloads.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Payload is not valid JSON, or an entry is missing
    /// `equation`/`result`/`timestamp`.
    #[error("Malformed history payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Payload parsed but has no array-valued `history` field.
    #[error("History payload has no `history` array")]
    MissingHistory,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CalcError.
pub type CalcResult<T> = Result<T, CalcError>;

/// Convenience type alias for Results with HistoryError.
pub type HistoryResult<T> = Result<T, HistoryError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            CalcError::DivisionByZero.user_message(),
            "Cannot divide by zero"
        );
        assert_eq!(
            CalcError::NegativeSquareRoot.user_message(),
            "Invalid operation"
        );
        assert_eq!(CalcError::Overflow.user_message(), "Result too large");
        assert_eq!(
            CalcError::InvalidInput("abc".to_string()).user_message(),
            "Invalid input"
        );
        assert_eq!(
            CalcError::UnknownOperation("&".to_string()).user_message(),
            "Invalid operation"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CalcError::DivisionByZero.kind(), ErrorKind::DivisionByZero);
        assert_eq!(CalcError::Overflow.kind(), ErrorKind::Overflow);
        assert_eq!(
            CalcError::NegativeSquareRoot.kind(),
            ErrorKind::InvalidOperation
        );
    }

    #[test]
    fn test_developer_messages() {
        assert_eq!(
            CalcError::UnknownOperation("&".to_string()).to_string(),
            "Unknown operation: &"
        );
        assert_eq!(
            ValidationError::MissingPreviousValue.to_string(),
            "Missing previous value for operation"
        );
    }

    #[test]
    fn test_history_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: HistoryError = json_err.into();
        assert!(matches!(err, HistoryError::Malformed(_)));
    }
}
