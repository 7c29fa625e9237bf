//! # Validation Module
//!
//! Input-shape checks for the state machine and the keyboard key map.
//!
//! ## Where Checks Happen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Keyboard                                                      │
//! │  ├── is_valid_keyboard_input: should the host suppress the key?         │
//! │  └── map_keyboard_input: key name → ButtonToken                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: State machine (THIS MODULE)                                   │
//! │  ├── is_valid_decimal_input: one point, no leading zeros                │
//! │  └── is_valid_number_input: digit cap                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Arithmetic                                                    │
//! │  └── DivisionByZero / NegativeSquareRoot / Overflow                     │
//! │                                                                         │
//! │  validate_calculator_state audits a whole state snapshot               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use calcpad_core::validation::{is_valid_decimal_input, map_keyboard_input};
//! use calcpad_core::ButtonToken;
//!
//! assert!(!is_valid_decimal_input("3.1", '.'));
//! assert_eq!(map_keyboard_input("Enter"), Some(ButtonToken::Equals));
//! ```

use crate::arithmetic::{is_valid_number, parse_calculator_input};
use crate::error::ValidationError;
use crate::types::{ButtonToken, Operation};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Entry Validators
// =============================================================================

/// Returns false when appending `next` to `current` is not allowed.
///
/// ## Rules
/// - A second decimal point is rejected
/// - A `0` after a lone `"0"` is rejected
pub fn is_valid_decimal_input(current: &str, next: char) -> bool {
    if next == '.' && current.contains('.') {
        return false;
    }
    if next == '0' && current == "0" {
        return false;
    }
    true
}

/// Returns true when `current` holds at most `max_digits` digits.
///
/// The decimal point and the minus sign do not count.
pub fn is_valid_number_input(current: &str, max_digits: usize) -> bool {
    current.chars().filter(|c| *c != '.' && *c != '-').count() <= max_digits
}

/// Returns true when `operation` has the operands it needs.
///
/// Unary operators need a numeric `current`; binary operators also need
/// a previous value.
pub fn can_perform_operation(operation: Operation, previous: Option<f64>, current: &str) -> bool {
    if !is_valid_number(current) {
        return false;
    }
    operation.is_unary() || previous.is_some()
}

// =============================================================================
// Keyboard
// =============================================================================

/// Key names the calculator claims from the host.
const KEYBOARD_KEYS: &[&str] = &[
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "+", "-", "*", "/", "%", "=", ".",
    "Enter", "Backspace", "Delete", "Escape", "c", "C",
];

/// Returns true for keys the calculator handles.
pub fn is_valid_keyboard_input(key: &str) -> bool {
    KEYBOARD_KEYS.contains(&key)
}

/// Maps a key name onto a button.
///
/// ## Mapping
/// ```text
/// 0-9 + - * / % = .   → same button
/// Enter               → =
/// Backspace, c        → C
/// Delete, Escape, C   → AC
/// anything else       → None
/// ```
pub fn map_keyboard_input(key: &str) -> Option<ButtonToken> {
    match key {
        "Enter" => Some(ButtonToken::Equals),
        "Backspace" | "c" => Some(ButtonToken::Clear),
        "Delete" | "Escape" | "C" => Some(ButtonToken::AllClear),
        _ if is_valid_keyboard_input(key) => key.parse().ok(),
        _ => None,
    }
}

// =============================================================================
// State Audit
// =============================================================================

/// Checks a state snapshot for consistency.
///
/// ## Errors
/// - [`ValidationError::InvalidDisplay`]: non-empty, non-numeric display
/// - [`ValidationError::MissingPreviousValue`]: operator without left operand
/// - [`ValidationError::DivisionByZero`]: pending `/` with a zero display
/// - [`ValidationError::NegativeSquareRoot`]: pending `√` on a negative display
pub fn validate_calculator_state(
    display: &str,
    previous: Option<f64>,
    operation: Option<Operation>,
) -> ValidationResult<()> {
    let value = if display.is_empty() {
        None
    } else {
        Some(parse_calculator_input(display).map_err(|_| ValidationError::InvalidDisplay)?)
    };

    if operation.is_some() && previous.is_none() {
        return Err(ValidationError::MissingPreviousValue);
    }

    match (operation, value) {
        (Some(Operation::Divide), Some(v)) if v == 0.0 => Err(ValidationError::DivisionByZero),
        (Some(Operation::SquareRoot), Some(v)) if v < 0.0 => {
            Err(ValidationError::NegativeSquareRoot)
        }
        _ => Ok(()),
    }
}

// =============================================================================
// Button Classification
// =============================================================================

pub fn is_number_button(token: &ButtonToken) -> bool {
    matches!(token, ButtonToken::Digit(d) if *d <= 9)
}

pub fn is_operator_button(token: &ButtonToken) -> bool {
    matches!(token, ButtonToken::Operator(_))
}

/// `C`, `AC`, `+/-` and `.`
pub fn is_function_button(token: &ButtonToken) -> bool {
    matches!(
        token,
        ButtonToken::Clear | ButtonToken::AllClear | ButtonToken::ToggleSign | ButtonToken::Decimal
    )
}

pub fn is_memory_button(token: &ButtonToken) -> bool {
    matches!(
        token,
        ButtonToken::MemoryClear
            | ButtonToken::MemoryRecall
            | ButtonToken::MemoryStore
            | ButtonToken::MemoryAdd
            | ButtonToken::MemorySubtract
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
