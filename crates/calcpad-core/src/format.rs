//! # Display Formatting
//!
//! Turns numbers, equations and timestamps into display strings.
//!
//! ## Number Format Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  input                      output                                      │
//! │  ─────────────────────────  ──────────────────────────────────────────  │
//! │  NaN / ±∞                   "Error"                                     │
//! │  0 / -0                     "0"                                         │
//! │  |n| ≥ 10^max               "1.000000e+15"   (6 fraction digits)        │
//! │  |n| < 10^-max              "1.000000e-15"                              │
//! │  more than max digits       scientific                                  │
//! │  otherwise                  shortest plain decimal ("0.3", "-12.5")     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Local, Utc};

use crate::types::Operation;
use crate::{DEFAULT_MAX_DIGITS, ERROR_DISPLAY};

// =============================================================================
// Numbers
// =============================================================================

/// Formats a number for the display, capped at `max_digits` digits.
pub fn format_number(n: f64, max_digits: usize) -> String {
    if !n.is_finite() {
        return ERROR_DISPLAY.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let limit = 10f64.powi(max_digits as i32);
    let magnitude = n.abs();
    if magnitude >= limit || magnitude < limit.recip() {
        return to_scientific(n);
    }

    let plain = n.to_string();
    let digits = plain.chars().filter(|c| *c != '-' && *c != '.').count();
    if digits > max_digits {
        return to_scientific(n);
    }
    plain
}

/// Scientific notation with 6 fraction digits and a signed exponent.
fn to_scientific(n: f64) -> String {
    let raw = format!("{:.6e}", n);
    match raw.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => raw,
    }
}

/// A value headed for the display: text being typed, or a computed number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> From<&'a str> for DisplayValue<'a> {
    fn from(text: &'a str) -> Self {
        DisplayValue::Text(text)
    }
}

impl From<f64> for DisplayValue<'_> {
    fn from(n: f64) -> Self {
        DisplayValue::Number(n)
    }
}

/// Formats either typed text or a computed number.
///
/// Text is normalized (`""` → `"0"`, `"."` → `"0."`) and truncated to
/// `max_digits` characters; numbers go through [`format_number`].
pub fn format_display_value<'a>(value: impl Into<DisplayValue<'a>>, max_digits: usize) -> String {
    match value.into() {
        DisplayValue::Text("") | DisplayValue::Text("0") => "0".to_string(),
        DisplayValue::Text(".") => "0.".to_string(),
        DisplayValue::Text(text) => text.chars().take(max_digits).collect(),
        DisplayValue::Number(n) => format_number(n, max_digits),
    }
}

// =============================================================================
// Equations
// =============================================================================

/// Builds the equation trace `"{previous} {symbol} {current}"`.
///
/// Returns `current` unchanged when there is no pending operation.
pub fn format_equation(previous: Option<f64>, operation: Option<Operation>, current: &str) -> String {
    format_equation_with_digits(previous, operation, current, DEFAULT_MAX_DIGITS)
}

/// [`format_equation`] with an explicit digit cap for `previous`.
pub fn format_equation_with_digits(
    previous: Option<f64>,
    operation: Option<Operation>,
    current: &str,
    max_digits: usize,
) -> String {
    match (previous, operation) {
        (Some(prev), Some(op)) => format!(
            "{} {} {}",
            format_number(prev, max_digits),
            op.symbol(),
            current
        ),
        _ => current.to_string(),
    }
}

/// Maps an operator tag to its display glyph; unknown tags pass through.
pub fn get_operator_symbol(tag: &str) -> &str {
    match tag.parse::<Operation>() {
        Ok(op) => op.symbol(),
        Err(_) => tag,
    }
}

/// `"{equation} = {result}"`
pub fn format_history_entry(equation: &str, result: &str) -> String {
    format!("{} = {}", equation, result)
}

// =============================================================================
// Time
// =============================================================================

/// Local time of day, `HH:MM:SS`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_plain_numbers() {
        assert_eq!(format_number(5.0, 12), "5");
        assert_eq!(format_number(-12.5, 12), "-12.5");
        assert_eq!(format_number(0.3, 12), "0.3");
        assert_eq!(format_number(123456789.123, 12), "123456789.123");
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_number(0.0, 12), "0");
        assert_eq!(format_number(-0.0, 12), "0");
    }

    #[test]
    fn test_format_non_finite() {
        assert_eq!(format_number(f64::INFINITY, 12), "Error");
        assert_eq!(format_number(f64::NEG_INFINITY, 12), "Error");
        assert_eq!(format_number(f64::NAN, 12), "Error");
    }

    #[test]
    fn test_format_scientific() {
        assert_eq!(format_number(1e15, 12), "1.000000e+15");
        assert_eq!(format_number(1e-15, 12), "1.000000e-15");
        assert_eq!(format_number(-2.5e20, 12), "-2.500000e+20");
        // 13 significant digits, below the magnitude cutoff
        assert_eq!(format_number(1234567890.123, 12), "1.234568e+9");
    }

    #[test]
    fn test_format_display_value_text() {
        assert_eq!(format_display_value("", 12), "0");
        assert_eq!(format_display_value("0", 12), "0");
        assert_eq!(format_display_value(".", 12), "0.");
        assert_eq!(format_display_value("12.5", 12), "12.5");
        assert_eq!(format_display_value("1234567890123", 12), "123456789012");
    }

    #[test]
    fn test_format_display_value_number() {
        assert_eq!(format_display_value(42.0, 12), "42");
        assert_eq!(format_display_value(1e15, 12), "1.000000e+15");
    }

    #[test]
    fn test_format_equation() {
        assert_eq!(format_equation(None, None, "7"), "7");
        assert_eq!(format_equation(Some(2.0), None, "7"), "7");
        assert_eq!(
            format_equation(Some(2.0), Some(Operation::Multiply), "3"),
            "2 × 3"
        );
        assert_eq!(format_equation(Some(2.0), Some(Operation::Add), ""), "2 + ");
    }

    #[test]
    fn test_format_equation_with_digits() {
        assert_eq!(
            format_equation_with_digits(Some(123456.0), Some(Operation::Add), "1", 4),
            "1.234560e+5 + 1"
        );
        assert_eq!(
            format_equation_with_digits(Some(123456.0), Some(Operation::Add), "1", 12),
            "123456 + 1"
        );
    }

    #[test]
    fn test_get_operator_symbol() {
        assert_eq!(get_operator_symbol("-"), "−");
        assert_eq!(get_operator_symbol("*"), "×");
        assert_eq!(get_operator_symbol("/"), "÷");
        assert_eq!(get_operator_symbol("√"), "√");
        assert_eq!(get_operator_symbol("&"), "&");
    }

    #[test]
    fn test_format_history_entry() {
        assert_eq!(format_history_entry("2 + 3", "5"), "2 + 3 = 5");
    }

    #[test]
    fn test_format_timestamp_shape() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 8, 5, 9).unwrap();
        let text = format_timestamp(&ts);
        assert_eq!(text.len(), 8);
        assert_eq!(&text[6..], "09");
        assert_eq!(text.matches(':').count(), 2);
    }
}
