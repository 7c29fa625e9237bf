//! # Domain Types
//!
//! Core domain types used throughout Calcpad.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ButtonToken   │   │ CalculatorState │   │  HistoryEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Digit(0..=9)   │   │  display        │   │  id             │       │
//! │  │  Operator(op)   │   │  previous_value │   │  equation       │       │
//! │  │  Equals, C, AC  │   │  operation      │   │  result         │       │
//! │  │  MS, MR, ...    │   │  memory, error  │   │  timestamp      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Operation    │   │   ButtonKind    │   │  CalculatorConfig   │   │
//! │  │  + - * / % √ ^  │   │  Number, ...    │   │  max_digits, ...    │   │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Button and operator tokens are closed enums: the state machine matches
//! them exhaustively instead of comparing strings. Their string forms (the
//! labels printed on the buttons) are only used at the edges.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CalcError;
use crate::{DEFAULT_MAX_DIGITS, MAX_HISTORY_ITEMS, PRECISION};

// =============================================================================
// Operation
// =============================================================================

/// An arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "√")]
    SquareRoot,
    #[serde(rename = "^")]
    Power,
}

impl Operation {
    /// All operators, in keypad order.
    pub const ALL: [Operation; 7] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Percent,
        Operation::SquareRoot,
        Operation::Power,
    ];

    /// Returns the ASCII tag used on the wire and on the keyboard.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
            Operation::Percent => "%",
            Operation::SquareRoot => "√",
            Operation::Power => "^",
        }
    }

    /// Returns the typographic glyph used in equations (`×` rather than `*`).
    pub const fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "−",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
            Operation::Percent => "%",
            Operation::SquareRoot => "√",
            Operation::Power => "^",
        }
    }

    /// Unary operators act on the display value alone.
    #[inline]
    pub const fn is_unary(&self) -> bool {
        matches!(self, Operation::Percent | Operation::SquareRoot)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the ASCII tags and the display glyphs (`−`, `×`, `÷`).
impl FromStr for Operation {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Operation::Add),
            "-" | "−" => Ok(Operation::Subtract),
            "*" | "×" => Ok(Operation::Multiply),
            "/" | "÷" => Ok(Operation::Divide),
            "%" => Ok(Operation::Percent),
            "√" => Ok(Operation::SquareRoot),
            "^" => Ok(Operation::Power),
            other => Err(CalcError::UnknownOperation(other.to_string())),
        }
    }
}

// =============================================================================
// Button Token
// =============================================================================

/// One press of a calculator button.
///
/// This is the single input vocabulary shared by on-screen buttons and the
/// keyboard adapter. Serialized as the button label (`"7"`, `"+/-"`, `"M+"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ButtonToken {
    /// A digit, `0..=9`. Larger values are ignored by the state machine.
    Digit(u8),
    Operator(Operation),
    Equals,
    Decimal,
    /// `C` - clear the current entry.
    Clear,
    /// `AC` - reset everything.
    AllClear,
    /// `+/-`
    ToggleSign,
    MemoryClear,
    MemoryRecall,
    MemoryStore,
    MemoryAdd,
    MemorySubtract,
}

/// Visual category of a button, used by renderers for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ButtonKind {
    Number,
    Operator,
    Function,
    Memory,
    Equal,
    Clear,
}

impl ButtonToken {
    /// Creates a digit token, or `None` when `d > 9`.
    pub const fn digit(d: u8) -> Option<Self> {
        if d <= 9 {
            Some(ButtonToken::Digit(d))
        } else {
            None
        }
    }

    /// Returns the label printed on the button.
    pub fn label(&self) -> String {
        match self {
            ButtonToken::Digit(d) => d.to_string(),
            ButtonToken::Operator(op) => op.as_str().to_string(),
            other => other.control_label().to_string(),
        }
    }

    fn control_label(&self) -> &'static str {
        match self {
            ButtonToken::Equals => "=",
            ButtonToken::Decimal => ".",
            ButtonToken::Clear => "C",
            ButtonToken::AllClear => "AC",
            ButtonToken::ToggleSign => "+/-",
            ButtonToken::MemoryClear => "MC",
            ButtonToken::MemoryRecall => "MR",
            ButtonToken::MemoryStore => "MS",
            ButtonToken::MemoryAdd => "M+",
            ButtonToken::MemorySubtract => "M-",
            ButtonToken::Digit(_) | ButtonToken::Operator(_) => "",
        }
    }

    /// Returns the visual category of this button.
    pub const fn kind(&self) -> ButtonKind {
        match self {
            ButtonToken::Digit(_) => ButtonKind::Number,
            ButtonToken::Operator(_) => ButtonKind::Operator,
            ButtonToken::Equals => ButtonKind::Equal,
            ButtonToken::Decimal | ButtonToken::ToggleSign => ButtonKind::Function,
            ButtonToken::Clear | ButtonToken::AllClear => ButtonKind::Clear,
            ButtonToken::MemoryClear
            | ButtonToken::MemoryRecall
            | ButtonToken::MemoryStore
            | ButtonToken::MemoryAdd
            | ButtonToken::MemorySubtract => ButtonKind::Memory,
        }
    }
}

impl fmt::Display for ButtonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for ButtonToken {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = match s {
            "=" => ButtonToken::Equals,
            "." => ButtonToken::Decimal,
            "C" => ButtonToken::Clear,
            "AC" => ButtonToken::AllClear,
            "+/-" => ButtonToken::ToggleSign,
            "MC" => ButtonToken::MemoryClear,
            "MR" => ButtonToken::MemoryRecall,
            "MS" => ButtonToken::MemoryStore,
            "M+" => ButtonToken::MemoryAdd,
            "M-" => ButtonToken::MemorySubtract,
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_digit() => ButtonToken::Digit(c as u8 - b'0'),
                    _ => ButtonToken::Operator(s.parse()?),
                }
            }
        };
        Ok(token)
    }
}

impl TryFrom<String> for ButtonToken {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ButtonToken> for String {
    fn from(token: ButtonToken) -> Self {
        token.label()
    }
}

// =============================================================================
// Calculator State
// =============================================================================

/// The full state of one calculator.
///
/// ## Invariants
/// - `operation.is_some()` implies `previous_value.is_some()`
/// - `display` parses to a finite number, except `"Error"` while `error` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorState {
    /// Current edit buffer or formatted result.
    pub display: String,

    /// Left operand waiting for an operator to be applied.
    pub previous_value: Option<f64>,

    /// Pending operator.
    pub operation: Option<Operation>,

    /// When true the next digit starts a new number.
    pub waiting_for_operand: bool,

    /// Memory register.
    pub memory: f64,

    /// Trace of the last operation, e.g. `"2 + 3 = 5"`.
    pub equation: String,

    /// Sticky user-facing error message.
    pub error: Option<String>,
}

impl Default for CalculatorState {
    fn default() -> Self {
        CalculatorState {
            display: "0".to_string(),
            previous_value: None,
            operation: None,
            waiting_for_operand: false,
            memory: 0.0,
            equation: String::new(),
            error: None,
        }
    }
}

/// Emitted by the state machine when `=` evaluates a pending operation.
///
/// Hosts forward it to the history store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CalculationCompleted {
    /// Equation without the result, e.g. `"2 + 3"`.
    pub equation: String,
    /// Formatted result, e.g. `"5"`.
    pub result: String,
}

// =============================================================================
// History Entry
// =============================================================================

/// One completed calculation in the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HistoryEntry {
    /// Unique id: millisecond timestamp plus a random suffix.
    pub id: String,
    pub equation: String,
    pub result: String,
    /// Insertion time, serialized as ISO-8601 with millisecond precision.
    #[ts(as = "String")]
    #[serde(with = "iso_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates an entry with a freshly generated id.
    ///
    /// The timestamp is truncated to milliseconds, the precision it is
    /// stored with.
    pub fn new(
        equation: impl Into<String>,
        result: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        HistoryEntry {
            id: generate_entry_id(),
            equation: equation.into(),
            result: result.into(),
            timestamp: timestamp.trunc_subsecs(3),
        }
    }
}

/// Generates a history entry id.
///
/// The millisecond clock makes ids readable; the uuid suffix makes them
/// unique when several entries land in the same millisecond (imports).
pub fn generate_entry_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}", Utc::now().timestamp_millis(), &suffix[..9])
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
pub(crate) mod iso_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Tunables shared by the state machine and the history store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorConfig {
    /// Digit cap for typing and for plain-decimal formatting.
    pub max_digits: usize,
    /// History capacity.
    pub max_history: usize,
    /// Decimal digits kept by the state machine's arithmetic.
    pub decimal_places: i32,
    /// Persist history to the local key-value store.
    pub use_local_storage: bool,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        CalculatorConfig {
            max_digits: DEFAULT_MAX_DIGITS,
            max_history: MAX_HISTORY_ITEMS,
            decimal_places: PRECISION,
            use_local_storage: true,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_operation_round_trips_through_str() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert_eq!("×".parse::<Operation>().unwrap(), Operation::Multiply);
        assert!(matches!(
            "&".parse::<Operation>(),
            Err(CalcError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_unary_operations() {
        assert!(Operation::SquareRoot.is_unary());
        assert!(Operation::Percent.is_unary());
        assert!(!Operation::Power.is_unary());
    }

    #[test]
    fn test_button_token_parsing() {
        assert_eq!("7".parse::<ButtonToken>().unwrap(), ButtonToken::Digit(7));
        assert_eq!("AC".parse::<ButtonToken>().unwrap(), ButtonToken::AllClear);
        assert_eq!("+/-".parse::<ButtonToken>().unwrap(), ButtonToken::ToggleSign);
        assert_eq!("M-".parse::<ButtonToken>().unwrap(), ButtonToken::MemorySubtract);
        assert_eq!(
            "√".parse::<ButtonToken>().unwrap(),
            ButtonToken::Operator(Operation::SquareRoot)
        );
        assert!("12".parse::<ButtonToken>().is_err());
        assert!("x".parse::<ButtonToken>().is_err());
    }

    #[test]
    fn test_button_token_serializes_as_label() {
        let tokens = vec![
            ButtonToken::Digit(0),
            ButtonToken::Operator(Operation::Divide),
            ButtonToken::MemoryAdd,
        ];
        let json = serde_json::to_string(&tokens).unwrap();
        assert_eq!(json, r#"["0","/","M+"]"#);

        let back: Vec<ButtonToken> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tokens);
    }

    #[test]
    fn test_button_kinds() {
        assert_eq!(ButtonToken::Digit(3).kind(), ButtonKind::Number);
        assert_eq!(ButtonToken::Equals.kind(), ButtonKind::Equal);
        assert_eq!(ButtonToken::Decimal.kind(), ButtonKind::Function);
        assert_eq!(ButtonToken::AllClear.kind(), ButtonKind::Clear);
        assert_eq!(ButtonToken::MemoryRecall.kind(), ButtonKind::Memory);
        assert_eq!(ButtonToken::digit(10), None);
    }

    #[test]
    fn test_calculator_state_default() {
        let state = CalculatorState::default();
        assert_eq!(state.display, "0");
        assert_eq!(state.previous_value, None);
        assert_eq!(state.operation, None);
        assert!(!state.waiting_for_operand);
        assert_eq!(state.memory, 0.0);
        assert_eq!(state.equation, "");
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_calculator_state_uses_camel_case() {
        let json = serde_json::to_value(CalculatorState::default()).unwrap();
        assert!(json.get("waitingForOperand").is_some());
        assert!(json.get("previousValue").is_some());
    }

    #[test]
    fn test_history_entry_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 5).unwrap();
        let entry = HistoryEntry::new("2 + 3", "5", ts);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["timestamp"], "2024-03-01T09:30:05.000Z");

        let back: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back.timestamp, ts);
    }

    #[test]
    fn test_history_entry_keeps_millisecond_precision() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 5).unwrap()
            + chrono::Duration::nanoseconds(700_941_380);
        let entry = HistoryEntry::new("2 + 3", "5", ts);
        assert_eq!(entry.timestamp.timestamp_subsec_nanos(), 700_000_000);

        let json = serde_json::to_string(&entry).unwrap();
        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let a = generate_entry_id();
        let b = generate_entry_id();
        assert_ne!(a, b);
    }
}
