//! # Calculator State Machine
//!
//! Applies one [`ButtonToken`] at a time to a [`CalculatorState`].
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Calculator Lifecycle                               │
//! │                                                                         │
//! │   ┌──────────┐  digit   ┌──────────┐  binary op  ┌──────────────────┐   │
//! │   │  Entry   │ ───────► │  Entry   │ ──────────► │ Waiting for      │   │
//! │   │  "0"     │          │  "23"    │             │ operand (2 + …)  │   │
//! │   └──────────┘          └──────────┘             └────────┬─────────┘   │
//! │        ▲                     ▲                            │ digit       │
//! │        │ AC                  │ digit clears error         ▼             │
//! │   ┌────┴─────┐          ┌────┴─────┐     =       ┌──────────────────┐   │
//! │   │ Anything │          │  Error   │ ◄───────────│ Entry with       │   │
//! │   └──────────┘          │ (sticky) │  failure    │ pending op       │   │
//! │                         └──────────┘             └────────┬─────────┘   │
//! │                                                           │ =           │
//! │                                                           ▼             │
//! │                                            result shown, event emitted  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Evaluation Order
//! Binary operators chain strictly left to right: `2 + 3 * 4 =` is `20`.
//! There is no precedence and no expression parsing.
//!
//! ## Errors
//! Arithmetic failures never escape [`Calculator::press`]. They set the
//! sticky `error` message and force the display to `"Error"`. The next
//! digit, decimal point, operator, sign toggle or memory key clears it.

use crate::arithmetic::{calculate_with_precision, parse_calculator_input};
use crate::error::CalcError;
use crate::format::{format_equation_with_digits, format_number};
use crate::types::{ButtonToken, CalculationCompleted, CalculatorConfig, CalculatorState, Operation};
use crate::validation::{
    is_valid_decimal_input, is_valid_number_input, validate_calculator_state, ValidationResult,
};
use crate::ERROR_DISPLAY;

/// One calculator: its state plus the configuration it runs with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calculator {
    state: CalculatorState,
    config: CalculatorConfig,
}

impl Calculator {
    /// Creates a calculator in the initial state.
    pub fn new(config: CalculatorConfig) -> Self {
        Calculator {
            state: CalculatorState::default(),
            config,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    /// Returns the display text.
    pub fn display(&self) -> &str {
        &self.state.display
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Audits the live state. See [`validate_calculator_state`].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_calculator_state(
            &self.state.display,
            self.state.previous_value,
            self.state.operation,
        )
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Applies one button press.
    ///
    /// Returns the completed calculation when `=` evaluated a pending
    /// operation, so the host can record it.
    pub fn press(&mut self, token: ButtonToken) -> Option<CalculationCompleted> {
        match token {
            ButtonToken::Digit(d) => self.input_digit(d),
            ButtonToken::Decimal => self.input_decimal(),
            ButtonToken::Operator(op) => {
                self.state.error = None;
                if let Err(e) = self.input_operator(op) {
                    self.fail(e);
                }
            }
            ButtonToken::Equals => return self.evaluate(),
            ButtonToken::Clear => self.clear(),
            ButtonToken::AllClear => self.state = CalculatorState::default(),
            ButtonToken::ToggleSign => self.with_display_value(|calc, value| {
                calc.state.display = calc.format(-value);
                Ok(())
            }),
            ButtonToken::MemoryStore => self.with_display_value(|calc, value| {
                calc.state.memory = value;
                calc.state.waiting_for_operand = true;
                Ok(())
            }),
            ButtonToken::MemoryRecall => {
                self.state.error = None;
                self.state.display = self.format(self.state.memory);
                self.state.waiting_for_operand = true;
            }
            ButtonToken::MemoryClear => self.state.memory = 0.0,
            ButtonToken::MemoryAdd => self.with_display_value(|calc, value| {
                calc.state.memory = calc.apply(calc.state.memory, value, Operation::Add)?;
                calc.state.waiting_for_operand = true;
                Ok(())
            }),
            ButtonToken::MemorySubtract => self.with_display_value(|calc, value| {
                calc.state.memory = calc.apply(calc.state.memory, value, Operation::Subtract)?;
                calc.state.waiting_for_operand = true;
                Ok(())
            }),
        }
        None
    }

    /// Applies a sequence of presses, collecting completed calculations.
    pub fn press_all<I>(&mut self, tokens: I) -> Vec<CalculationCompleted>
    where
        I: IntoIterator<Item = ButtonToken>,
    {
        tokens.into_iter().filter_map(|t| self.press(t)).collect()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn starts_new_entry(&self) -> bool {
        self.state.waiting_for_operand || self.state.display == ERROR_DISPLAY
    }

    fn input_digit(&mut self, digit: u8) {
        if digit > 9 {
            return;
        }
        self.state.error = None;
        let ch = char::from(b'0' + digit);

        if self.starts_new_entry() {
            self.state.display = ch.to_string();
            self.state.waiting_for_operand = false;
            return;
        }

        if !is_valid_decimal_input(&self.state.display, ch) {
            return;
        }

        let next = if self.state.display == "0" {
            ch.to_string()
        } else {
            format!("{}{}", self.state.display, ch)
        };
        if is_valid_number_input(&next, self.config.max_digits) {
            self.state.display = next;
        }
    }

    fn input_decimal(&mut self) {
        self.state.error = None;

        if self.starts_new_entry() {
            self.state.display = "0.".to_string();
            self.state.waiting_for_operand = false;
            return;
        }

        if is_valid_decimal_input(&self.state.display, '.') {
            self.state.display.push('.');
        }
    }

    fn input_operator(&mut self, op: Operation) -> Result<(), CalcError> {
        let input = parse_calculator_input(&self.state.display)?;

        if op.is_unary() {
            let result = self.apply(0.0, input, op)?;
            self.state.equation = match op {
                Operation::SquareRoot => format!("√({})", self.state.display),
                _ => format!("{}%", self.state.display),
            };
            self.state.display = self.format(result);
            self.state.previous_value = None;
            self.state.operation = None;
            self.state.waiting_for_operand = true;
            return Ok(());
        }

        match (self.state.previous_value, self.state.operation) {
            (Some(previous), Some(pending)) if !self.state.waiting_for_operand => {
                let result = self.apply(previous, input, pending)?;
                self.state.equation = self.trace(previous, pending, &self.state.display);
                self.state.display = self.format(result);
                self.state.previous_value = Some(result);
            }
            _ => {
                self.state.previous_value = Some(input);
                self.state.equation = self.trace(input, op, "");
            }
        }
        self.state.operation = Some(op);
        self.state.waiting_for_operand = true;
        Ok(())
    }

    fn evaluate(&mut self) -> Option<CalculationCompleted> {
        let (previous, op) = match (self.state.previous_value, self.state.operation) {
            (Some(previous), Some(op)) => (previous, op),
            _ => return None,
        };
        self.state.error = None;

        let outcome = parse_calculator_input(&self.state.display)
            .and_then(|input| self.apply(previous, input, op));
        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                self.fail(e);
                return None;
            }
        };

        let trace = self.trace(previous, op, &self.state.display);
        let result_text = self.format(result);

        self.state.display = result_text.clone();
        self.state.previous_value = None;
        self.state.operation = None;
        self.state.waiting_for_operand = true;
        self.state.equation = format!("{} = {}", trace, result_text);

        Some(CalculationCompleted {
            equation: trace,
            result: result_text,
        })
    }

    fn clear(&mut self) {
        self.state.display = "0".to_string();
        self.state.waiting_for_operand = false;
        self.state.error = None;
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Clears the sticky error, parses the display and runs `f` with it.
    fn with_display_value<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self, f64) -> Result<(), CalcError>,
    {
        self.state.error = None;
        let outcome = parse_calculator_input(&self.state.display).and_then(|value| f(self, value));
        if let Err(e) = outcome {
            self.fail(e);
        }
    }

    fn apply(&self, previous: f64, next: f64, op: Operation) -> Result<f64, CalcError> {
        calculate_with_precision(previous, next, op, self.config.decimal_places)
    }

    fn format(&self, value: f64) -> String {
        format_number(value, self.config.max_digits)
    }

    fn trace(&self, previous: f64, op: Operation, current: &str) -> String {
        format_equation_with_digits(Some(previous), Some(op), current, self.config.max_digits)
    }

    fn fail(&mut self, error: CalcError) {
        self.state.error = Some(error.user_message().to_string());
        self.state.display = ERROR_DISPLAY.to_string();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
