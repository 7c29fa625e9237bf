//! # calcpad-core: Pure Calculator Logic for Calcpad
//!
//! This crate is the **heart** of Calcpad. It contains the calculation state
//! machine, the history log and everything they depend on, as pure code with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Calcpad Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Presentation (browser UI / terminal host)            │   │
//! │  │      Buttons ──► Keyboard ──► Display ──► History panel         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ButtonToken / KeyEvent                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ calcpad-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐ ┌──────────┐ ┌────────────┐ ┌───────────────┐  │   │
//! │  │  │ arithmetic │ │  format  │ │ validation │ │  calculator   │  │   │
//! │  │  │ add, div   │ │ 1.0e+15  │ │ key map    │ │ state machine │  │   │
//! │  │  └────────────┘ └──────────┘ └────────────┘ └───────────────┘  │   │
//! │  │  ┌────────────┐ ┌──────────┐                                   │   │
//! │  │  │  keyboard  │ │ history  │   NO I/O • NO DATABASE • PURE     │   │
//! │  │  └────────────┘ └──────────┘                                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 calcpad-db (Persistence Layer)                  │   │
//! │  │           SQLite key-value store, write-through history         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Operation, ButtonToken, CalculatorState, ...)
//! - [`arithmetic`] - Rounded floating point operations with typed errors
//! - [`format`] - Display strings for numbers, equations and timestamps
//! - [`validation`] - Input-shape checks and the keyboard key map
//! - [`calculator`] - The calculation state machine
//! - [`keyboard`] - Keyboard adapter with subscription handles
//! - [`history`] - Bounded history log, search, stats, export/import
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use calcpad_core::{ButtonToken, Calculator, Operation};
//!
//! let mut calc = Calculator::default();
//! calc.press(ButtonToken::Digit(2));
//! calc.press(ButtonToken::Operator(Operation::Add));
//! calc.press(ButtonToken::Digit(3));
//! let completed = calc.press(ButtonToken::Equals).unwrap();
//!
//! assert_eq!(calc.display(), "5");
//! assert_eq!(completed.equation, "2 + 3");
//! assert_eq!(completed.result, "5");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod arithmetic;
pub mod calculator;
pub mod error;
pub mod format;
pub mod history;
pub mod keyboard;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::Calculator;
pub use error::{CalcError, ErrorKind, HistoryError, ValidationError};
pub use history::{HistoryLog, HistoryStats};
pub use keyboard::{KeyAction, KeyEvent, KeyOutcome, KeyboardAdapter, Subscription};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of digits shown or accepted on the display.
pub const DEFAULT_MAX_DIGITS: usize = 12;

/// Maximum number of entries kept in the calculation history.
///
/// Older entries are evicted first once the log is full.
pub const MAX_HISTORY_ITEMS: usize = 50;

/// Decimal digits kept after every arithmetic operation.
///
/// Ten digits hide binary floating point noise (`0.1 + 0.2`) while keeping
/// every digit a 12-digit display can show.
pub const PRECISION: i32 = 10;

/// Text shown on the display while a sticky error is active.
pub const ERROR_DISPLAY: &str = "Error";
