//! # Application Error Type
//!
//! Unified error type for the terminal host.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Calcpad Terminal                       │
//! │                                                                         │
//! │  Startup                        Event loop                              │
//! │  ───────                        ──────────                              │
//! │  DbError (open / migrate) ─┐    CalcError  → sticky display error       │
//! │  io::Error (data dir)     ─┼─►  HistoryError / io::Error (import,       │
//! │                            │      export) → "error: …" line, continue   │
//! │                            ▼    Clipboard  → false, warn!               │
//! │                         AppError                                        │
//! │                            │                                            │
//! │                            ▼                                            │
//! │                  main prints it, exit code 1                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use calcpad_core::HistoryError;
use calcpad_db::DbError;
use thiserror::Error;

/// Errors surfaced by the host application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Opening or migrating the history database failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// A history file could not be parsed.
    #[error("History file error: {0}")]
    History(#[from] HistoryError),

    /// A snapshot could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading stdin or a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No platform data directory could be determined.
    #[error("Could not determine app data directory")]
    DataDirectory,

    /// The system clipboard is unavailable.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Input line could not be understood.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// A command was given the wrong arguments.
    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Result type for host operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            AppError::UnknownCommand(":frobnicate".to_string()).to_string(),
            "Unknown command: :frobnicate"
        );
        assert_eq!(
            AppError::Usage(":import <path>").to_string(),
            "Usage: :import <path>"
        );
        let err: AppError = HistoryError::MissingHistory.into();
        assert!(err.to_string().starts_with("History file error"));
        let err: AppError = DbError::PoolExhausted.into();
        assert_eq!(err.to_string(), "Database error: Connection pool exhausted");
    }
}
