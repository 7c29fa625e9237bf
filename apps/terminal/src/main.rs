//! # Calcpad Terminal Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Calcpad Terminal                                 │
//! │                                                                         │
//! │  stdin lines ──► lib.rs run() ──► Session ──► stdout (display)          │
//! │                                      │                                  │
//! │                                      └──► SQLite history (write-through)│
//! │                                                                         │
//! │  logs ──► stderr                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    match calcpad_terminal_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("calcpad: {}", e);
            ExitCode::FAILURE
        }
    }
}
