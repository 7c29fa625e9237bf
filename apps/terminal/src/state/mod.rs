//! # State Module
//!
//! Application state for the terminal host.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐        ┌──────────────────────────────────────┐  │
//! │  │   AppConfig      │        │   Session<S, C>                      │  │
//! │  │                  │ ─────► │                                      │  │
//! │  │  calculator cfg  │        │  Calculator      (state machine)     │  │
//! │  │  db_path         │        │  HistoryStore<S> (write-through)     │  │
//! │  │  keyboard flag   │        │  KeyboardAdapter + Subscription      │  │
//! │  └──────────────────┘        │  Clipboard C     (boundary)          │  │
//! │                              └──────────────────────────────────────┘  │
//! │                                                                         │
//! │  AppConfig is read-only after startup. The Session is owned by the     │
//! │  event loop and borrowed mutably for one input at a time.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod session;

pub use config::AppConfig;
pub use session::Session;
