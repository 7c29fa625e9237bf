//! # Repository Module
//!
//! Storage behind the calculator history.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HistoryStore<S>                                                       │
//! │  ├── append / remove / clear / import   (mutate HistoryLog, persist)   │
//! │  └── get / search / stats / export      (read HistoryLog)              │
//! │       │                                                                 │
//! │       │  set("calculator-history", <JSON array>)                       │
//! │       ▼                                                                 │
//! │  KeyValueStore (trait)                                                 │
//! │  ├── SqliteKeyValueStore  - key_value_store table                      │
//! │  └── MemoryKeyValueStore  - HashMap, for tests and ephemeral runs      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`history::HistoryStore`] - Write-through calculator history
//! - [`kv::SqliteKeyValueStore`] - SQLite key-value store
//! - [`memory::MemoryKeyValueStore`] - In-memory key-value store

use std::future::Future;

use crate::error::DbResult;

pub mod history;
pub mod kv;
pub mod memory;

/// A string-to-string store that outlives the process.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value under `key`.
    fn get(&self, key: &str) -> impl Future<Output = DbResult<Option<String>>> + Send;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = DbResult<()>> + Send;

    /// Deletes `key`. Returns false when it was absent.
    fn remove(&self, key: &str) -> impl Future<Output = DbResult<bool>> + Send;
}
