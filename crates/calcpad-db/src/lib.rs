//! # calcpad-db: Persistence Layer for Calcpad
//!
//! This crate provides the local key-value store and the write-through
//! history store. It uses SQLite through sqlx for file-backed storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Calcpad Data Flow                                │
//! │                                                                         │
//! │  Host event loop (`=` pressed → CalculationCompleted)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    calcpad-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │  │   │
//! │  │   │               │    │ HistoryStore       │  │            │  │   │
//! │  │   │ SqlitePool    │◄───│  └► KeyValueStore  │  │ 001_kv.sql │  │   │
//! │  │   │               │    │      ├ Sqlite      │  │            │  │   │
//! │  │   │               │    │      └ Memory      │  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/calcpad/calcpad.db                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Key-value stores and the history store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use calcpad_db::{Database, DbConfig, HistoryStore};
//!
//! let db = Database::new(DbConfig::new("calcpad.db")).await?;
//! let mut history = HistoryStore::open(db.key_values(), 50).await;
//!
//! history.append("2 + 3", "5").await;
//! assert_eq!(history.entries().len(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::history::{HistoryStore, HISTORY_STORAGE_KEY};
pub use repository::kv::SqliteKeyValueStore;
pub use repository::memory::MemoryKeyValueStore;
pub use repository::KeyValueStore;
