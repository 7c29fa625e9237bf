//! # History Store
//!
//! Write-through persistence for the calculator [`HistoryLog`].
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  open(store, capacity)                                                 │
//! │       │  get("calculator-history")                                     │
//! │       ├── Ok(Some(json)) and parses  ──► hydrated log                  │
//! │       ├── Ok(None)                   ──► empty log                     │
//! │       └── read/parse failure         ──► warn!, empty log              │
//! │                                                                         │
//! │  append / remove / clear / import                                      │
//! │       │  mutate the in-memory log                                      │
//! │       ▼                                                                 │
//! │  persist()  set("calculator-history", <JSON array>)                    │
//! │       └── failure ──► warn!, in-memory log stays authoritative         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each mutating call awaits its write before returning, so there is at
//! most one write in flight.

use calcpad_core::history::{export_file_name, HistoryExport};
use calcpad_core::{CalculationCompleted, HistoryEntry, HistoryError, HistoryLog, HistoryStats};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::kv::SqliteKeyValueStore;
use super::KeyValueStore;
use crate::error::DbResult;

/// Storage key of the persisted history array.
pub const HISTORY_STORAGE_KEY: &str = "calculator-history";

/// A [`HistoryLog`] mirrored into a [`KeyValueStore`] after every mutation.
///
/// Without a store (`use_local_storage = false`) the log lives in memory
/// only.
#[derive(Debug)]
pub struct HistoryStore<S = SqliteKeyValueStore> {
    log: HistoryLog,
    store: Option<S>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Loads the persisted log from `store`.
    ///
    /// Never fails: unreadable or malformed data is logged and replaced by
    /// an empty log.
    pub async fn open(store: S, capacity: usize) -> Self {
        let log = match store.get(HISTORY_STORAGE_KEY).await {
            Ok(Some(json)) => match HistoryLog::from_storage_json(&json, capacity) {
                Ok(log) => log,
                Err(e) => {
                    warn!(error = %e, "Stored history is malformed, starting empty");
                    HistoryLog::new(capacity)
                }
            },
            Ok(None) => HistoryLog::new(capacity),
            Err(e) => {
                warn!(error = %e, "Failed to read stored history, starting empty");
                HistoryLog::new(capacity)
            }
        };

        info!(entries = log.len(), capacity, "History loaded");
        HistoryStore {
            log,
            store: Some(store),
        }
    }

    /// Creates a store that never persists.
    pub fn ephemeral(capacity: usize) -> Self {
        HistoryStore {
            log: HistoryLog::new(capacity),
            store: None,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    // =========================================================================
    // Mutation (write-through)
    // =========================================================================

    /// Records a calculation and persists the log.
    pub async fn append(&mut self, equation: &str, result: &str) -> HistoryEntry {
        let entry = self.log.append(equation, result).clone();
        debug!(id = %entry.id, equation = %entry.equation, "History entry added");
        self.persist_logged().await;
        entry
    }

    /// Records a completed calculation emitted by the state machine.
    pub async fn record(&mut self, completed: &CalculationCompleted) -> HistoryEntry {
        self.append(&completed.equation, &completed.result).await
    }

    /// Removes an entry. Returns false (and writes nothing) for unknown ids.
    pub async fn remove(&mut self, id: &str) -> bool {
        if !self.log.remove(id) {
            return false;
        }
        debug!(id = %id, "History entry removed");
        self.persist_logged().await;
        true
    }

    pub async fn clear(&mut self) {
        self.log.clear();
        info!("History cleared");
        self.persist_logged().await;
    }

    /// Imports an export document, reporting only success.
    pub async fn import(&mut self, contents: &str) -> bool {
        match self.try_import(contents).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "History import rejected");
                false
            }
        }
    }

    /// Imports an export document. Returns the number of entries read.
    ///
    /// On error nothing changes and nothing is written.
    pub async fn try_import(&mut self, contents: &str) -> Result<usize, HistoryError> {
        let count = self.log.import_json(contents)?;
        info!(imported = count, total = self.log.len(), "History imported");
        self.persist_logged().await;
        Ok(count)
    }

    /// Writes the full log to the store.
    pub async fn persist(&self) -> DbResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let json = self.log.to_storage_json()?;
        store.set(HISTORY_STORAGE_KEY, &json).await
    }

    async fn persist_logged(&self) {
        if let Err(e) = self.persist().await {
            warn!(error = %e, "Failed to persist history");
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Newest-first entries.
    pub fn entries(&self) -> &[HistoryEntry] {
        self.log.entries()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.log.get(id)
    }

    pub fn search(&self, query: &str) -> Vec<&HistoryEntry> {
        self.log.search(query)
    }

    pub fn stats(&self) -> HistoryStats {
        self.log.stats()
    }

    pub fn export(&self, now: DateTime<Utc>) -> HistoryExport {
        self.log.export(now)
    }

    /// Returns `(suggested file name, pretty JSON)` for an export at `now`.
    pub fn export_file(&self, now: DateTime<Utc>) -> Result<(String, String), HistoryError> {
        Ok((export_file_name(now), self.log.to_export_json(now)?))
    }

    pub fn log(&self) -> &HistoryLog {
        &self.log
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
