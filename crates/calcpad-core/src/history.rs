//! # History Log
//!
//! Bounded, newest-first log of completed calculations, plus the JSON
//! codecs used for storage and for export/import files.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  index 0 (newest)                                   index n-1 (oldest)  │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐     ┌──────────┐               │
//! │  │ 6 × 7=42 │ │ 2 + 3=5  │ │ √(9)=3   │ ... │ 1 + 1=2  │ ──► evicted    │
//! │  └──────────┘ └──────────┘ └──────────┘     └──────────┘   past cap     │
//! │        ▲                                                                │
//! │        └── append / import prepend here                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This type never touches storage. The write-through wrapper lives in
//! `calcpad-db` (`HistoryStore`).
//!
//! ## Wire Formats
//! ```text
//! storage  : [{"id","equation","result","timestamp"}, ...]
//! export   : {"exportDate", "version": "1.0",
//!             "history": [{"equation","result","timestamp"}, ...]}
//! ```

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{HistoryError, HistoryResult};
use crate::types::{iso_timestamp, HistoryEntry};
use crate::MAX_HISTORY_ITEMS;

/// Version tag written into export files.
pub const EXPORT_VERSION: &str = "1.0";

// =============================================================================
// Statistics
// =============================================================================

/// Summary numbers for the history panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_entries: usize,
    /// Entries recorded on the current local calendar day.
    pub today_entries: usize,
    /// Timestamp of the last entry in the log.
    #[ts(as = "Option<String>")]
    pub oldest_entry: Option<DateTime<Utc>>,
    /// Timestamp of the first entry in the log.
    #[ts(as = "Option<String>")]
    pub newest_entry: Option<DateTime<Utc>>,
}

// =============================================================================
// Export Format
// =============================================================================

/// A history entry as written to export files. Ids are not exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedEntry {
    pub equation: String,
    pub result: String,
    #[serde(with = "iso_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Top-level export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryExport {
    #[serde(with = "iso_timestamp")]
    pub export_date: DateTime<Utc>,
    pub version: String,
    pub history: Vec<ExportedEntry>,
}

/// Suggested file name for an export made at `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("calculator-history-{}.json", now.format("%Y-%m-%d"))
}

// =============================================================================
// History Log
// =============================================================================

/// Newest-first list of entries, capped at `capacity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(MAX_HISTORY_ITEMS)
    }
}

impl HistoryLog {
    /// Creates an empty log. The capacity is at least one.
    pub fn new(capacity: usize) -> Self {
        HistoryLog {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Creates a log from newest-first entries, dropping any past `capacity`.
    pub fn from_entries(mut entries: Vec<HistoryEntry>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        entries.truncate(capacity);
        HistoryLog { entries, capacity }
    }

    /// Newest-first entries.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Records a calculation timestamped now.
    pub fn append(&mut self, equation: &str, result: &str) -> &HistoryEntry {
        self.append_at(equation, result, Utc::now())
    }

    /// Records a calculation with an explicit timestamp.
    ///
    /// The oldest entry is evicted once the log is full.
    pub fn append_at(&mut self, equation: &str, result: &str, at: DateTime<Utc>) -> &HistoryEntry {
        self.entries.insert(0, HistoryEntry::new(equation, result, at));
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    /// Removes the entry with `id`. Returns false when there is none.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Case-insensitive substring search over equation and result.
    ///
    /// A blank query returns every entry.
    pub fn search(&self, query: &str) -> Vec<&HistoryEntry> {
        if query.trim().is_empty() {
            return self.entries.iter().collect();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                e.equation.to_lowercase().contains(&needle)
                    || e.result.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Statistics relative to the local calendar day.
    pub fn stats(&self) -> HistoryStats {
        self.stats_on(Local::now().date_naive())
    }

    /// Statistics with `today` given explicitly.
    pub fn stats_on(&self, today: NaiveDate) -> HistoryStats {
        let today_entries = self
            .entries
            .iter()
            .filter(|e| e.timestamp.with_timezone(&Local).date_naive() == today)
            .count();

        HistoryStats {
            total_entries: self.entries.len(),
            today_entries,
            oldest_entry: self.entries.last().map(|e| e.timestamp),
            newest_entry: self.entries.first().map(|e| e.timestamp),
        }
    }

    // =========================================================================
    // Export / Import
    // =========================================================================

    /// Builds the export document.
    pub fn export(&self, now: DateTime<Utc>) -> HistoryExport {
        HistoryExport {
            export_date: now,
            version: EXPORT_VERSION.to_string(),
            history: self
                .entries
                .iter()
                .map(|e| ExportedEntry {
                    equation: e.equation.clone(),
                    result: e.result.clone(),
                    timestamp: e.timestamp,
                })
                .collect(),
        }
    }

    /// Pretty-printed export document.
    pub fn to_export_json(&self, now: DateTime<Utc>) -> HistoryResult<String> {
        Ok(serde_json::to_string_pretty(&self.export(now))?)
    }

    /// Prepends the entries of an export document, in file order.
    ///
    /// Imported entries get fresh ids and keep their timestamps. The cap is
    /// re-applied afterwards. On any error the log is left untouched.
    ///
    /// ## Errors
    /// - [`HistoryError::Malformed`]: invalid JSON, or an entry lacks a
    ///   string `equation`/`result` or an ISO-8601 `timestamp`
    /// - [`HistoryError::MissingHistory`]: no array-valued `history` field
    pub fn import_json(&mut self, contents: &str) -> HistoryResult<usize> {
        let document: serde_json::Value = serde_json::from_str(contents)?;
        let history = match document.get("history") {
            Some(serde_json::Value::Array(items)) => items.clone(),
            _ => return Err(HistoryError::MissingHistory),
        };
        let imported: Vec<ExportedEntry> =
            serde_json::from_value(serde_json::Value::Array(history))?;

        let count = imported.len();
        let mut entries: Vec<HistoryEntry> = imported
            .into_iter()
            .map(|e| HistoryEntry::new(e.equation, e.result, e.timestamp))
            .collect();
        entries.append(&mut self.entries);
        entries.truncate(self.capacity);
        self.entries = entries;

        Ok(count)
    }

    // =========================================================================
    // Storage Codec
    // =========================================================================

    /// Serializes the log as a JSON array of entries.
    pub fn to_storage_json(&self) -> HistoryResult<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Parses a stored JSON array back into a log.
    pub fn from_storage_json(json: &str, capacity: usize) -> HistoryResult<Self> {
        let entries: Vec<HistoryEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries, capacity))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
