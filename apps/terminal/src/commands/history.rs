//! # History Commands
//!
//! Rendering and file transfer for the calculation history.
//!
//! ## Export / Import
//! ```text
//! :export [path]   HistoryStore::export_file(now)
//!                    └─► calculator-history-YYYY-MM-DD.json
//!                        (in `path` when it is a directory, else at `path`)
//!
//! :import <path>   read file ──► HistoryStore::try_import
//!                    ├── Ok(n)  ──► entries prepended, persisted
//!                    └── Err    ──► nothing changes
//! ```

use std::path::{Path, PathBuf};

use calcpad_core::format::{format_history_entry, format_timestamp};
use calcpad_core::{HistoryEntry, HistoryStats};
use calcpad_db::{HistoryStore, KeyValueStore};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::AppResult;

/// One line per entry: `HH:MM:SS  equation = result  [id]`.
pub fn render_entries<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a HistoryEntry>,
{
    let lines: Vec<String> = entries
        .into_iter()
        .map(|entry| {
            format!(
                "{}  {}  [{}]",
                format_timestamp(&entry.timestamp),
                format_history_entry(&entry.equation, &entry.result),
                entry.id
            )
        })
        .collect();

    if lines.is_empty() {
        vec!["No history".to_string()]
    } else {
        lines
    }
}

pub fn render_stats(stats: &HistoryStats) -> Vec<String> {
    let stamp = |ts: &Option<DateTime<Utc>>| match ts {
        Some(ts) => ts.to_rfc3339(),
        None => "-".to_string(),
    };

    vec![
        format!("Total:  {}", stats.total_entries),
        format!("Today:  {}", stats.today_entries),
        format!("Oldest: {}", stamp(&stats.oldest_entry)),
        format!("Newest: {}", stamp(&stats.newest_entry)),
    ]
}

/// Writes an export document and returns where it went.
pub async fn export_to<S: KeyValueStore>(
    history: &HistoryStore<S>,
    target: Option<&Path>,
    now: DateTime<Utc>,
) -> AppResult<PathBuf> {
    let (file_name, json) = history.export_file(now)?;

    let path = match target {
        Some(target) if is_dir(target).await => target.join(&file_name),
        Some(target) => target.to_path_buf(),
        None => PathBuf::from(&file_name),
    };

    tokio::fs::write(&path, json).await?;
    info!(path = %path.display(), entries = history.entries().len(), "History exported");
    Ok(path)
}

/// Imports an export document from disk. Returns the number of entries read.
pub async fn import_from<S: KeyValueStore>(
    history: &mut HistoryStore<S>,
    path: &Path,
) -> AppResult<usize> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(history.try_import(&contents).await?)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use calcpad_db::MemoryKeyValueStore;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "calcpad-{}-{}",
            name,
            calcpad_core::generate_entry_id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_entries(Vec::<&HistoryEntry>::new()), vec!["No history"]);
    }

    #[test]
    fn test_render_entries() {
        let entry = HistoryEntry::new("2 + 3", "5", Utc::now());
        let lines = render_entries([&entry]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("2 + 3 = 5"));
        assert!(lines[0].ends_with(&format!("[{}]", entry.id)));
    }

    #[test]
    fn test_render_stats_empty() {
        let stats = HistoryStats {
            total_entries: 0,
            today_entries: 0,
            oldest_entry: None,
            newest_entry: None,
        };
        let lines = render_stats(&stats);
        assert_eq!(lines[0], "Total:  0");
        assert_eq!(lines[3], "Newest: -");
    }

    #[tokio::test]
    async fn test_export_then_import() {
        let dir = scratch_dir("export");
        let mut source = HistoryStore::open(MemoryKeyValueStore::new(), 50).await;
        source.append("2 + 3", "5").await;
        source.append("10 ÷ 4", "2.5").await;

        let now = Utc::now();
        let path = export_to(&source, Some(&dir), now).await.unwrap();
        assert_eq!(path, dir.join(calcpad_core::history::export_file_name(now)));

        let mut target = HistoryStore::open(MemoryKeyValueStore::new(), 50).await;
        assert_eq!(import_from(&mut target, &path).await.unwrap(), 2);
        let pairs: Vec<(&str, &str)> = target
            .entries()
            .iter()
            .map(|e| (e.equation.as_str(), e.result.as_str()))
            .collect();
        assert_eq!(pairs, vec![("10 ÷ 4", "2.5"), ("2 + 3", "5")]);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn test_import_rejects_bad_files() {
        let dir = scratch_dir("import");
        let mut history = HistoryStore::open(MemoryKeyValueStore::new(), 50).await;

        let missing = import_from(&mut history, &dir.join("missing.json")).await;
        assert!(matches!(missing, Err(AppError::Io(_))));

        let bogus = dir.join("bogus.json");
        std::fs::write(&bogus, "{\"version\": \"1.0\"}").unwrap();
        let rejected = import_from(&mut history, &bogus).await;
        assert!(matches!(rejected, Err(AppError::History(_))));
        assert!(history.entries().is_empty());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
