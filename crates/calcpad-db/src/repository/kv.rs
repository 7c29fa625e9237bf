//! # SQLite Key-Value Store
//!
//! [`KeyValueStore`] over the `key_value_store` table.
//!
//! ```text
//! key_value_store
//! ┌──────────────────────┬──────────────────────────┬──────────────────────────┐
//! │ key (PK)             │ value                    │ updated_at               │
//! ├──────────────────────┼──────────────────────────┼──────────────────────────┤
//! │ calculator-history   │ [{"id":"…", …}, …]       │ 2024-06-01T12:00:00Z     │
//! └──────────────────────┴──────────────────────────┴──────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::KeyValueStore;
use crate::error::DbResult;

/// Repository for the `key_value_store` table.
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteKeyValueStore { pool }
    }

    /// Lists every key, sorted.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>("SELECT key FROM key_value_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM key_value_store WHERE key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing key");

        sqlx::query(
            r#"
            INSERT INTO key_value_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM key_value_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
