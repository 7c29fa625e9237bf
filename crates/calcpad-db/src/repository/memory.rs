//! # In-Memory Key-Value Store
//!
//! A [`KeyValueStore`] backed by a `HashMap`. Clones share the same map, so
//! a test can keep a handle and inspect what a `HistoryStore` wrote.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::KeyValueStore;
use crate::error::{DbError, DbResult};

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    read_only: Arc<AtomicBool>,
    unreadable: Arc<AtomicBool>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `key = value`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.lock().insert(key.to_string(), value.to_string());
        store
    }

    /// While read-only, `set` and `remove` fail with [`DbError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// While unreadable, `get` fails with [`DbError::QueryFailed`].
    pub fn set_unreadable(&self, unreadable: bool) {
        self.unreadable.store(unreadable, Ordering::SeqCst);
    }

    /// Synchronous peek for assertions.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> DbResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(DbError::ReadOnly);
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        if self.unreadable.load(Ordering::SeqCst) {
            return Err(DbError::QueryFailed(format!("cannot read {}", key)));
        }
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.check_writable()?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<bool> {
        self.check_writable()?;
        Ok(self.lock().remove(key).is_some())
    }
}
