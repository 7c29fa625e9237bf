//! # Clipboard Boundary
//!
//! Single awaited calls into the system clipboard with a boolean outcome.
//! Failures are logged and never retried.
//!
//! `arboard` is blocking, so each call runs on the blocking pool.

use std::future::Future;

use tracing::{debug, warn};

/// Text clipboard used by the session for copy and paste.
pub trait Clipboard {
    /// Reads the clipboard text. `None` when empty or unavailable.
    fn read_text(&self) -> impl Future<Output = Option<String>>;

    /// Replaces the clipboard text. Returns false on failure.
    fn write_text(&self, text: &str) -> impl Future<Output = bool>;
}

/// The system clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    async fn read_text(&self) -> Option<String> {
        let result = tokio::task::spawn_blocking(|| -> Result<String, arboard::Error> {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.get_text()
        })
        .await;

        match result {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to read clipboard");
                None
            }
            Err(e) => {
                warn!(error = %e, "Clipboard task failed");
                None
            }
        }
    }

    async fn write_text(&self, text: &str) -> bool {
        let text = text.to_string();
        let result = tokio::task::spawn_blocking(move || -> Result<(), arboard::Error> {
            let mut clipboard = arboard::Clipboard::new()?;
            clipboard.set_text(text)
        })
        .await;

        match result {
            Ok(Ok(())) => {
                debug!("Copied to clipboard");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to write clipboard");
                false
            }
            Err(e) => {
                warn!(error = %e, "Clipboard task failed");
                false
            }
        }
    }
}

/// In-process clipboard for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: std::sync::Arc<std::sync::Mutex<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        let clipboard = Self::new();
        *clipboard.lock() = Some(text.to_string());
        clipboard
    }

    pub fn contents(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.text
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Clipboard for MemoryClipboard {
    async fn read_text(&self) -> Option<String> {
        self.contents()
    }

    async fn write_text(&self, text: &str) -> bool {
        *self.lock() = Some(text.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_clipboard_round_trip() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.read_text().await, None);

        assert!(clipboard.write_text("2 + 3 = 5").await);
        assert_eq!(clipboard.read_text().await.as_deref(), Some("2 + 3 = 5"));

        let shared = clipboard.clone();
        assert_eq!(shared.contents().as_deref(), Some("2 + 3 = 5"));
    }
}
