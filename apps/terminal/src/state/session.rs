//! # Session State
//!
//! One calculator, its history and its keyboard adapter, owned together.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  press(token) ─────────────────────────────┐                           │
//! │                                             ▼                           │
//! │  handle_key(event)                    Calculator::press                 │
//! │     │                                       │                           │
//! │     ▼                                       │ Some(CalculationCompleted)│
//! │  KeyboardAdapter ── listener ──► mpsc ──► drain()                       │
//! │     │                                       │                           │
//! │     └─ Paste ──► Clipboard::read_text       ▼                           │
//! │                   └─► dispatch_paste   HistoryStore::record (persisted) │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each input runs to completion, including its history write, before the
//! next one is taken.

use calcpad_core::format::format_history_entry;
use calcpad_core::{
    ButtonToken, Calculator, CalculatorState, HistoryEntry, KeyAction, KeyEvent, KeyOutcome,
    KeyboardAdapter, Subscription,
};
use calcpad_db::{HistoryStore, KeyValueStore};
use tokio::sync::mpsc;
use tracing::debug;

use super::config::AppConfig;
use crate::clipboard::Clipboard;

/// The host's calculator session.
#[derive(Debug)]
pub struct Session<S, C> {
    calculator: Calculator,
    history: HistoryStore<S>,
    keyboard: KeyboardAdapter,
    pressed: mpsc::UnboundedReceiver<ButtonToken>,
    _subscription: Subscription,
    clipboard: C,
}

impl<S: KeyValueStore, C: Clipboard> Session<S, C> {
    pub fn new(config: &AppConfig, history: HistoryStore<S>, clipboard: C) -> Self {
        let keyboard = KeyboardAdapter::new(config.keyboard_enabled)
            .with_max_digits(config.calculator.max_digits);
        let (tx, pressed) = mpsc::unbounded_channel();
        let subscription = keyboard.subscribe(move |token| {
            // The receiver lives as long as the session
            let _ = tx.send(token);
        });

        Session {
            calculator: Calculator::new(config.calculator),
            history,
            keyboard,
            pressed,
            _subscription: subscription,
            clipboard,
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Presses one button. Returns the history entry an `=` produced.
    pub async fn press(&mut self, token: ButtonToken) -> Option<HistoryEntry> {
        let completed = self.calculator.press(token)?;
        debug!(equation = %completed.equation, result = %completed.result, "Calculation completed");
        Some(self.history.record(&completed).await)
    }

    /// Routes a key event through the keyboard adapter.
    ///
    /// A paste shortcut reads the clipboard before the outcome is returned.
    pub async fn handle_key(&mut self, event: &KeyEvent) -> KeyOutcome {
        let outcome = self.keyboard.handle_key(event);
        if outcome.action == KeyAction::Paste {
            self.paste().await;
        }
        self.drain().await;
        outcome
    }

    /// Types the clipboard contents as a number.
    ///
    /// Returns false when the clipboard is empty or unreadable, or holds
    /// something other than a number the display can take.
    pub async fn paste(&mut self) -> bool {
        let Some(text) = self.clipboard.read_text().await else {
            return false;
        };
        let accepted = self.keyboard.dispatch_paste(&text);
        if !accepted {
            debug!(text = %text, "Ignoring paste that is not a typeable number");
        }
        self.drain().await;
        accepted
    }

    /// Applies the buttons the keyboard listener queued.
    async fn drain(&mut self) {
        while let Ok(token) = self.pressed.try_recv() {
            self.press(token).await;
        }
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    /// Copies the current display.
    pub async fn copy_display(&self) -> bool {
        self.clipboard.write_text(self.calculator.display()).await
    }

    /// Copies a history entry as `equation = result`.
    pub async fn copy_entry(&self, id: &str) -> bool {
        let Some(entry) = self.history.get(id) else {
            return false;
        };
        let text = format_history_entry(&entry.equation, &entry.result);
        self.clipboard.write_text(&text).await
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &CalculatorState {
        self.calculator.state()
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore<S> {
        &mut self.history
    }

    pub fn keyboard(&self) -> &KeyboardAdapter {
        &self.keyboard
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use calcpad_db::{Database, DbConfig, MemoryKeyValueStore, HISTORY_STORAGE_KEY};

    async fn session() -> Session<MemoryKeyValueStore, MemoryClipboard> {
        session_with(MemoryClipboard::new()).await
    }

    async fn session_with(clipboard: MemoryClipboard) -> Session<MemoryKeyValueStore, MemoryClipboard> {
        let history = HistoryStore::open(MemoryKeyValueStore::new(), 50).await;
        Session::new(&AppConfig::default(), history, clipboard)
    }

    async fn press_keys<S: KeyValueStore>(session: &mut Session<S, MemoryClipboard>, keys: &str) {
        for key in keys.chars() {
            session.handle_key(&KeyEvent::new(key.to_string())).await;
        }
    }

    #[tokio::test]
    async fn test_buttons_record_history() {
        let mut session = session().await;
        for token in ["2", "+", "3", "="] {
            session.press(token.parse().unwrap()).await;
        }

        assert_eq!(session.state().display, "5");
        let entries = session.history().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].equation, "2 + 3");
        assert_eq!(entries[0].result, "5");
    }

    #[tokio::test]
    async fn test_keys_drive_calculator() {
        let mut session = session().await;
        press_keys(&mut session, "2+3*4").await;
        let outcome = session.handle_key(&KeyEvent::new("Enter")).await;

        assert!(outcome.prevent_default);
        assert_eq!(session.state().display, "20");
        assert_eq!(session.history().entries()[0].equation, "5 × 4");
    }

    #[tokio::test]
    async fn test_unmapped_key_is_ignored() {
        let mut session = session().await;
        let outcome = session.handle_key(&KeyEvent::new("x")).await;

        assert!(!outcome.prevent_default);
        assert_eq!(outcome.action, KeyAction::Ignored);
        assert_eq!(session.state().display, "0");
    }

    #[tokio::test]
    async fn test_paste_shortcut_types_number() {
        let mut session = session_with(MemoryClipboard::with_text(" -12.5 ")).await;
        press_keys(&mut session, "9").await;

        let outcome = session.handle_key(&KeyEvent::new("v").with_ctrl()).await;
        assert_eq!(outcome.action, KeyAction::Paste);
        assert_eq!(session.state().display, "-12.5");
    }

    #[tokio::test]
    async fn test_paste_rejects_text() {
        let mut session = session_with(MemoryClipboard::with_text("hello")).await;
        press_keys(&mut session, "42").await;

        assert!(!session.paste().await);
        assert_eq!(session.state().display, "42");
    }

    #[tokio::test]
    async fn test_paste_rejects_number_over_digit_cap() {
        let mut session = session_with(MemoryClipboard::with_text("98765432109876")).await;
        press_keys(&mut session, "42").await;

        assert!(!session.paste().await);
        assert_eq!(session.state().display, "42");
    }

    #[tokio::test]
    async fn test_disabled_keyboard_ignores_keys() {
        let config = AppConfig {
            keyboard_enabled: false,
            ..AppConfig::default()
        };
        let history = HistoryStore::open(MemoryKeyValueStore::new(), 50).await;
        let mut session = Session::new(&config, history, MemoryClipboard::with_text("7"));

        session.handle_key(&KeyEvent::new("5")).await;
        assert!(!session.paste().await);
        assert_eq!(session.state().display, "0");

        session.press(ButtonToken::Digit(5)).await;
        assert_eq!(session.state().display, "5");
    }

    #[tokio::test]
    async fn test_copy_display_and_entry() {
        let clipboard = MemoryClipboard::new();
        let mut session = session_with(clipboard.clone()).await;
        for token in ["6", "*", "7", "="] {
            session.press(token.parse().unwrap()).await;
        }

        assert!(session.copy_display().await);
        assert_eq!(clipboard.contents().as_deref(), Some("42"));

        let id = session.history().entries()[0].id.clone();
        assert!(session.copy_entry(&id).await);
        assert_eq!(clipboard.contents().as_deref(), Some("6 × 7 = 42"));
        assert!(!session.copy_entry("missing").await);
    }

    #[tokio::test]
    async fn test_history_persists_across_sessions() {
        let kv = MemoryKeyValueStore::new();
        let history = HistoryStore::open(kv.clone(), 50).await;
        let mut session = Session::new(&AppConfig::default(), history, MemoryClipboard::new());
        for token in ["9", "√"] {
            session.press(token.parse().unwrap()).await;
        }
        for token in ["8", "-", "2", "="] {
            session.press(token.parse().unwrap()).await;
        }
        assert!(kv.snapshot(HISTORY_STORAGE_KEY).is_some());

        let reopened = HistoryStore::open(kv, 50).await;
        assert_eq!(reopened.entries().len(), 1);
        assert_eq!(reopened.entries()[0].result, "6");
    }

    #[tokio::test]
    async fn test_sqlite_backed_session() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let history = HistoryStore::open(db.key_values(), 50).await;
        let mut session = Session::new(&AppConfig::default(), history, MemoryClipboard::new());
        press_keys(&mut session, "1+1=").await;

        let reopened = HistoryStore::open(db.key_values(), 50).await;
        assert_eq!(reopened.entries()[0].equation, "1 + 1");
    }
}
