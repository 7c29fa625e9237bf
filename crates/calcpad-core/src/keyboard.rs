//! # Keyboard Adapter
//!
//! Maps host key events onto [`ButtonToken`]s and fans them out to
//! subscribed listeners.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   host key event ──► resolve() ──► KeyOutcome { prevent_default, … }   │
//! │                                          │                              │
//! │                     ┌────────────────────┼──────────────────┐           │
//! │                     ▼                    ▼                  ▼           │
//! │              Press(token)             Paste             Ignored         │
//! │                     │                    │                              │
//! │                     │        host reads clipboard,                      │
//! │                     │        calls dispatch_paste(text)                 │
//! │                     ▼                    ▼                              │
//! │              listeners ◄──── AC, digits, ".", "+/-"                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Subscriptions
//! [`KeyboardAdapter::subscribe`] returns a [`Subscription`] handle. The
//! listener stays attached for as long as the handle lives; dropping it (or
//! calling [`Subscription::unsubscribe`]) detaches the listener.
//!
//! Listeners run while the adapter's registry is locked, so a listener
//! must not subscribe or drop a subscription on the same adapter.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::Serialize;

use crate::arithmetic::parse_calculator_input;
use crate::types::{ButtonToken, Operation};
use crate::validation::{is_valid_keyboard_input, is_valid_number_input, map_keyboard_input};
use crate::DEFAULT_MAX_DIGITS;

// =============================================================================
// Key Events
// =============================================================================

/// A key press as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key name (`"7"`, `"Enter"`, `"F9"`, `"v"`).
    pub key: String,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
    /// The host has selected text, so `Ctrl+C` belongs to copy.
    pub has_selection: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        KeyEvent {
            key: key.into(),
            ctrl: false,
            meta: false,
            has_selection: false,
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_selection(mut self) -> Self {
        self.has_selection = true;
        self
    }

    fn is_command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What a key event means for the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press(ButtonToken),
    /// The host should read the clipboard and call
    /// [`KeyboardAdapter::dispatch_paste`].
    Paste,
    Ignored,
}

/// Result of handling one key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    /// The host should suppress its default handling of the key.
    pub prevent_default: bool,
    pub action: KeyAction,
}

impl KeyOutcome {
    const IGNORED: KeyOutcome = KeyOutcome {
        prevent_default: false,
        action: KeyAction::Ignored,
    };

    fn claimed(action: KeyAction) -> Self {
        KeyOutcome {
            prevent_default: true,
            action,
        }
    }
}

/// Resolves a key event without side effects.
///
/// ## Mapping
/// ```text
/// Ctrl/Cmd + a   → AC
/// Ctrl/Cmd + c   → C, or ignored while text is selected
/// Ctrl/Cmd + v   → Paste
/// F9             → +/-
/// F12            → √
/// other          → validation::map_keyboard_input
/// ```
pub fn resolve(event: &KeyEvent) -> KeyOutcome {
    if event.is_command() {
        return match event.key.as_str() {
            "a" => KeyOutcome::claimed(KeyAction::Press(ButtonToken::AllClear)),
            "c" if event.has_selection => KeyOutcome::IGNORED,
            "c" => KeyOutcome::claimed(KeyAction::Press(ButtonToken::Clear)),
            "v" => KeyOutcome::claimed(KeyAction::Paste),
            _ => KeyOutcome::IGNORED,
        };
    }

    match event.key.as_str() {
        "F9" => KeyOutcome::claimed(KeyAction::Press(ButtonToken::ToggleSign)),
        "F12" => KeyOutcome::claimed(KeyAction::Press(ButtonToken::Operator(
            Operation::SquareRoot,
        ))),
        key => KeyOutcome {
            prevent_default: is_valid_keyboard_input(key),
            action: map_keyboard_input(key)
                .map(KeyAction::Press)
                .unwrap_or(KeyAction::Ignored),
        },
    }
}

/// Converts pasted text into the presses that type it.
///
/// Returns `None` unless the trimmed text is a finite number of at most
/// `max_digits` digits. The sequence starts with `AC`, types the
/// magnitude, then toggles the sign for negative numbers.
pub fn paste_tokens(text: &str, max_digits: usize) -> Option<Vec<ButtonToken>> {
    let value = parse_calculator_input(text).ok()?;
    let magnitude = value.abs().to_string();
    if !is_valid_number_input(&magnitude, max_digits) {
        return None;
    }

    let mut tokens = vec![ButtonToken::AllClear];
    for ch in magnitude.chars() {
        match ch {
            '0'..='9' => tokens.push(ButtonToken::Digit(ch as u8 - b'0')),
            '.' => tokens.push(ButtonToken::Decimal),
            _ => {}
        }
    }
    if value < 0.0 {
        tokens.push(ButtonToken::ToggleSign);
    }
    Some(tokens)
}

// =============================================================================
// Shortcuts
// =============================================================================

/// One line of the keyboard help screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortcut {
    pub keys: &'static str,
    pub description: &'static str,
}

const SHORTCUTS: &[Shortcut] = &[
    Shortcut { keys: "Numbers (0-9)", description: "Input digits" },
    Shortcut { keys: "Operators (+, -, *, /)", description: "Mathematical operations" },
    Shortcut { keys: "%", description: "Percentage" },
    Shortcut { keys: "= or Enter", description: "Calculate result" },
    Shortcut { keys: ". (period)", description: "Decimal point" },
    Shortcut { keys: "Backspace", description: "Clear current entry" },
    Shortcut { keys: "Delete or Escape", description: "All clear" },
    Shortcut { keys: "Ctrl/Cmd + A", description: "All clear" },
    Shortcut { keys: "Ctrl/Cmd + C", description: "Clear (when no text selected)" },
    Shortcut { keys: "Ctrl/Cmd + V", description: "Paste number" },
    Shortcut { keys: "F9", description: "Toggle sign (+/-)" },
    Shortcut { keys: "F12", description: "Square root" },
];

// =============================================================================
// Adapter
// =============================================================================

type Listener = Box<dyn FnMut(ButtonToken) + Send>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Dispatches resolved key events to subscribed listeners.
pub struct KeyboardAdapter {
    registry: Arc<Mutex<Registry>>,
    enabled: bool,
    max_digits: usize,
}

impl Default for KeyboardAdapter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl fmt::Debug for KeyboardAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardAdapter")
            .field("enabled", &self.enabled)
            .field("max_digits", &self.max_digits)
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl KeyboardAdapter {
    pub fn new(enabled: bool) -> Self {
        KeyboardAdapter {
            registry: Arc::new(Mutex::new(Registry::default())),
            enabled,
            max_digits: DEFAULT_MAX_DIGITS,
        }
    }

    /// Caps the numbers a paste may type, matching the calculator's digit cap.
    pub fn with_max_digits(mut self, max_digits: usize) -> Self {
        self.max_digits = max_digits;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A disabled adapter ignores every key and paste.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Attaches `listener` until the returned handle is dropped.
    #[must_use = "dropping the Subscription detaches the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(ButtonToken) + Send + 'static,
    {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Handles one key event, notifying listeners of any button press.
    ///
    /// A [`KeyAction::Paste`] outcome is left to the host, which owns the
    /// clipboard.
    pub fn handle_key(&self, event: &KeyEvent) -> KeyOutcome {
        if !self.enabled {
            return KeyOutcome::IGNORED;
        }
        let outcome = resolve(event);
        if let KeyAction::Press(token) = outcome.action {
            self.emit(token);
        }
        outcome
    }

    /// Types pasted text into the listeners.
    ///
    /// Returns false when the adapter is disabled, the text is not a number
    /// or the number has more digits than the calculator accepts.
    pub fn dispatch_paste(&self, text: &str) -> bool {
        if !self.enabled {
            return false;
        }
        match paste_tokens(text, self.max_digits) {
            Some(tokens) => {
                tokens.into_iter().for_each(|t| self.emit(t));
                true
            }
            None => false,
        }
    }

    /// Help text for the keyboard shortcuts.
    pub fn shortcuts(&self) -> &'static [Shortcut] {
        SHORTCUTS
    }

    fn emit(&self, token: ButtonToken) {
        let mut registry = self.lock();
        for (_, listener) in registry.listeners.iter_mut() {
            listener(token);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a listener attached to a [`KeyboardAdapter`].
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Detaches the listener now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(adapter: &KeyboardAdapter) -> (Subscription, Arc<Mutex<Vec<ButtonToken>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = adapter.subscribe(move |t| sink.lock().unwrap().push(t));
        (sub, seen)
    }

    #[test]
    fn test_resolve_plain_keys() {
        let outcome = resolve(&KeyEvent::new("7"));
        assert!(outcome.prevent_default);
        assert_eq!(outcome.action, KeyAction::Press(ButtonToken::Digit(7)));

        let outcome = resolve(&KeyEvent::new("Escape"));
        assert_eq!(outcome.action, KeyAction::Press(ButtonToken::AllClear));

        let outcome = resolve(&KeyEvent::new("q"));
        assert!(!outcome.prevent_default);
        assert_eq!(outcome.action, KeyAction::Ignored);
    }

    #[test]
    fn test_resolve_command_combos() {
        let outcome = resolve(&KeyEvent::new("a").with_ctrl());
        assert_eq!(outcome, KeyOutcome::claimed(KeyAction::Press(ButtonToken::AllClear)));

        let outcome = resolve(&KeyEvent::new("c").with_meta());
        assert_eq!(outcome.action, KeyAction::Press(ButtonToken::Clear));

        let outcome = resolve(&KeyEvent::new("c").with_ctrl().with_selection());
        assert_eq!(outcome, KeyOutcome::IGNORED);

        let outcome = resolve(&KeyEvent::new("v").with_ctrl());
        assert_eq!(outcome, KeyOutcome::claimed(KeyAction::Paste));

        // Other combos stay with the host
        assert_eq!(resolve(&KeyEvent::new("r").with_ctrl()), KeyOutcome::IGNORED);
    }

    #[test]
    fn test_resolve_function_keys() {
        assert_eq!(
            resolve(&KeyEvent::new("F9")).action,
            KeyAction::Press(ButtonToken::ToggleSign)
        );
        assert_eq!(
            resolve(&KeyEvent::new("F12")).action,
            KeyAction::Press(ButtonToken::Operator(Operation::SquareRoot))
        );
    }

    #[test]
    fn test_paste_tokens() {
        assert_eq!(
            paste_tokens(" -3.5\n", 12).unwrap(),
            vec![
                ButtonToken::AllClear,
                ButtonToken::Digit(3),
                ButtonToken::Decimal,
                ButtonToken::Digit(5),
                ButtonToken::ToggleSign,
            ]
        );
        assert_eq!(
            paste_tokens("42", 12).unwrap(),
            vec![ButtonToken::AllClear, ButtonToken::Digit(4), ButtonToken::Digit(2)]
        );
        assert_eq!(paste_tokens("hello", 12), None);
        assert_eq!(paste_tokens("", 12), None);
    }

    #[test]
    fn test_paste_tokens_respects_digit_cap() {
        assert_eq!(paste_tokens("1234567890123", 12), None);
        assert_eq!(paste_tokens("1e20", 12), None);
        assert_eq!(paste_tokens("-12345.6", 6).map(|t| t.len()), Some(9));
        assert_eq!(paste_tokens("-12345.67", 6), None);
    }

    #[test]
    fn test_dispatch_paste_rejects_long_numbers() {
        let adapter = KeyboardAdapter::default().with_max_digits(4);
        let (_sub, seen) = recording(&adapter);

        assert!(!adapter.dispatch_paste("12345"));
        assert!(seen.lock().unwrap().is_empty());

        assert!(adapter.dispatch_paste("1234"));
        assert_eq!(seen.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_listeners_receive_presses() {
        let adapter = KeyboardAdapter::default();
        let (_sub, seen) = recording(&adapter);

        adapter.handle_key(&KeyEvent::new("1"));
        adapter.handle_key(&KeyEvent::new("+"));
        adapter.handle_key(&KeyEvent::new("Enter"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ButtonToken::Digit(1),
                ButtonToken::Operator(Operation::Add),
                ButtonToken::Equals,
            ]
        );
    }

    #[test]
    fn test_dropping_subscription_detaches() {
        let adapter = KeyboardAdapter::default();
        let (sub, seen) = recording(&adapter);
        assert_eq!(adapter.listener_count(), 1);

        drop(sub);
        assert_eq!(adapter.listener_count(), 0);

        adapter.handle_key(&KeyEvent::new("5"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe_leaves_other_listeners() {
        let adapter = KeyboardAdapter::default();
        let (first, first_seen) = recording(&adapter);
        let (_second, second_seen) = recording(&adapter);

        first.unsubscribe();
        adapter.handle_key(&KeyEvent::new("9"));

        assert!(first_seen.lock().unwrap().is_empty());
        assert_eq!(*second_seen.lock().unwrap(), vec![ButtonToken::Digit(9)]);
    }

    #[test]
    fn test_disabled_adapter_ignores_input() {
        let mut adapter = KeyboardAdapter::new(false);
        let (_sub, seen) = recording(&adapter);

        assert_eq!(adapter.handle_key(&KeyEvent::new("5")), KeyOutcome::IGNORED);
        assert!(!adapter.dispatch_paste("12"));
        assert!(seen.lock().unwrap().is_empty());

        adapter.set_enabled(true);
        assert!(adapter.dispatch_paste("12"));
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_paste_key_is_left_to_host() {
        let adapter = KeyboardAdapter::default();
        let (_sub, seen) = recording(&adapter);

        let outcome = adapter.handle_key(&KeyEvent::new("v").with_ctrl());
        assert_eq!(outcome.action, KeyAction::Paste);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_shortcuts_list() {
        let adapter = KeyboardAdapter::default();
        let shortcuts = adapter.shortcuts();
        assert_eq!(shortcuts.len(), 12);
        assert!(shortcuts.iter().any(|s| s.keys == "F12" && s.description == "Square root"));
    }

    #[test]
    fn test_subscription_outlives_adapter() {
        let adapter = KeyboardAdapter::default();
        let (sub, _seen) = recording(&adapter);
        drop(adapter);
        drop(sub);
    }
}
