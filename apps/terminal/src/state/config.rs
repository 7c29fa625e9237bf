//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CALCPAD_*`)
//! 2. Defaults (this file)
//!
//! Read-only after initialization.

use std::path::PathBuf;

use calcpad_core::CalculatorConfig;
use tracing::warn;

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Digit cap, history size, precision and storage switch.
    pub calculator: CalculatorConfig,

    /// Explicit database file. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Route key names through the keyboard adapter.
    pub keyboard_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            calculator: CalculatorConfig::default(),
            db_path: None,
            keyboard_enabled: true,
        }
    }
}

impl AppConfig {
    /// Creates a new AppConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `CALCPAD_MAX_DIGITS`: digit cap (positive integer)
    /// - `CALCPAD_MAX_HISTORY`: history capacity (positive integer)
    /// - `CALCPAD_DECIMAL_PLACES`: rounding precision (0 to 15)
    /// - `CALCPAD_USE_LOCAL_STORAGE`: persist history (`true`/`false`)
    /// - `CALCPAD_DB_PATH`: database file override
    /// - `CALCPAD_KEYBOARD`: enable key names (`true`/`false`)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(raw) = lookup("CALCPAD_MAX_DIGITS") {
            match parse_positive(&raw) {
                Some(digits) => config.calculator.max_digits = digits,
                None => ignored("CALCPAD_MAX_DIGITS", &raw),
            }
        }

        if let Some(raw) = lookup("CALCPAD_MAX_HISTORY") {
            match parse_positive(&raw) {
                Some(items) => config.calculator.max_history = items,
                None => ignored("CALCPAD_MAX_HISTORY", &raw),
            }
        }

        if let Some(raw) = lookup("CALCPAD_DECIMAL_PLACES") {
            match raw.trim().parse::<i32>() {
                Ok(places) if (0..=15).contains(&places) => {
                    config.calculator.decimal_places = places
                }
                _ => ignored("CALCPAD_DECIMAL_PLACES", &raw),
            }
        }

        if let Some(raw) = lookup("CALCPAD_USE_LOCAL_STORAGE") {
            match parse_flag(&raw) {
                Some(flag) => config.calculator.use_local_storage = flag,
                None => ignored("CALCPAD_USE_LOCAL_STORAGE", &raw),
            }
        }

        if let Some(raw) = lookup("CALCPAD_DB_PATH") {
            if !raw.trim().is_empty() {
                config.db_path = Some(PathBuf::from(raw));
            }
        }

        if let Some(raw) = lookup("CALCPAD_KEYBOARD") {
            match parse_flag(&raw) {
                Some(flag) => config.keyboard_enabled = flag,
                None => ignored("CALCPAD_KEYBOARD", &raw),
            }
        }

        config
    }
}

fn parse_positive(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn ignored(name: &str, raw: &str) {
    warn!(variable = name, value = raw, "Ignoring unparseable setting");
}
