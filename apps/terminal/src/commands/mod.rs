//! # Commands Module
//!
//! Turns input lines into session calls and renders the result.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (line parsing, dispatch, display)
//! └── history.rs  ◄─── History listing, stats, export/import files
//! ```
//!
//! ## How a Line Is Read
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ":history"        ──► Command      (leading colon)                     │
//! │  "AC", "M+", "√"   ──► Button       (one button label)                  │
//! │  "Enter", "ctrl+v" ──► Key          (key name, optional modifier)       │
//! │  "12+3="           ──► Keys         (every character typed as a key)    │
//! │                                                                         │
//! │  Button ──► Session::press                                              │
//! │  Key(s) ──► Session::handle_key ──► KeyboardAdapter                     │
//! │                                                                         │
//! │  After every line the display is rendered:                              │
//! │      2 + 3 = 5                                                          │
//! │      > 5                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod history;

use std::path::PathBuf;

use calcpad_core::{ButtonToken, CalculatorState, KeyEvent};
use calcpad_db::KeyValueStore;
use chrono::Utc;
use tracing::{debug, warn};

use crate::clipboard::Clipboard;
use crate::error::{AppError, AppResult};
use crate::state::Session;

// =============================================================================
// Parsed Input
// =============================================================================

/// One input line, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Empty,
    Command(Command),
    Button(ButtonToken),
    Key(KeyEvent),
    Keys(Vec<KeyEvent>),
}

/// Colon commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    State,
    History,
    Search(String),
    Remove(String),
    ClearHistory,
    Stats,
    Export(Option<PathBuf>),
    Import(PathBuf),
    /// Copies an entry by id, or the display.
    Copy(Option<String>),
    Paste,
    Shortcuts,
    Quit,
}

const HELP: &[&str] = &[
    "Buttons:  0-9 + - * / % √ ^ = . C AC +/- MC MR MS M+ M-",
    "Keys:     Enter Escape Backspace Delete F9 F12 ctrl+a ctrl+c ctrl+v",
    "Typing:   any other line is typed key by key, e.g. 12+3=",
    ":history            list entries, newest first",
    ":search <text>      filter entries",
    ":remove <id>        delete an entry",
    ":clear-history      delete all entries",
    ":stats              history statistics",
    ":export [path]      write an export file",
    ":import <path>      read an export file",
    ":copy [id]          copy the display or an entry",
    ":paste              paste a number",
    ":state              calculator state as JSON",
    ":shortcuts          keyboard shortcuts",
    ":quit",
];

/// Classifies one input line.
pub fn parse_line(line: &str) -> AppResult<Input> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Input::Empty);
    }
    if let Some(command) = trimmed.strip_prefix(':') {
        return parse_command(command).map(Input::Command);
    }
    if let Ok(token) = trimmed.parse::<ButtonToken>() {
        return Ok(Input::Button(token));
    }
    if let Some(event) = parse_key(trimmed) {
        return Ok(Input::Key(event));
    }

    Ok(Input::Keys(
        trimmed
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| KeyEvent::new(c.to_string()))
            .collect(),
    ))
}

fn parse_command(command: &str) -> AppResult<Command> {
    let (name, rest) = match command.split_once(' ') {
        Some((name, rest)) => (name, Some(rest)),
        None => (command, None),
    };
    let argument = rest.map(str::trim).filter(|r| !r.is_empty());

    let parsed = match name {
        "help" | "h" => Command::Help,
        "state" => Command::State,
        "history" => Command::History,
        // The query is passed on untrimmed
        "search" => Command::Search(rest.unwrap_or_default().to_string()),
        "remove" => Command::Remove(
            argument
                .ok_or(AppError::Usage(":remove <id>"))?
                .to_string(),
        ),
        "clear-history" => Command::ClearHistory,
        "stats" => Command::Stats,
        "export" => Command::Export(argument.map(PathBuf::from)),
        "import" => Command::Import(PathBuf::from(
            argument.ok_or(AppError::Usage(":import <path>"))?,
        )),
        "copy" => Command::Copy(argument.map(str::to_string)),
        "paste" => Command::Paste,
        "shortcuts" => Command::Shortcuts,
        "quit" | "q" | "exit" => Command::Quit,
        _ => return Err(AppError::UnknownCommand(format!(":{}", command))),
    };
    Ok(parsed)
}

/// Parses a key name with optional `ctrl+`/`cmd+`/`meta+` prefixes.
fn parse_key(text: &str) -> Option<KeyEvent> {
    let mut rest = text;
    let mut ctrl = false;
    let mut meta = false;

    loop {
        let lower = rest.to_ascii_lowercase();
        if lower.starts_with("ctrl+") {
            ctrl = true;
            rest = &rest[5..];
        } else if lower.starts_with("cmd+") {
            meta = true;
            rest = &rest[4..];
        } else if lower.starts_with("meta+") {
            meta = true;
            rest = &rest[5..];
        } else {
            break;
        }
    }

    let key = if ctrl || meta {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_ascii_lowercase().to_string(),
            _ => return None,
        }
    } else {
        canonical_key_name(rest)?.to_string()
    };

    let mut event = KeyEvent::new(key);
    event.ctrl = ctrl;
    event.meta = meta;
    Some(event)
}

fn canonical_key_name(name: &str) -> Option<&'static str> {
    const NAMED: &[&str] = &["Enter", "Escape", "Backspace", "Delete", "F9", "F12"];
    NAMED
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(name))
}

// =============================================================================
// Dispatch
// =============================================================================

/// Output of one input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn from_lines(lines: Vec<String>) -> Self {
        Reply { lines, quit: false }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::from_lines(vec![line.into()])
    }
}

/// Parses and runs one line.
///
/// Errors from a single command are rendered, never returned.
pub async fn handle_line<S, C>(session: &mut Session<S, C>, line: &str) -> Reply
where
    S: KeyValueStore,
    C: Clipboard,
{
    match parse_line(line) {
        Ok(input) => execute(session, input).await,
        Err(e) => Reply::line(format!("error: {}", e)),
    }
}

/// Runs one classified input.
pub async fn execute<S, C>(session: &mut Session<S, C>, input: Input) -> Reply
where
    S: KeyValueStore,
    C: Clipboard,
{
    match input {
        Input::Empty => Reply::default(),
        Input::Command(command) => match run_command(session, command).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Command failed");
                Reply::line(format!("error: {}", e))
            }
        },
        Input::Button(token) => {
            debug!(%token, "Button");
            session.press(token).await;
            Reply::from_lines(render_display(session.state()))
        }
        Input::Key(event) => {
            session.handle_key(&event).await;
            Reply::from_lines(render_display(session.state()))
        }
        Input::Keys(events) => {
            for event in &events {
                session.handle_key(event).await;
            }
            Reply::from_lines(render_display(session.state()))
        }
    }
}

async fn run_command<S, C>(session: &mut Session<S, C>, command: Command) -> AppResult<Reply>
where
    S: KeyValueStore,
    C: Clipboard,
{
    let reply = match command {
        Command::Help => Reply::from_lines(HELP.iter().map(|l| l.to_string()).collect()),
        Command::State => Reply::line(serde_json::to_string_pretty(session.state())?),
        Command::History => Reply::from_lines(history::render_entries(session.history().entries())),
        Command::Search(query) => {
            Reply::from_lines(history::render_entries(session.history().search(&query)))
        }
        Command::Remove(id) => {
            if session.history_mut().remove(&id).await {
                Reply::line("Removed")
            } else {
                Reply::line(format!("No entry {}", id))
            }
        }
        Command::ClearHistory => {
            session.history_mut().clear().await;
            Reply::line("History cleared")
        }
        Command::Stats => Reply::from_lines(history::render_stats(&session.history().stats())),
        Command::Export(target) => {
            let path = history::export_to(session.history(), target.as_deref(), Utc::now()).await?;
            Reply::line(format!("Exported to {}", path.display()))
        }
        Command::Import(path) => {
            let count = history::import_from(session.history_mut(), &path).await?;
            Reply::line(format!("Imported {} entries", count))
        }
        Command::Copy(id) => {
            let copied = match id {
                Some(id) => session.copy_entry(&id).await,
                None => session.copy_display().await,
            };
            if !copied {
                return Err(AppError::Clipboard("nothing copied".to_string()));
            }
            Reply::line("Copied")
        }
        Command::Paste => {
            if !session.paste().await {
                return Err(AppError::Clipboard("clipboard does not hold a number".to_string()));
            }
            Reply::from_lines(render_display(session.state()))
        }
        Command::Shortcuts => Reply::from_lines(
            session
                .keyboard()
                .shortcuts()
                .iter()
                .map(|s| format!("{:<26} {}", s.keys, s.description))
                .collect(),
        ),
        Command::Quit => Reply {
            lines: Vec::new(),
            quit: true,
        },
    };
    Ok(reply)
}

/// Renders the equation trace, the display and any error.
pub fn render_display(state: &CalculatorState) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);
    if !state.equation.is_empty() {
        lines.push(format!("  {}", state.equation));
    }
    let display = if state.display.is_empty() { "0" } else { &state.display };
    lines.push(format!("> {}", display));
    if let Some(error) = &state.error {
        lines.push(format!("! {}", error));
    }
    lines
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::state::AppConfig;
    use calcpad_core::Operation;
    use calcpad_db::{HistoryStore, MemoryKeyValueStore};

    async fn session() -> Session<MemoryKeyValueStore, MemoryClipboard> {
        let history = HistoryStore::open(MemoryKeyValueStore::new(), 50).await;
        Session::new(&AppConfig::default(), history, MemoryClipboard::new())
    }

    async fn run(session: &mut Session<MemoryKeyValueStore, MemoryClipboard>, lines: &[&str]) -> Reply {
        let mut last = Reply::default();
        for line in lines {
            last = handle_line(session, line).await;
        }
        last
    }

    #[test]
    fn test_parse_buttons() {
        assert_eq!(parse_line("AC").unwrap(), Input::Button(ButtonToken::AllClear));
        assert_eq!(parse_line(" M+ ").unwrap(), Input::Button(ButtonToken::MemoryAdd));
        assert_eq!(
            parse_line("√").unwrap(),
            Input::Button(ButtonToken::Operator(Operation::SquareRoot))
        );
        assert_eq!(parse_line("7").unwrap(), Input::Button(ButtonToken::Digit(7)));
        assert_eq!(parse_line("   ").unwrap(), Input::Empty);
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!(parse_line("enter").unwrap(), Input::Key(KeyEvent::new("Enter")));
        assert_eq!(parse_line("F9").unwrap(), Input::Key(KeyEvent::new("F9")));
        assert_eq!(
            parse_line("ctrl+V").unwrap(),
            Input::Key(KeyEvent::new("v").with_ctrl())
        );
        assert_eq!(
            parse_line("cmd+a").unwrap(),
            Input::Key(KeyEvent::new("a").with_meta())
        );
        assert_eq!(
            parse_line("1 2").unwrap(),
            Input::Keys(vec![KeyEvent::new("1"), KeyEvent::new("2")])
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line(":history").unwrap(), Input::Command(Command::History));
        assert_eq!(
            parse_line(":search  2 +").unwrap(),
            Input::Command(Command::Search(" 2 +".to_string()))
        );
        assert_eq!(parse_line(":export").unwrap(), Input::Command(Command::Export(None)));
        assert_eq!(parse_line(":q").unwrap(), Input::Command(Command::Quit));
        assert!(matches!(parse_line(":import"), Err(AppError::Usage(_))));
        assert!(matches!(parse_line(":bogus"), Err(AppError::UnknownCommand(_))));
    }

    #[test]
    fn test_render_display() {
        let mut state = CalculatorState::default();
        assert_eq!(render_display(&state), vec!["> 0"]);

        state.display = "Error".to_string();
        state.equation = "5 ÷ 0".to_string();
        state.error = Some("Cannot divide by zero".to_string());
        assert_eq!(
            render_display(&state),
            vec!["  5 ÷ 0", "> Error", "! Cannot divide by zero"]
        );
    }

    #[tokio::test]
    async fn test_typed_expression() {
        let mut session = session().await;
        let reply = run(&mut session, &["12+3="]).await;
        assert_eq!(reply.lines, vec!["  12 + 3 = 15", "> 15"]);
        assert_eq!(session.history().entries().len(), 1);
    }

    #[tokio::test]
    async fn test_division_by_zero_then_recover() {
        let mut session = session().await;
        let reply = run(&mut session, &["5", "/", "0", "="]).await;
        assert!(reply.lines.contains(&"! Cannot divide by zero".to_string()));

        let reply = run(&mut session, &["7"]).await;
        assert_eq!(reply.lines.last().map(String::as_str), Some("> 7"));
        assert!(session.state().error.is_none());
    }

    #[tokio::test]
    async fn test_history_commands() {
        let mut session = session().await;
        run(&mut session, &["2+2=", "9*9="]).await;

        let reply = run(&mut session, &[":history"]).await;
        assert_eq!(reply.lines.len(), 2);
        assert!(reply.lines[0].contains("9 × 9 = 81"));

        let reply = run(&mut session, &[":search 81"]).await;
        assert_eq!(reply.lines.len(), 1);

        let id = session.history().entries()[1].id.clone();
        let remove = format!(":remove {}", id);
        let reply = run(&mut session, &[remove.as_str()]).await;
        assert_eq!(reply.lines, vec!["Removed"]);

        let reply = run(&mut session, &[":stats"]).await;
        assert_eq!(reply.lines[0], "Total:  1");

        run(&mut session, &[":clear-history"]).await;
        let reply = run(&mut session, &[":history"]).await;
        assert_eq!(reply.lines, vec!["No history"]);
    }

    #[tokio::test]
    async fn test_errors_are_rendered() {
        let mut session = session().await;
        let reply = run(&mut session, &[":frobnicate"]).await;
        assert_eq!(reply.lines, vec!["error: Unknown command: :frobnicate"]);

        let reply = run(&mut session, &[":import /nonexistent/calcpad.json"]).await;
        assert!(reply.lines[0].starts_with("error: I/O error"));
        assert!(!reply.quit);
    }

    #[tokio::test]
    async fn test_state_and_quit() {
        let mut session = session().await;
        let reply = run(&mut session, &["4", ":state"]).await;
        assert!(reply.lines[0].contains("\"display\": \"4\""));
        assert!(reply.lines[0].contains("\"waitingForOperand\": false"));

        let reply = run(&mut session, &[":quit"]).await;
        assert!(reply.quit);
    }
}
