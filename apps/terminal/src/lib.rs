//! # Calcpad Terminal Library
//!
//! Host application for the calculator core: configuration, logging, the
//! history database and a line-driven event loop.
//!
//! ## Module Organization
//! ```text
//! calcpad_terminal_lib/
//! ├── lib.rs          ◄─── You are here (startup & event loop)
//! ├── clipboard.rs    ◄─── System clipboard boundary (arboard)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── AppConfig from CALCPAD_* variables
//! │   └── session.rs  ◄─── Calculator + history + keyboard adapter
//! ├── commands/
//! │   ├── mod.rs      ◄─── Line parsing, dispatch, display rendering
//! │   └── history.rs  ◄─── History listing, stats, export/import files
//! └── error.rs        ◄─── AppError for the host
//! ```

pub mod clipboard;
pub mod commands;
pub mod error;
pub mod state;

use std::io::Write;
use std::path::PathBuf;

use calcpad_db::migrations::migration_status;
use calcpad_db::{Database, DbConfig, HistoryStore, SqliteKeyValueStore};
use directories::ProjectDirs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use clipboard::SystemClipboard;
use error::{AppError, AppResult};
use state::{AppConfig, Session};

/// Runs the terminal application until `:quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info,calcpad=debug,sqlx=warn (override with RUST_LOG)    │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • AppConfig::from_env (CALCPAD_* variables)                         │
/// │                                                                         │
/// │  3. Open History ─────────────────────────────────────────────────────► │
/// │     • use_local_storage: SQLite at the data directory, migrations run   │
/// │     • otherwise: in-memory log only                                     │
/// │                                                                         │
/// │  4. Event Loop ───────────────────────────────────────────────────────► │
/// │     • one stdin line at a time, run to completion, display rendered     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> AppResult<()> {
    init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Calcpad");

    let config = AppConfig::from_env();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_session(config))
}

async fn run_session(config: AppConfig) -> AppResult<()> {
    let capacity = config.calculator.max_history;

    let database = if config.calculator.use_local_storage {
        let db_path = get_database_path(&config)?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        match migration_status(db.pool()).await {
            Ok((total, applied)) => info!(total, applied, "Database ready"),
            Err(e) => warn!(error = %e, "Could not read migration status"),
        }
        Some(db)
    } else {
        info!("Local storage disabled, history kept in memory");
        None
    };

    let history = match &database {
        Some(db) => HistoryStore::open(db.key_values(), capacity).await,
        None => HistoryStore::ephemeral(capacity),
    };

    let mut session = Session::new(&config, history, SystemClipboard);
    event_loop(&mut session).await?;

    if let Some(db) = database {
        db.close().await;
    }
    info!("Calcpad stopped");
    Ok(())
}

async fn event_loop(session: &mut Session<SqliteKeyValueStore, SystemClipboard>) -> AppResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    for line in commands::render_display(session.state()) {
        writeln!(stdout, "{}", line)?;
    }

    while let Some(line) = lines.next_line().await? {
        let reply = commands::handle_line(session, &line).await;
        for line in &reply.lines {
            writeln!(stdout, "{}", line)?;
        }
        stdout.flush()?;
        if reply.quit {
            break;
        }
    }
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=calcpad=trace` - Show trace for calcpad crates only
/// - Default: `info,calcpad=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,calcpad=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.calcpad.calcpad/calcpad.db`
/// - **Windows**: `%APPDATA%\calcpad\calcpad\data\calcpad.db`
/// - **Linux**: `~/.local/share/calcpad/calcpad.db`
///
/// `CALCPAD_DB_PATH` (via [`AppConfig`]) overrides the platform default.
fn get_database_path(config: &AppConfig) -> AppResult<PathBuf> {
    if let Some(path) = &config.db_path {
        return Ok(path.clone());
    }

    let proj_dirs =
        ProjectDirs::from("com", "calcpad", "calcpad").ok_or(AppError::DataDirectory)?;
    let data_dir = proj_dirs.data_dir();

    // Create directory if it doesn't exist
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("calcpad.db"))
}
