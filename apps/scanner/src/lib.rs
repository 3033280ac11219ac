//! # Stockscan Scanner Library
//!
//! Host application for the scan protocol: reads decoded code text, gates it
//! through the desk, and writes JSON events.
//!
//! ## Module Organization
//! ```text
//! stockscan_scanner/
//! ├── lib.rs          ◄─── You are here (startup & main loop)
//! ├── config.rs       ◄─── CLI flags + STOCKSCAN_* environment
//! ├── camera.rs       ◄─── Reader task standing in for the camera
//! ├── controller.rs   ◄─── Input → events, confirm/apply
//! ├── events.rs       ◄─── JSON-lines event stream
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   └── desk.rs     ◄─── ScanDesk gate + ScanState wrapper
//! └── error.rs        ◄─── AppError with serializable codes
//! ```

pub mod camera;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod state;

use std::path::PathBuf;

use directories::ProjectDirs;
use stockscan_db::{Database, DbConfig};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use camera::spawn_reader;
use config::{Cli, ConfigError, ScannerConfig};
use controller::Controller;
use error::AppError;
use events::EventSink;
use state::{DeskPhase, ScanState};

/// Runs the scanner until its input ends.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Scanner Startup                                   │
/// │                                                                         │
/// │  1. Resolve configuration (env, then CLI flags)                         │
/// │  2. Determine database path                                             │
/// │     • --db / STOCKSCAN_DB_PATH                                          │
/// │     • otherwise the platform data dir + stockscan.db                    │
/// │  3. Connect to database, run migrations                                 │
/// │  4. Spawn the reader task (stdin or --input)                            │
/// │  5. Feed every input to the controller, print its events                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = ScannerConfig::from_env()?.with_cli(&cli);

    let db_path = match &config.db_path {
        Some(path) => path.clone(),
        None => default_database_path()?,
    };
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    let (mut inputs, reader) = match &config.input {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            spawn_reader(BufReader::new(file), config.scan_interval)
        }
        None => spawn_reader(BufReader::new(tokio::io::stdin()), config.scan_interval),
    };

    let state = ScanState::new();
    let mut controller = Controller::new(db.clone(), state.clone(), config.auto_confirm);
    let mut sink = EventSink::stdout();

    info!(
        scan_interval_ms = config.scan_interval.as_millis() as u64,
        auto_confirm = config.auto_confirm,
        "Scanner ready"
    );

    while let Some(input) = inputs.recv().await {
        for event in controller.handle(input).await {
            sink.emit(&event)?;
        }
    }

    if state.with_desk(|desk| desk.phase()) == DeskPhase::Confirming {
        warn!("Input ended with a completed batch awaiting confirmation; nothing applied");
    }

    match reader.await {
        Ok(result) => result?,
        Err(join_err) => return Err(AppError::internal(join_err.to_string())),
    }

    db.close().await;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr; stdout carries only events.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages (including dropped scans)
/// - `RUST_LOG=stockscan=trace` - Trace for stockscan crates only
/// - Default: `info,stockscan=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockscan=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the default database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.stockscan.scanner/stockscan.db`
/// - **Windows**: `%APPDATA%\stockscan\scanner\data\stockscan.db`
/// - **Linux**: `~/.local/share/scanner/stockscan.db`
fn default_database_path() -> Result<PathBuf, AppError> {
    let proj_dirs =
        ProjectDirs::from("com", "stockscan", "scanner").ok_or(ConfigError::NoDataDir)?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("stockscan.db"))
}
