//! # Scanner Configuration
//!
//! Settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command-line flags (`--db`, `--scan-interval-ms`, `--yes`, `--input`)
//! 2. Environment variables (`STOCKSCAN_*`)
//! 3. Defaults (this file)
//!
//! Read-only after startup.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

/// Default camera scan interval.
pub const DEFAULT_SCAN_INTERVAL_MS: u64 = 250;

pub const ENV_DB_PATH: &str = "STOCKSCAN_DB_PATH";
pub const ENV_SCAN_INTERVAL_MS: &str = "STOCKSCAN_SCAN_INTERVAL_MS";
pub const ENV_AUTO_CONFIRM: &str = "STOCKSCAN_AUTO_CONFIRM";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable holds a value that can't be parsed.
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    /// No platform data directory and no explicit database path.
    #[error("Could not determine app data directory; set STOCKSCAN_DB_PATH or pass --db")]
    NoDataDir,
}

// =============================================================================
// Command Line
// =============================================================================

/// Command-line flags of the `stockscan` binary.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "stockscan",
    author,
    version,
    about = "Bulk-update inventory stock by scanning multi-part codes",
    long_about = "Reads decoded code text one line at a time (stdin or --input). \
                  Lines starting with ':' are operator actions: \
                  :ack, :confirm, :reject, :cancel, :status. \
                  Events are written to stdout as JSON lines; logs go to stderr."
)]
pub struct Cli {
    /// SQLite inventory database
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Minimum delay between two decoded texts, in milliseconds (0 disables)
    #[arg(long, value_name = "MS")]
    pub scan_interval_ms: Option<u64>,

    /// Apply completed batches without waiting for :confirm
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Read input lines from a file instead of stdin
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

// =============================================================================
// Scanner Config
// =============================================================================

/// Resolved scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Database file; `None` means the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Camera scan rate.
    pub scan_interval: Duration,

    /// Confirm completed batches automatically.
    pub auto_confirm: bool,

    /// Input file; `None` means stdin.
    pub input: Option<PathBuf>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            db_path: None,
            scan_interval: Duration::from_millis(DEFAULT_SCAN_INTERVAL_MS),
            auto_confirm: false,
            input: None,
        }
    }
}

impl ScannerConfig {
    /// Loads defaults overridden by `STOCKSCAN_*` environment variables.
    ///
    /// ## Environment Variables
    /// - `STOCKSCAN_DB_PATH`: database file
    /// - `STOCKSCAN_SCAN_INTERVAL_MS`: scan interval in milliseconds
    /// - `STOCKSCAN_AUTO_CONFIRM`: `1`/`true`/`yes` or `0`/`false`/`no`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ScannerConfig::default();

        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(ENV_SCAN_INTERVAL_MS) {
            let ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue(ENV_SCAN_INTERVAL_MS.to_string()))?;
            config.scan_interval = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup(ENV_AUTO_CONFIRM) {
            config.auto_confirm = parse_flag(&raw)
                .ok_or_else(|| ConfigError::InvalidValue(ENV_AUTO_CONFIRM.to_string()))?;
        }

        Ok(config)
    }

    /// Applies command-line overrides.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        if let Some(db) = &cli.db {
            self.db_path = Some(db.clone());
        }
        if let Some(ms) = cli.scan_interval_ms {
            self.scan_interval = Duration::from_millis(ms);
        }
        if cli.yes {
            self.auto_confirm = true;
        }
        if let Some(input) = &cli.input {
            self.input = Some(input.clone());
        }
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ScannerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ScannerConfig::default());
        assert_eq!(config.scan_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_env_overrides() {
        let config = ScannerConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/store.db"),
            (ENV_SCAN_INTERVAL_MS, "100"),
            (ENV_AUTO_CONFIRM, "yes"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/store.db")));
        assert_eq!(config.scan_interval, Duration::from_millis(100));
        assert!(config.auto_confirm);
    }

    #[test]
    fn test_invalid_values() {
        let err = ScannerConfig::from_lookup(lookup(&[(ENV_SCAN_INTERVAL_MS, "fast")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidValue(ENV_SCAN_INTERVAL_MS.to_string()));

        let err = ScannerConfig::from_lookup(lookup(&[(ENV_AUTO_CONFIRM, "maybe")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidValue(ENV_AUTO_CONFIRM.to_string()));
    }

    #[test]
    fn test_cli_wins_over_env() {
        let env = ScannerConfig::from_lookup(lookup(&[(ENV_DB_PATH, "/tmp/env.db")])).unwrap();
        let cli = Cli::parse_from(["stockscan", "--db", "/tmp/cli.db", "--scan-interval-ms", "0", "-y"]);

        let config = env.with_cli(&cli);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/cli.db")));
        assert_eq!(config.scan_interval, Duration::ZERO);
        assert!(config.auto_confirm);
        assert_eq!(config.input, None);
    }
}
