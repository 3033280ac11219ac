//! # Stockscan Scanner Entry Point
//!
//! ## Usage
//! ```bash
//! # Interactive: paste decoded codes, then type :confirm
//! stockscan --db ./stockscan_dev.db
//!
//! # Replay a recorded scan, applying automatically
//! stockscan --db ./stockscan_dev.db --input scans.txt --yes
//! ```
//!
//! Exit code 0 when the input ends normally, 1 on a fatal error
//! (configuration, database connection, unreadable input).

use std::process::ExitCode;

use clap::Parser;
use stockscan_scanner::config::Cli;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    stockscan_scanner::init_tracing();
    info!("Starting Stockscan scanner");

    match stockscan_scanner::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(code = ?err.code, "{}", err.message);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
