//! Network device sweep tool.
//!
//! This binary sweeps the devices of a region inventory, runs a battery of
//! show commands on each, parses the output and writes one sweep document
//! with per-device records and per-command status flags.
//!
//! # Security Guarantees
//! - Credentials come from files, environment variables or a prompt
//! - Passwords and secrets are masked in every output
//! - One device failing never stops the sweep

use clap::Parser;
use fleetscope_collect::{Cli, execute};
use fleetscope_core::{Result, init_json_logging, init_logging};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.global.json_logs {
        init_json_logging(cli.global.verbose, cli.global.quiet)?;
    } else {
        init_logging(cli.global.verbose, cli.global.quiet)?;
    }

    execute(&cli).await.map_err(|e| {
        error!("{}", e);
        e
    })
}
