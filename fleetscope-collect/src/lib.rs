//! Library module for fleetscope-collect
//!
//! The command-line surface and the sweep, probe and catalogue commands live
//! here so that integration tests can drive them; `main.rs` only parses
//! arguments and initializes logging.
//!
//! # Security Guarantees
//! - Passwords and privileged secrets are never accepted as argument values
//! - Credential values are never logged; only their source is
//! - Sweep documents and audit trails carry masked credentials only

pub mod commands;
pub mod credentials;
pub mod output;
pub mod progress;

use clap::{Args, Parser, Subcommand};
use fleetscope_core::security::DEFAULT_DEVICE_KIND;
use std::path::PathBuf;

pub use commands::{ProbeOutcome, command_catalogue, execute, probe_devices, run_sweep};
pub use progress::{BarProgress, ProgressMode};

#[derive(Parser)]
#[command(name = "fleetscope-collect")]
#[command(about = "Network device sweep and telemetry collection tool")]
#[command(version)]
#[command(long_about = "
FleetScope Collector - Sweep network devices and collect interface telemetry

For every device in a region inventory this tool opens a session, enters
privileged mode, runs a battery of show commands, parses each output with a
template parser and records per-command status flags.

SECURITY FEATURES:
- Passwords and secrets come from files, environment or a prompt only
- Credentials are masked in every output and in the audit trail
- Each device is isolated; one failure never stops the sweep

CREDENTIALS:
  --username / FLEETSCOPE_USERNAME
  --password-file / FLEETSCOPE_PASSWORD / prompt
  --secret-file / FLEETSCOPE_SECRET / prompt

EXAMPLES:
  fleetscope-collect sweep -i inventory.json --captures captures/ \\
      --parser textfsm-json --templates templates/
  fleetscope-collect sweep -i inventory.json --captures captures/ \\
      --parser textfsm-json --templates templates/ --concurrency 8 --compress
  fleetscope-collect test -i inventory.json --captures captures/
  fleetscope-collect list
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sweep every inventory device and save the results
    Sweep(SweepArgs),
    /// Connect to every inventory device and disconnect again
    Test(TestArgs),
    /// List the command catalogue
    List,
}

/// Device and credential options shared by `sweep` and `test`
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Region inventory document
    #[arg(short, long, value_name = "FILE", help = "Inventory JSON (regions and nodes)")]
    pub inventory: PathBuf,

    /// Directory of captured command output, one sub-directory per address
    #[arg(long, value_name = "DIR", help = "Capture directory served by the replay transport")]
    pub captures: PathBuf,

    /// Login username
    #[arg(short, long, env = credentials::USERNAME_ENV)]
    pub username: Option<String>,

    /// File holding the login password
    #[arg(long, value_name = "FILE")]
    pub password_file: Option<PathBuf>,

    /// File holding the privileged-mode secret
    #[arg(long, value_name = "FILE")]
    pub secret_file: Option<PathBuf>,

    /// Device kind handed to the transport
    #[arg(long, default_value = DEFAULT_DEVICE_KIND)]
    pub device_kind: String,

    /// Never prompt for missing credentials
    #[arg(long, help = "Fail instead of prompting when a credential is missing")]
    pub no_prompt: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub devices: DeviceArgs,

    /// Parser program
    #[arg(long, value_name = "PROGRAM", help = "Template parser program printing JSON rows")]
    pub parser: PathBuf,

    /// Extra arguments placed before the template path
    #[arg(long = "parser-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub parser_args: Vec<String>,

    /// Template directory
    #[arg(long, value_name = "DIR", help = "Directory of <template_id>.textfsm files")]
    pub templates: PathBuf,

    /// Output file path
    #[arg(
        short,
        long,
        default_value = output::DEFAULT_OUTPUT,
        help = "Output file path (.json, or .json.zst with --compress)"
    )]
    pub output: PathBuf,

    /// Devices collected at once
    #[arg(long, default_value_t = 1, help = "Devices collected concurrently (order is kept)")]
    pub concurrency: usize,

    /// Command battery
    #[arg(
        long,
        value_delimiter = ',',
        help = "Comma-separated command kinds (default: the five-command battery)"
    )]
    pub commands: Vec<String>,

    /// Enable compression
    #[arg(long, help = "Compress output using Zstandard (.json.zst)")]
    pub compress: bool,

    /// Audit trail output
    #[arg(long, value_name = "FILE", help = "Write the session audit trail as JSON lines")]
    pub audit_log: Option<PathBuf>,

    /// Progress display
    #[arg(long, value_enum, default_value_t = ProgressMode::Bar)]
    pub progress: ProgressMode,
}

#[derive(Args, Debug, Clone)]
pub struct TestArgs {
    #[command(flatten)]
    pub devices: DeviceArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,

    /// Structured logs
    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_cli_sweep_defaults() {
        let cli = Cli::try_parse_from([
            "fleetscope-collect",
            "sweep",
            "-i",
            "inv.json",
            "--captures",
            "caps",
            "--parser",
            "parse",
            "--templates",
            "tpl",
            "--commands",
            "show_version,show_vlan",
        ])
        .unwrap();

        let Command::Sweep(args) = cli.command else {
            panic!("expected sweep");
        };
        assert_eq!(args.concurrency, 1);
        assert_eq!(args.output, PathBuf::from("sweep.fleetscope.json"));
        assert_eq!(args.commands, vec!["show_version", "show_vlan"]);
        assert_eq!(args.devices.device_kind, "cisco_ios");
        assert!(!args.compress);
    }

    #[test]
    fn test_cli_rejects_password_argument() {
        let parsed = Cli::try_parse_from([
            "fleetscope-collect",
            "test",
            "-i",
            "inv.json",
            "--captures",
            "caps",
            "--password",
            "hunter2",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["fleetscope-collect", "list", "-vv", "--json-logs"]).unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert!(cli.global.json_logs);
        assert!(matches!(cli.command, Command::List));
    }
}
