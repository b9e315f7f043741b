//! The `sweep`, `test` and `list` commands.

use crate::credentials::{CredentialInputs, resolve_credentials};
use crate::output::{save_audit_log, save_sweep};
use crate::progress::{ProgressMode, reporter};
use crate::{Cli, Command, DeviceArgs, SweepArgs, TestArgs};
use fleetscope_core::{
    AuditLog, CommandKind, DeviceDescriptor, DeviceRecordAggregator, ExternalCommandParser,
    FleetSweep, Inventory, ReplayTransport, Result, SessionManager, SweepConfig, SweepResult,
};
use std::io::IsTerminal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs the parsed command line.
///
/// # Errors
/// Returns the first terminal error of the selected command. Per-device
/// failures are not errors; they are part of the sweep result.
pub async fn execute(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Sweep(args) => {
            let mode = if cli.global.quiet {
                ProgressMode::None
            } else {
                args.progress
            };
            let result = run_sweep(args, mode).await?;
            if !cli.global.quiet {
                print_sweep_summary(&result, args);
            }
            Ok(())
        }
        Command::Test(args) => {
            let outcomes = probe_devices(args).await?;
            for outcome in &outcomes {
                println!("{}", outcome);
            }
            let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
            println!(
                "{} of {} devices reachable",
                outcomes.len().saturating_sub(failed),
                outcomes.len()
            );
            Ok(())
        }
        Command::List => {
            print!("{}", command_catalogue());
            Ok(())
        }
    }
}

/// Loads the inventory and resolves the shared credential template.
///
/// Every node gets the configured default device kind.
async fn load_devices(args: &DeviceArgs, config: &SweepConfig) -> Result<Vec<DeviceDescriptor>> {
    let inventory = Inventory::load(&args.inventory).await?;
    let credentials = resolve_credentials(&CredentialInputs {
        device_kind: config.default_device_kind.clone(),
        username: args.username.clone(),
        password_file: args.password_file.clone(),
        secret_file: args.secret_file.clone(),
        allow_prompt: !args.no_prompt && std::io::stdin().is_terminal(),
    })?;
    Ok(inventory.descriptors(&credentials))
}

fn session_manager(args: &DeviceArgs, audit: &AuditLog) -> SessionManager {
    info!("Serving sessions from captures in {}", args.captures.display());
    SessionManager::new(
        Arc::new(ReplayTransport::new(args.captures.clone())),
        audit.clone(),
    )
}

/// Parses `--commands`; an empty list keeps the default battery
fn battery(names: &[String]) -> Result<Vec<CommandKind>> {
    if names.is_empty() {
        return Ok(CommandKind::DEFAULT_BATTERY.to_vec());
    }
    names.iter().map(|name| CommandKind::from_str(name)).collect()
}

/// Sweeps every inventory device and writes the sweep document.
///
/// # Errors
/// - inventory, credential or configuration errors before the sweep starts
/// - I/O errors writing the document or the audit trail
pub async fn run_sweep(args: &SweepArgs, progress: ProgressMode) -> Result<SweepResult> {
    info!("Starting device sweep...");
    info!("Inventory: {}", args.devices.inventory.display());
    info!("Output: {}", args.output.display());

    let config = SweepConfig::new()
        .with_max_concurrency(args.concurrency)
        .with_battery(battery(&args.commands)?)
        .with_default_device_kind(args.devices.device_kind.as_str());
    config.validate()?;

    let devices = load_devices(&args.devices, &config).await?;
    if let Some(device) = devices.first()
        && let Err(e) = device.credentials.validate()
    {
        warn!("Credential template is incomplete, every device will fail: {}", e);
    }

    let audit = AuditLog::new();
    let parser = ExternalCommandParser::new(args.parser.clone(), args.templates.clone())
        .with_args(args.parser_args.clone());
    let aggregator =
        DeviceRecordAggregator::new(session_manager(&args.devices, &audit), Arc::new(parser));
    let sweep = FleetSweep::new(aggregator, config)?;

    let mut reporter = reporter(progress, devices.len());
    let result = sweep.run(devices, reporter.as_mut()).await;

    save_sweep(&result, &args.output, args.compress).await?;
    if let Some(path) = &args.audit_log {
        save_audit_log(&audit, path).await?;
    }

    info!("✓ Sweep completed");
    Ok(result)
}

fn print_sweep_summary(result: &SweepResult, args: &SweepArgs) {
    let meta = &result.metadata;
    println!("Sweep completed");
    println!(
        "Output: {}",
        crate::output::output_path(&args.output, args.compress).display()
    );
    println!("Sweep ID: {}", meta.sweep_id);
    println!("Devices attempted: {}", meta.devices_attempted);
    println!("Devices collected: {}", meta.devices_collected);
    println!("Unable to connect: {}", meta.devices_failed);
    println!("Interfaces: {}", result.interface_count());
    for (kind, count) in meta.command_tally.failed.iter() {
        println!("  {} failed on {} devices", kind, count);
    }
    for warning in &meta.warnings {
        println!("Warning: {}", warning);
    }
}

/// Result of probing one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub hostname: String,
    pub address: String,
    /// Failure text; `None` when the probe succeeded
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error {
            None => write!(f, "{} ({}): OK", self.hostname, self.address),
            Some(message) => write!(
                f,
                "{} ({}): FAILED - {}",
                self.hostname, self.address, message
            ),
        }
    }
}

/// Connects to every inventory device, enters privileged mode and
/// disconnects again, one device at a time.
///
/// # Errors
/// Returns inventory and credential errors; per-device failures are
/// reported in the outcomes.
pub async fn probe_devices(args: &TestArgs) -> Result<Vec<ProbeOutcome>> {
    info!("Testing device connections...");
    let config = SweepConfig::new().with_default_device_kind(args.devices.device_kind.as_str());
    config.validate()?;
    let devices = load_devices(&args.devices, &config).await?;
    let audit = AuditLog::new();
    let sessions = session_manager(&args.devices, &audit);

    let mut outcomes = Vec::with_capacity(devices.len());
    for device in &devices {
        let error = match sessions.probe(device).await {
            Ok(()) => {
                info!("✓ {} ({}) reachable", device.hostname, device.address);
                None
            }
            Err(e) => {
                error!("{} ({}): {}", device.hostname, device.address, e);
                Some(e.to_string())
            }
        };
        outcomes.push(ProbeOutcome {
            hostname: device.hostname.clone(),
            address: device.address.clone(),
            error,
        });
    }
    Ok(outcomes)
}

/// The command catalogue as printed by `list`
pub fn command_catalogue() -> String {
    let mut text = String::from("Command Catalogue (* = default battery):\n\n");
    text.push_str(&format!(
        "  {:>3}  {:<26} {:<26} {}\n",
        "Bit", "Kind", "Command", "Template"
    ));
    for kind in CommandKind::ALL {
        let marker = if CommandKind::DEFAULT_BATTERY.contains(&kind) {
            "*"
        } else {
            " "
        };
        text.push_str(&format!(
            "{} {:>3}  {:<26} {:<26} {}\n",
            marker,
            kind.bit(),
            kind.name(),
            kind.command_text(),
            kind.template_id()
        ));
    }

    text.push_str("\nOutput Formats:\n");
    text.push_str("  .json      - Plain JSON (default)\n");
    #[cfg(feature = "compression")]
    text.push_str("  .json.zst  - Compressed JSON (--compress)\n");
    text
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_defaults_and_names() {
        assert_eq!(battery(&[]).unwrap(), CommandKind::DEFAULT_BATTERY.to_vec());
        let kinds = battery(&["show_vlan".to_string(), "SHOW_VERSION".to_string()]).unwrap();
        assert_eq!(kinds, vec![CommandKind::ShowVlan, CommandKind::ShowVersion]);
        assert!(battery(&["show_running_config".to_string()]).is_err());
    }

    #[test]
    fn test_catalogue_lists_every_kind_with_bits() {
        let text = command_catalogue();
        for kind in CommandKind::ALL {
            assert!(text.contains(kind.name()));
            assert!(text.contains(kind.template_id()));
        }
        let version_line = text
            .lines()
            .find(|line| line.contains("show_version "))
            .unwrap();
        assert!(version_line.starts_with('*'));
        let vlan_line = text.lines().find(|line| line.contains("show_vlan ")).unwrap();
        assert!(vlan_line.starts_with(' '));
        assert!(vlan_line.contains(" 5 "));
    }

    #[tokio::test]
    async fn test_load_devices_applies_configured_device_kind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(
            root.join("inventory.json"),
            r#"{"regions": [{"region_name": "core", "nodes": [
                {"node_name": "nx-1", "ip": "10.2.0.1"},
                {"node_name": "nx-2", "ip": "10.2.0.2"}
            ]}]}"#,
        )
        .unwrap();
        std::fs::write(root.join("password"), "pw\n").unwrap();
        std::fs::write(root.join("secret"), "en\n").unwrap();

        let args = DeviceArgs {
            inventory: root.join("inventory.json"),
            captures: root.join("captures"),
            username: Some("netops".to_string()),
            password_file: Some(root.join("password")),
            secret_file: Some(root.join("secret")),
            device_kind: "cisco_ios".to_string(),
            no_prompt: true,
        };
        let config = SweepConfig::new().with_default_device_kind("cisco_nxos");

        let devices = load_devices(&args, &config).await.unwrap();
        assert_eq!(devices.len(), 2);
        for device in &devices {
            assert_eq!(device.credentials.device_kind(), "cisco_nxos");
        }
        assert_eq!(devices[1].credentials.host(), "10.2.0.2");
    }

    #[test]
    fn test_probe_outcome_display() {
        let ok = ProbeOutcome {
            hostname: "sw-a".to_string(),
            address: "10.0.0.1".to_string(),
            error: None,
        };
        assert_eq!(ok.to_string(), "sw-a (10.0.0.1): OK");
        let failed = ProbeOutcome {
            error: Some("Device connection failed: refused".to_string()),
            ..ok
        };
        assert!(!failed.is_ok());
        assert!(failed.to_string().ends_with("FAILED - Device connection failed: refused"));
    }
}
