//! Fleet sweep orchestration.
//!
//! A sweep runs the [`DeviceRecordAggregator`] over an ordered device list
//! and gathers the records, the devices that could not be connected, and
//! sweep metadata.
//!
//! # Features
//! - Bounded concurrency across devices, output kept in input order
//! - Progress reported after every device from a single consumer
//! - Per-command success and failure tallies merged across devices
//!
//! # Security
//! - Records leave the sweep with passwords and secrets masked
//! - Failure messages carry hostnames and addresses, never credentials

use crate::aggregator::{CommandTally, DeviceRecordAggregator};
use crate::config::SweepConfig;
use crate::error::{FleetError, Result};
use crate::models::{ConnectionStatus, DeviceDescriptor, DeviceRecord};
use crate::progress::{ProgressReporter, ProgressUpdate};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

/// A device that produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFailure {
    pub hostname: String,
    pub address: String,
    pub status: ConnectionStatus,
    /// Error message describing the failure
    pub error_message: String,
    /// Whether the transport refused the device, as opposed to a
    /// privileged-mode or credential problem
    pub is_connection_error: bool,
}

/// Metadata about one sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepMetadata {
    pub sweep_id: uuid::Uuid,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub total_duration_ms: u64,
    pub devices_attempted: usize,
    pub devices_collected: usize,
    pub devices_failed: usize,
    pub max_concurrency: usize,
    pub collector_version: String,
    /// Outcomes per command kind across all collected devices
    pub command_tally: CommandTally,
    pub warnings: Vec<String>,
}

/// Everything one sweep produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResult {
    /// Collected devices, in input order
    pub records: Vec<DeviceRecord>,
    /// Devices that could not be connected, in input order
    pub failures: Vec<DeviceFailure>,
    pub metadata: SweepMetadata,
}

impl SweepResult {
    /// Reads a sweep document.
    ///
    /// # Errors
    /// Returns `FleetError::Serialization` if the JSON does not match.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| FleetError::serialization("Invalid sweep document", e))
    }

    /// Renders the sweep document as pretty JSON.
    ///
    /// # Errors
    /// Returns `FleetError::Serialization` if a record cannot be encoded.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FleetError::serialization("Failed to encode sweep document", e))
    }

    /// Total interface records, and so view rows, across all devices
    pub fn interface_count(&self) -> usize {
        self.records.iter().map(DeviceRecord::interface_count).sum()
    }
}

/// Runs the aggregator over a device list.
pub struct FleetSweep {
    aggregator: DeviceRecordAggregator,
    config: SweepConfig,
}

impl FleetSweep {
    /// Creates a sweep; the aggregator runs the configured battery.
    ///
    /// # Errors
    /// Returns `FleetError::Configuration` if `config` does not validate.
    pub fn new(aggregator: DeviceRecordAggregator, config: SweepConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            aggregator: aggregator.with_battery(config.battery.clone()),
            config,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn aggregator(&self) -> &DeviceRecordAggregator {
        &self.aggregator
    }

    /// Collects every device and returns the completed records only.
    pub async fn collect_records(
        &self,
        devices: Vec<DeviceDescriptor>,
        progress: &mut dyn ProgressReporter,
    ) -> Vec<DeviceRecord> {
        self.run(devices, progress).await.records
    }

    /// Collects every device.
    ///
    /// Devices that cannot be connected are listed as failures and never
    /// stop the sweep. An empty device list yields an empty result.
    pub async fn run(
        &self,
        devices: Vec<DeviceDescriptor>,
        progress: &mut dyn ProgressReporter,
    ) -> SweepResult {
        let start_time = Instant::now();
        let started_at = chrono::Utc::now();
        let total = devices.len();
        let warnings = inventory_warnings(&devices);

        tracing::info!(
            "Starting sweep of {} devices (max_concurrency: {}, commands: {})",
            total,
            self.config.max_concurrency,
            self.config.battery.len()
        );

        let aggregator = &self.aggregator;
        let mut outcomes = stream::iter(devices)
            .map(|device| async move {
                let hostname = device.hostname.clone();
                let address = device.address.clone();
                let mut tally = CommandTally::new();
                let result = aggregator.try_collect(device, &mut tally).await;
                (hostname, address, tally, result)
            })
            .buffered(self.config.max_concurrency);

        let mut records = Vec::new();
        let mut failures = Vec::new();
        let mut command_tally = CommandTally::new();
        let mut current = 0_usize;

        while let Some((hostname, address, tally, result)) = outcomes.next().await {
            current = current.saturating_add(1);
            command_tally.merge(tally);
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::error!("{} ({}): {}", hostname, address, e);
                    failures.push(DeviceFailure {
                        is_connection_error: e.is_connection_error(),
                        error_message: e.to_string(),
                        status: ConnectionStatus::UnableToConnect,
                        hostname: hostname.clone(),
                        address,
                    });
                }
            }
            progress.report(&ProgressUpdate::new(current, total, hostname));
        }
        progress.finish(total);

        let total_duration = start_time.elapsed();
        let metadata = SweepMetadata {
            sweep_id: uuid::Uuid::new_v4(),
            started_at,
            total_duration_ms: u64::try_from(total_duration.as_millis()).unwrap_or(u64::MAX),
            devices_attempted: total,
            devices_collected: records.len(),
            devices_failed: failures.len(),
            max_concurrency: self.config.max_concurrency,
            collector_version: env!("CARGO_PKG_VERSION").to_string(),
            command_tally,
            warnings,
        };

        tracing::info!(
            "Sweep completed in {:.2}s: {} collected, {} unable to connect",
            total_duration.as_secs_f64(),
            metadata.devices_collected,
            metadata.devices_failed
        );

        SweepResult {
            records,
            failures,
            metadata,
        }
    }
}

fn inventory_warnings(devices: &[DeviceDescriptor]) -> Vec<String> {
    let mut warnings = Vec::new();
    if devices.is_empty() {
        warnings.push("Device list is empty; nothing to collect".to_string());
    }

    let mut seen = HashSet::new();
    for device in devices {
        if !seen.insert(device.address.as_str()) {
            warnings.push(format!(
                "Address {} appears more than once ({})",
                device.address, device.hostname
            ));
        }
    }

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }
    warnings
}
