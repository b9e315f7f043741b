//! Sweep configuration.

use crate::error::{FleetError, Result};
use crate::models::CommandKind;
use crate::security::DEFAULT_DEVICE_KIND;

/// Controls which commands a sweep runs and how many devices it works on
/// at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Maximum number of devices collected concurrently.
    ///
    /// Output order always follows input order.
    /// Default: 1 (one device at a time)
    pub max_concurrency: usize,

    /// Command kinds run against every device, in order.
    ///
    /// Default: [`CommandKind::DEFAULT_BATTERY`]
    pub battery: Vec<CommandKind>,

    /// Device kind given to inventory nodes.
    ///
    /// Default: `cisco_ios`
    pub default_device_kind: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            battery: CommandKind::DEFAULT_BATTERY.to_vec(),
            default_device_kind: DEFAULT_DEVICE_KIND.to_string(),
        }
    }
}

impl SweepConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum concurrency; zero is rejected by [`validate`](Self::validate).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Replaces the command battery
    pub fn with_battery(mut self, battery: Vec<CommandKind>) -> Self {
        self.battery = battery;
        self
    }

    /// Sets the device kind for inventory nodes
    pub fn with_default_device_kind(mut self, device_kind: impl Into<String>) -> Self {
        self.default_device_kind = device_kind.into();
        self
    }

    /// Checks the configuration before a sweep starts.
    ///
    /// # Errors
    /// Returns `FleetError::Configuration` for zero concurrency, an empty or
    /// repeating battery, or a blank device kind.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(FleetError::configuration(
                "max_concurrency must be at least 1",
            ));
        }
        if self.battery.is_empty() {
            return Err(FleetError::configuration(
                "command battery must name at least one command",
            ));
        }
        for (index, kind) in self.battery.iter().enumerate() {
            if self.battery[..index].contains(kind) {
                return Err(FleetError::configuration(format!(
                    "command {} appears more than once in the battery",
                    kind
                )));
            }
        }
        if self.default_device_kind.trim().is_empty() {
            return Err(FleetError::configuration("device kind must not be blank"));
        }
        Ok(())
    }
}
