//! Per-device collection: run the battery, fold every outcome into one
//! [`DeviceRecord`].
//!
//! Each command kind goes through two independently failing steps, the
//! session call and the parse. A failure at either step is recorded against
//! that kind and the next kind still runs. Only a failure to connect (or to
//! enter privileged mode) ends the device's pass early.

use crate::Result;
use crate::models::{
    CommandFailure, CommandKind, CommandOutcome, CommandRecords, DeviceDescriptor, DeviceRecord,
};
use crate::parser::CommandResultParser;
use crate::session::{Session, SessionManager};
use crate::tally::ValueTally;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-command success and failure counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTally {
    pub succeeded: ValueTally<CommandKind>,
    pub failed: ValueTally<CommandKind>,
}

impl CommandTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one outcome
    pub fn record(&mut self, outcome: &CommandOutcome) {
        if outcome.is_ok() {
            self.succeeded.record(outcome.kind);
        } else {
            self.failed.record(outcome.kind);
        }
    }

    /// Adds every count from `other`
    pub fn merge(&mut self, other: CommandTally) {
        self.succeeded.merge(other.succeeded);
        self.failed.merge(other.failed);
    }
}

/// Runs the command battery against one device at a time.
#[derive(Clone)]
pub struct DeviceRecordAggregator {
    sessions: SessionManager,
    parser: Arc<dyn CommandResultParser>,
    battery: Vec<CommandKind>,
}

impl DeviceRecordAggregator {
    /// Creates an aggregator running the default five-command battery
    pub fn new(sessions: SessionManager, parser: Arc<dyn CommandResultParser>) -> Self {
        Self {
            sessions,
            parser,
            battery: CommandKind::DEFAULT_BATTERY.to_vec(),
        }
    }

    /// Replaces the battery; kinds run in the given order
    pub fn with_battery(mut self, battery: Vec<CommandKind>) -> Self {
        self.battery = battery;
        self
    }

    pub fn battery(&self) -> &[CommandKind] {
        &self.battery
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.sessions
    }

    /// Collects one device.
    ///
    /// Every outcome is counted in `tally`. The returned record has its
    /// narrative closed and its secrets masked.
    ///
    /// # Errors
    /// Returns the connect or privileged-mode error; no command runs after
    /// either. Command and parse failures never surface here.
    pub async fn try_collect(
        &self,
        device: DeviceDescriptor,
        tally: &mut CommandTally,
    ) -> Result<DeviceRecord> {
        let mut record = DeviceRecord::new(device);
        let hostname = record.device.hostname.clone();

        let mut session = self.sessions.connect(&record.device).await.map_err(|e| {
            warn!("{}: Unable to Connect: {}", hostname, e);
            e
        })?;

        if let Err(e) = self.sessions.enter_privileged_mode(&mut session).await {
            warn!("{}: privileged mode refused: {}", hostname, e);
            self.close(session).await;
            return Err(e);
        }

        info!("{}: running {} commands", hostname, self.battery.len());
        for kind in &self.battery {
            let outcome = self.run_kind(&mut session, *kind).await;
            tally.record(&outcome);
            match &outcome.result {
                Ok(records) => debug!("{}: {} returned {} records", hostname, kind, records.len()),
                Err(failure) => warn!(
                    "{}: {} failed ({}): {}",
                    hostname, kind, failure.category, failure.message
                ),
            }
            record.apply_outcome(outcome);
        }

        record.finish();
        self.close(session).await;
        info!(
            "{}: {} ({} interfaces)",
            hostname,
            record.connection_status,
            record.interface_count()
        );
        Ok(record)
    }

    /// Collects one device, or `None` if it could not be connected.
    pub async fn collect(
        &self,
        device: DeviceDescriptor,
        tally: &mut CommandTally,
    ) -> Option<DeviceRecord> {
        self.try_collect(device, tally).await.ok()
    }

    async fn run_kind(&self, session: &mut Session, kind: CommandKind) -> CommandOutcome {
        let failed = |error: &crate::error::FleetError| CommandOutcome {
            kind,
            parsed: false,
            result: Err(CommandFailure::from(error)),
        };

        let raw = match self.sessions.run_command(session, kind.command_text()).await {
            Ok(raw) => raw,
            Err(e) => return failed(&e),
        };

        let maps = match self.parser.parse(kind.template_id(), &raw).await {
            Ok(maps) => maps,
            Err(e) => return failed(&e),
        };

        CommandOutcome {
            kind,
            parsed: true,
            result: CommandRecords::from_field_maps(kind, maps)
                .map_err(|e| CommandFailure::from(&e)),
        }
    }

    async fn close(&self, session: Session) {
        let hostname = session.hostname().to_string();
        if let Err(e) = self.sessions.disconnect(session).await {
            warn!("{}: disconnect failed: {}", hostname, e);
        }
    }
}
