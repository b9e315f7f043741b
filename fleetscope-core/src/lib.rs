//! Core data structures and pipeline for FleetScope.
//!
//! This crate provides the sweep pipeline shared between the collector and
//! report binaries: device sessions, per-command collection with status
//! flags, the fleet sweep, and the lookups used to build the port view.
//!
//! # Security Guarantees
//! - Credentials live in zeroizing containers and are checked before any
//!   session is opened
//! - Passwords and privileged secrets are masked in records, audit entries
//!   and error messages
//! - Vendor lookups never touch the network; only loading the table may
//!
//! # Architecture
//! - `session`: connect, enable, run commands, disconnect (transport behind a trait)
//! - `parser`: boundary to the external pattern-template parser
//! - `aggregator`: one device, one [`DeviceRecord`], command failures isolated
//! - `sweep`: ordered device list to [`SweepResult`] with progress
//! - `view`: interface rows enriched with `vendor` and `timefmt` lookups

pub mod aggregator;
pub mod config;
pub mod error;
pub mod flags;
pub mod inventory;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod parser;
pub mod progress;
pub mod security;
pub mod session;
pub mod sweep;
pub mod tally;
pub mod timefmt;
pub mod vendor;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use aggregator::{CommandTally, DeviceRecordAggregator};
pub use config::SweepConfig;
pub use error::{FleetError, Result};
pub use flags::{FlagState, StatusFlagRegister};
pub use inventory::Inventory;
pub use logging::{init_json_logging, init_logging};
pub use models::{
    CommandKind, CommandOutcome, ConnectionStatus, DeviceDescriptor, DeviceRecord,
    FailureCategory,
};
pub use parser::{CommandResultParser, ExternalCommandParser};
pub use progress::{LogProgress, NoopProgress, ProgressReporter, ProgressUpdate, TaskProgress};
pub use security::DeviceCredentials;
pub use session::{AuditLog, ReplayTransport, SessionManager, SessionTransport};
pub use sweep::{DeviceFailure, FleetSweep, SweepMetadata, SweepResult};
pub use tally::ValueTally;
pub use timefmt::{ElapsedTime, TimeNormalizer};
pub use vendor::{VendorDatabase, VendorResolver, VendorSource};
pub use view::{ViewBuilder, ViewRow, ViewSummary};
