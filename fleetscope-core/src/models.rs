//! Core data models for device sweeps.
//!
//! This module defines the command catalogue, device descriptors, the
//! per-device record folded together by the aggregator, and the tagged
//! per-command outcome. All models are serializable; credentials inside
//! them serialize masked.

use crate::error::{FleetError, Result};
use crate::flags::StatusFlagRegister;
use crate::security::DeviceCredentials;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

pub mod records;

pub use records::{
    ArpRecord, CommandRecords, FieldMap, FromFieldMap, InterfaceRecord, InterfaceStatusRecord,
    MacTableRecord, VersionRecord,
};

/// Narrative clause appended after the last command of a pass
pub const STATUS_END_CLAUSE: &str = "Data Retrieval Status End";

/// Separator between narrative clauses
pub const CLAUSE_SEPARATOR: &str = "; ";

/// Diagnostic commands issued to devices, each with a fixed flag bit.
///
/// Declaration order is bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    ShowVersion,
    ShowInterface,
    ShowIpRoute,
    ShowMacAddressTable,
    ShowIpArp,
    ShowVlan,
    ShowCdpNeighbors,
    ShowIpInterfaceBrief,
    ShowInventory,
    ShowLogging,
    ShowInterfaceStatus,
}

const _: () = assert!(CommandKind::ALL.len() <= 32);

impl CommandKind {
    /// Every defined kind, in bit order
    pub const ALL: [Self; 11] = [
        Self::ShowVersion,
        Self::ShowInterface,
        Self::ShowIpRoute,
        Self::ShowMacAddressTable,
        Self::ShowIpArp,
        Self::ShowVlan,
        Self::ShowCdpNeighbors,
        Self::ShowIpInterfaceBrief,
        Self::ShowInventory,
        Self::ShowLogging,
        Self::ShowInterfaceStatus,
    ];

    /// The fixed battery run against every device unless configured otherwise
    pub const DEFAULT_BATTERY: [Self; 5] = [
        Self::ShowVersion,
        Self::ShowInterface,
        Self::ShowIpArp,
        Self::ShowMacAddressTable,
        Self::ShowInterfaceStatus,
    ];

    /// Bit position of this kind in a status register
    pub const fn bit(self) -> u32 {
        match self {
            Self::ShowVersion => 0,
            Self::ShowInterface => 1,
            Self::ShowIpRoute => 2,
            Self::ShowMacAddressTable => 3,
            Self::ShowIpArp => 4,
            Self::ShowVlan => 5,
            Self::ShowCdpNeighbors => 6,
            Self::ShowIpInterfaceBrief => 7,
            Self::ShowInventory => 8,
            Self::ShowLogging => 9,
            Self::ShowInterfaceStatus => 10,
        }
    }

    /// Stable identifier, as used in configuration and serialized records
    pub const fn name(self) -> &'static str {
        match self {
            Self::ShowVersion => "show_version",
            Self::ShowInterface => "show_interface",
            Self::ShowIpRoute => "show_ip_route",
            Self::ShowMacAddressTable => "show_mac_address_table",
            Self::ShowIpArp => "show_ip_arp",
            Self::ShowVlan => "show_vlan",
            Self::ShowCdpNeighbors => "show_cdp_neighbors",
            Self::ShowIpInterfaceBrief => "show_ip_interface_brief",
            Self::ShowInventory => "show_inventory",
            Self::ShowLogging => "show_logging",
            Self::ShowInterfaceStatus => "show_interface_status",
        }
    }

    /// Command line sent to the device
    pub const fn command_text(self) -> &'static str {
        match self {
            Self::ShowVersion => "show version",
            Self::ShowInterface => "show interfaces",
            Self::ShowIpRoute => "show ip route",
            Self::ShowMacAddressTable => "show mac address-table",
            Self::ShowIpArp => "show arp",
            Self::ShowVlan => "show vlan brief",
            Self::ShowCdpNeighbors => "show cdp neighbors",
            Self::ShowIpInterfaceBrief => "show ip interface brief",
            Self::ShowInventory => "show inventory",
            Self::ShowLogging => "show logging",
            Self::ShowInterfaceStatus => "show interface status",
        }
    }

    /// Parser template identifier for this command's output
    pub const fn template_id(self) -> &'static str {
        match self {
            Self::ShowVersion => "cisco_ios_show_version",
            Self::ShowInterface => "cisco_ios_show_interfaces",
            Self::ShowIpRoute => "cisco_ios_show_ip_route",
            Self::ShowMacAddressTable => "cisco_ios_show_mac-address-table",
            Self::ShowIpArp => "cisco_ios_show_ip_arp",
            Self::ShowVlan => "cisco_ios_show_vlan",
            Self::ShowCdpNeighbors => "cisco_ios_show_cdp_neighbors",
            Self::ShowIpInterfaceBrief => "cisco_ios_show_ip_interface_brief",
            Self::ShowInventory => "cisco_ios_show_inventory",
            Self::ShowLogging => "cisco_ios_show_logging",
            Self::ShowInterfaceStatus => "cisco_ios_show_interfaces_status",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommandKind {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FleetError::UnknownCommandKind {
                name: s.to_string(),
            })
    }
}

/// Failure categories named in the status narrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Field maps did not fit the command's typed record
    MalformedInput,
    /// The session call or the parser failed
    ExecutionOrParse,
    /// Anything else
    Unclassified,
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCategory::MalformedInput => write!(f, "Malformed Input Error"),
            FailureCategory::ExecutionOrParse => write!(f, "Execution/Parse Error"),
            FailureCategory::Unclassified => write!(f, "Unclassified Error"),
        }
    }
}

/// Device-level connection outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Pending,
    UnableToConnect,
    DataRetrieved,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Pending => write!(f, "Pending"),
            ConnectionStatus::UnableToConnect => write!(f, "Unable to Connect"),
            ConnectionStatus::DataRetrieved => write!(f, "Connected and Data Retrieved"),
        }
    }
}

/// Identity and connection data for one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub hostname: String,
    pub address: String,
    pub region: String,
    pub credentials: DeviceCredentials,
}

impl DeviceDescriptor {
    /// Creates a descriptor; the credential host is set to `address`.
    pub fn new(
        hostname: impl Into<String>,
        address: impl Into<String>,
        region: impl Into<String>,
        credentials: &DeviceCredentials,
    ) -> Self {
        let address = address.into();
        Self {
            hostname: hostname.into(),
            credentials: credentials.for_host(address.clone()),
            address,
            region: region.into(),
        }
    }
}

/// Reason a command contributed no records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFailure {
    pub category: FailureCategory,
    pub message: String,
}

impl From<&FleetError> for CommandFailure {
    fn from(error: &FleetError) -> Self {
        Self {
            category: error.category(),
            message: error.to_string(),
        }
    }
}

/// Tagged outcome of one command kind for one device.
///
/// `parsed` is true once the parser returned field maps, even if those maps
/// later failed to convert into typed records.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub kind: CommandKind,
    pub parsed: bool,
    pub result: std::result::Result<CommandRecords, CommandFailure>,
}

impl CommandOutcome {
    /// True if the command contributed records
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything collected from one device in one sweep pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device: DeviceDescriptor,
    pub connection_status: ConnectionStatus,
    /// Append-only status narrative, one clause per command outcome
    pub narrative: Vec<String>,
    pub flags: StatusFlagRegister,
    pub version_records: Vec<VersionRecord>,
    pub interface_records: Vec<InterfaceRecord>,
    pub arp_records: Vec<ArpRecord>,
    pub mac_table_records: Vec<MacTableRecord>,
    pub interface_status_records: Vec<InterfaceStatusRecord>,
    /// Field maps for kinds without a typed record
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_records: BTreeMap<CommandKind, Vec<FieldMap>>,
    pub collected_at: chrono::DateTime<chrono::Utc>,
}

impl DeviceRecord {
    /// Creates an empty record for a device about to be collected
    pub fn new(device: DeviceDescriptor) -> Self {
        Self {
            device,
            connection_status: ConnectionStatus::Pending,
            narrative: Vec::new(),
            flags: StatusFlagRegister::new(),
            version_records: Vec::new(),
            interface_records: Vec::new(),
            arp_records: Vec::new(),
            mac_table_records: Vec::new(),
            interface_status_records: Vec::new(),
            extra_records: BTreeMap::new(),
            collected_at: chrono::Utc::now(),
        }
    }

    /// Appends a clause to the status narrative
    pub(crate) fn append_status(&mut self, clause: impl Into<String>) {
        self.narrative.push(clause.into());
    }

    /// Folds one command outcome into the record.
    ///
    /// A parsed outcome marks the kind active; a failed one marks it errored.
    /// Both may hold for the same kind.
    pub(crate) fn apply_outcome(&mut self, outcome: CommandOutcome) {
        let CommandOutcome {
            kind,
            parsed,
            result,
        } = outcome;

        if parsed {
            self.flags.set_active(kind);
        }

        match result {
            Ok(records) => {
                let count = records.len();
                self.store_records(kind, records);
                self.append_status(format!("{}: OK ({} records)", kind.command_text(), count));
            }
            Err(failure) => {
                self.flags.set_error(kind);
                self.append_status(format!(
                    "{}: {} - {}",
                    kind.command_text(),
                    failure.category,
                    failure.message
                ));
            }
        }
    }

    fn store_records(&mut self, kind: CommandKind, records: CommandRecords) {
        match records {
            CommandRecords::Version(rows) => self.version_records.extend(rows),
            CommandRecords::Interfaces(rows) => self.interface_records.extend(rows),
            CommandRecords::Arp(rows) => self.arp_records.extend(rows),
            CommandRecords::MacTable(rows) => self.mac_table_records.extend(rows),
            CommandRecords::InterfaceStatus(rows) => self.interface_status_records.extend(rows),
            CommandRecords::Raw(rows) => self.extra_records.entry(kind).or_default().extend(rows),
        }
    }

    /// Closes the narrative, marks the device retrieved and masks its secrets
    pub(crate) fn finish(&mut self) {
        self.append_status(STATUS_END_CLAUSE);
        self.connection_status = ConnectionStatus::DataRetrieved;
        self.device.credentials.redact();
    }

    /// Iterates the narrative clauses in the order they were appended
    pub fn status_clauses(&self) -> impl Iterator<Item = &str> {
        self.narrative.iter().map(String::as_str)
    }

    /// The narrative as one line, clauses joined by [`CLAUSE_SEPARATOR`]
    pub fn status(&self) -> String {
        self.narrative.join(CLAUSE_SEPARATOR)
    }

    /// Number of interface records, and so of view rows for this device
    pub fn interface_count(&self) -> usize {
        self.interface_records.len()
    }
}

#[cfg(test)]
mod tests;
