//! Typed records built from parser field maps.
//!
//! Field names follow the template columns (`INTERFACE`, `LAST_INPUT`, ...).
//! Every field is optional text; a column the record does not know makes
//! the whole conversion fail as malformed input.

use super::CommandKind;
use crate::error::{FleetError, Result};
use serde::de::DeserializeOwned;
use serde::de::value::{Error as ValueError, MapDeserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parsed row: column name to text value
pub type FieldMap = BTreeMap<String, String>;

/// Conversion from a parser field map into a typed record.
pub trait FromFieldMap: Sized + DeserializeOwned {
    /// Record name used in malformed-input messages
    const KIND: &'static str;

    /// Converts one field map.
    ///
    /// # Errors
    /// Returns `FleetError::MalformedRecord` for unknown column names.
    fn from_field_map(map: &FieldMap) -> Result<Self> {
        let entries = map.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        Self::deserialize(MapDeserializer::<_, ValueError>::new(entries))
            .map_err(|e| FleetError::malformed_record(Self::KIND, e.to_string()))
    }

    /// Converts every field map, failing on the first malformed one.
    fn from_field_maps(maps: &[FieldMap]) -> Result<Vec<Self>> {
        maps.iter().map(Self::from_field_map).collect()
    }
}

/// Row of `show version`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default, deny_unknown_fields)]
pub struct VersionRecord {
    pub version: String,
    pub rommon: String,
    pub hostname: String,
    pub uptime: String,
    pub uptime_years: String,
    pub uptime_weeks: String,
    pub uptime_days: String,
    pub uptime_hours: String,
    pub uptime_minutes: String,
    pub reload_reason: String,
    pub running_image: String,
    pub hardware: String,
    pub serial: String,
    pub config_register: String,
    pub mac_address: String,
    pub restarted: String,
}

impl FromFieldMap for VersionRecord {
    const KIND: &'static str = "version";
}

/// Row of `show interfaces`, one per interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default, deny_unknown_fields)]
pub struct InterfaceRecord {
    pub interface: String,
    pub link_status: String,
    pub protocol_status: String,
    pub hardware_type: String,
    pub mac_address: String,
    pub bia: String,
    pub description: String,
    pub ip_address: String,
    pub prefix_length: String,
    pub mtu: String,
    pub duplex: String,
    pub speed: String,
    pub media_type: String,
    pub bandwidth: String,
    pub delay: String,
    pub encapsulation: String,
    pub last_input: String,
    pub last_output: String,
    pub last_output_hang: String,
    pub queue_strategy: String,
    pub input_rate: String,
    pub output_rate: String,
    pub input_pps: String,
    pub output_pps: String,
    pub input_packets: String,
    pub output_packets: String,
    pub runts: String,
    pub giants: String,
    pub input_errors: String,
    pub crc: String,
    pub frame: String,
    pub overrun: String,
    pub abort: String,
    pub output_errors: String,
    pub vlan_id: String,
    pub vlan_id_inner: String,
    pub vlan_id_outer: String,
}

impl FromFieldMap for InterfaceRecord {
    const KIND: &'static str = "interface";
}

/// Row of `show arp`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default, deny_unknown_fields)]
pub struct ArpRecord {
    pub protocol: String,
    pub ip_address: String,
    pub age: String,
    pub mac_address: String,
    #[serde(rename = "TYPE")]
    pub entry_type: String,
    pub interface: String,
}

impl FromFieldMap for ArpRecord {
    const KIND: &'static str = "arp";
}

/// Row of `show mac address-table`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default, deny_unknown_fields)]
pub struct MacTableRecord {
    pub port: String,
    pub destination_address: String,
    #[serde(rename = "TYPE")]
    pub entry_type: String,
    pub vlan_id: String,
    /// Comma-separated when the entry points at several ports
    pub destination_port: String,
}

impl MacTableRecord {
    /// Individual destination ports
    pub fn ports(&self) -> impl Iterator<Item = &str> {
        self.destination_port
            .split(',')
            .map(str::trim)
            .filter(|port| !port.is_empty())
    }
}

impl FromFieldMap for MacTableRecord {
    const KIND: &'static str = "mac table";
}

/// Row of `show interface status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default, deny_unknown_fields)]
pub struct InterfaceStatusRecord {
    pub port: String,
    pub name: String,
    pub status: String,
    pub vlan_id: String,
    pub duplex: String,
    pub speed: String,
    #[serde(rename = "TYPE")]
    pub port_type: String,
    pub fc_mode: String,
}

impl FromFieldMap for InterfaceStatusRecord {
    const KIND: &'static str = "interface status";
}

/// Records produced by one command, tagged by record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRecords {
    Version(Vec<VersionRecord>),
    Interfaces(Vec<InterfaceRecord>),
    Arp(Vec<ArpRecord>),
    MacTable(Vec<MacTableRecord>),
    InterfaceStatus(Vec<InterfaceStatusRecord>),
    /// Kinds without a typed record keep their field maps
    Raw(Vec<FieldMap>),
}

impl CommandRecords {
    /// Converts parser output into the typed records for `kind`.
    ///
    /// # Errors
    /// Returns `FleetError::MalformedRecord` if any field map does not fit.
    pub fn from_field_maps(kind: CommandKind, maps: Vec<FieldMap>) -> Result<Self> {
        Ok(match kind {
            CommandKind::ShowVersion => Self::Version(VersionRecord::from_field_maps(&maps)?),
            CommandKind::ShowInterface => {
                Self::Interfaces(InterfaceRecord::from_field_maps(&maps)?)
            }
            CommandKind::ShowIpArp => Self::Arp(ArpRecord::from_field_maps(&maps)?),
            CommandKind::ShowMacAddressTable => {
                Self::MacTable(MacTableRecord::from_field_maps(&maps)?)
            }
            CommandKind::ShowInterfaceStatus => {
                Self::InterfaceStatus(InterfaceStatusRecord::from_field_maps(&maps)?)
            }
            _ => Self::Raw(maps),
        })
    }

    /// Number of records
    pub fn len(&self) -> usize {
        match self {
            Self::Version(rows) => rows.len(),
            Self::Interfaces(rows) => rows.len(),
            Self::Arp(rows) => rows.len(),
            Self::MacTable(rows) => rows.len(),
            Self::InterfaceStatus(rows) => rows.len(),
            Self::Raw(rows) => rows.len(),
        }
    }

    /// True if the command reported no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
