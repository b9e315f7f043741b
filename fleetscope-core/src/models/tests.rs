//! Tests for the device sweep models.

use super::*;
use crate::error::REDACTED_MASK;
use crate::security::DEFAULT_DEVICE_KIND;

fn descriptor() -> DeviceDescriptor {
    let creds = DeviceCredentials::new(DEFAULT_DEVICE_KIND, "", "netops", "pw-123", "en-456");
    DeviceDescriptor::new("core-sw-01", "10.1.1.1", "north", &creds)
}

fn interface(name: &str) -> InterfaceRecord {
    InterfaceRecord {
        interface: name.to_string(),
        ..InterfaceRecord::default()
    }
}

#[test]
fn test_command_kind_bits_are_unique_and_ordered() {
    for (index, kind) in CommandKind::ALL.iter().enumerate() {
        assert_eq!(kind.bit() as usize, index, "{kind} out of order");
    }
}

#[test]
fn test_command_kind_from_str() {
    assert_eq!(
        "show_interface_status".parse::<CommandKind>().unwrap(),
        CommandKind::ShowInterfaceStatus
    );
    assert_eq!(
        " SHOW_VERSION ".parse::<CommandKind>().unwrap(),
        CommandKind::ShowVersion
    );

    let error = "show_running_config".parse::<CommandKind>().unwrap_err();
    assert!(matches!(error, FleetError::UnknownCommandKind { ref name } if name == "show_running_config"));
}

#[test]
fn test_command_kind_serde_uses_names() {
    let json = serde_json::to_string(&CommandKind::ShowMacAddressTable).unwrap();
    assert_eq!(json, "\"show_mac_address_table\"");
}

#[test]
fn test_default_battery() {
    assert_eq!(CommandKind::DEFAULT_BATTERY.len(), 5);
    assert_eq!(CommandKind::DEFAULT_BATTERY[1].command_text(), "show interfaces");
    assert_eq!(
        CommandKind::ShowInterface.template_id(),
        "cisco_ios_show_interfaces"
    );
}

#[test]
fn test_descriptor_sets_credential_host() {
    let device = descriptor();
    assert_eq!(device.credentials.host(), "10.1.1.1");
    assert!(device.credentials.validate().is_ok());
}

#[test]
fn test_apply_successful_outcome() {
    let mut record = DeviceRecord::new(descriptor());
    record.apply_outcome(CommandOutcome {
        kind: CommandKind::ShowInterface,
        parsed: true,
        result: Ok(CommandRecords::Interfaces(vec![
            interface("Gi1/0/1"),
            interface("Gi1/0/2"),
        ])),
    });

    assert_eq!(record.interface_count(), 2);
    assert!(record.flags.is_active(CommandKind::ShowInterface));
    assert!(!record.flags.has_error(CommandKind::ShowInterface));
    assert_eq!(record.status(), "show interfaces: OK (2 records)");
}

#[test]
fn test_apply_failed_outcome_before_parse() {
    let mut record = DeviceRecord::new(descriptor());
    record.apply_outcome(CommandOutcome {
        kind: CommandKind::ShowIpArp,
        parsed: false,
        result: Err(CommandFailure {
            category: FailureCategory::ExecutionOrParse,
            message: "timed out".to_string(),
        }),
    });

    assert!(!record.flags.is_active(CommandKind::ShowIpArp));
    assert!(record.flags.has_error(CommandKind::ShowIpArp));
    assert_eq!(record.status(), "show arp: Execution/Parse Error - timed out");
}

#[test]
fn test_failure_message_with_separator_stays_one_clause() {
    let mut record = DeviceRecord::new(descriptor());
    record.apply_outcome(CommandOutcome {
        kind: CommandKind::ShowIpArp,
        parsed: false,
        result: Err(CommandFailure {
            category: FailureCategory::ExecutionOrParse,
            message: "% Invalid input; detected at '^' marker".to_string(),
        }),
    });
    record.finish();

    let clauses: Vec<_> = record.status_clauses().collect();
    assert_eq!(
        clauses,
        vec![
            "show arp: Execution/Parse Error - % Invalid input; detected at '^' marker",
            STATUS_END_CLAUSE,
        ]
    );
    assert!(record.status().ends_with("marker; Data Retrieval Status End"));
}

#[test]
fn test_apply_malformed_outcome_sets_both_flags() {
    let mut record = DeviceRecord::new(descriptor());
    record.apply_outcome(CommandOutcome {
        kind: CommandKind::ShowVersion,
        parsed: true,
        result: Err(CommandFailure {
            category: FailureCategory::MalformedInput,
            message: "unknown field".to_string(),
        }),
    });

    assert!(record.flags.is_active(CommandKind::ShowVersion));
    assert!(record.flags.has_error(CommandKind::ShowVersion));
    assert!(record.version_records.is_empty());
}

#[test]
fn test_raw_records_kept_per_kind() {
    let mut record = DeviceRecord::new(descriptor());
    let mut row = FieldMap::new();
    row.insert("VLAN_ID".to_string(), "10".to_string());

    record.apply_outcome(CommandOutcome {
        kind: CommandKind::ShowVlan,
        parsed: true,
        result: Ok(CommandRecords::Raw(vec![row])),
    });

    assert_eq!(record.extra_records[&CommandKind::ShowVlan].len(), 1);
}

#[test]
fn test_finish_closes_narrative_and_redacts() {
    let mut record = DeviceRecord::new(descriptor());
    record.append_status("show version: OK (1 records)");
    record.finish();

    let clauses: Vec<_> = record.status_clauses().collect();
    assert_eq!(clauses.last(), Some(&STATUS_END_CLAUSE));
    assert_eq!(record.connection_status, ConnectionStatus::DataRetrieved);
    assert_eq!(record.device.credentials.password(), REDACTED_MASK);
    assert_eq!(record.device.credentials.secret(), REDACTED_MASK);
}

#[test]
fn test_device_record_json_has_no_secrets() {
    let mut record = DeviceRecord::new(descriptor());
    record.finish();

    let json = serde_json::to_string(&record).unwrap();
    assert!(!json.contains("pw-123"));
    assert!(!json.contains("en-456"));

    let back: DeviceRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back.device.hostname, "core-sw-01");
    assert_eq!(back.connection_status, ConnectionStatus::DataRetrieved);
}

#[test]
fn test_connection_status_display() {
    assert_eq!(
        ConnectionStatus::UnableToConnect.to_string(),
        "Unable to Connect"
    );
    assert_eq!(
        ConnectionStatus::DataRetrieved.to_string(),
        "Connected and Data Retrieved"
    );
}
