//! Report-ready port view: one row per (device, interface).
//!
//! Rows copy the device identity and every interface field, then add the
//! hardware vendor and normalized last input/output times. A lookup that
//! fails only affects its own field, never the row.

use crate::models::{DeviceRecord, InterfaceRecord};
use crate::progress::{ProgressReporter, ProgressUpdate};
use crate::tally::ValueTally;
use crate::timefmt::TimeNormalizer;
use crate::vendor::{INVALID_MAC_FORMAT, VendorResolver};
use serde::Serialize;
use std::collections::BTreeSet;

/// One interface of one device, enriched for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRow {
    pub switch_hostname: String,
    pub switch_ip_address: String,
    pub switch_region: String,
    /// Short vendor name; empty when the prefix is unknown
    pub mac_vendor: String,
    pub converted_last_input: String,
    pub converted_last_output: String,
    #[serde(flatten)]
    pub interface: InterfaceRecord,
}

impl ViewRow {
    /// True if the vendor could not be determined
    pub fn vendor_unresolved(&self) -> bool {
        self.mac_vendor.is_empty() || self.mac_vendor == INVALID_MAC_FORMAT
    }
}

/// Aggregate figures over a set of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    pub row_count: usize,
    pub device_count: usize,
    /// Rows per resolved vendor
    pub vendors: ValueTally<String>,
    /// Rows whose vendor is unknown or whose address is malformed
    pub unresolved_vendors: usize,
}

/// Builds [`ViewRow`]s from collected device records.
#[derive(Debug, Clone)]
pub struct ViewBuilder {
    vendors: VendorResolver,
    times: TimeNormalizer,
}

impl ViewBuilder {
    pub fn new(vendors: VendorResolver, times: TimeNormalizer) -> Self {
        Self { vendors, times }
    }

    /// Builds every row, reporting progress once per row.
    ///
    /// Row count equals the total number of interface records.
    pub fn build(
        &self,
        records: &[DeviceRecord],
        progress: &mut dyn ProgressReporter,
    ) -> Vec<ViewRow> {
        let total: usize = records.iter().map(DeviceRecord::interface_count).sum();
        let mut rows = Vec::with_capacity(total);

        for record in records {
            for interface in &record.interface_records {
                rows.push(self.row(record, interface));
                progress.report(&ProgressUpdate::new(
                    rows.len(),
                    total,
                    record.device.hostname.as_str(),
                ));
            }
        }
        progress.finish(total);
        tracing::info!("Built {} view rows from {} devices", rows.len(), records.len());
        rows
    }

    /// Builds the row for one interface of one device
    pub fn row(&self, record: &DeviceRecord, interface: &InterfaceRecord) -> ViewRow {
        ViewRow {
            switch_hostname: record.device.hostname.clone(),
            switch_ip_address: record.device.address.clone(),
            switch_region: record.device.region.clone(),
            mac_vendor: self
                .vendors
                .resolve(&interface.mac_address)
                .unwrap_or_default(),
            converted_last_input: self.times.normalize(&interface.last_input),
            converted_last_output: self.times.normalize(&interface.last_output),
            interface: interface.clone(),
        }
    }

    /// Counts rows, devices and vendors
    pub fn summarize(rows: &[ViewRow]) -> ViewSummary {
        let devices: BTreeSet<(&str, &str)> = rows
            .iter()
            .map(|row| (row.switch_hostname.as_str(), row.switch_ip_address.as_str()))
            .collect();
        let unresolved_vendors = rows.iter().filter(|row| row.vendor_unresolved()).count();
        let vendors = rows
            .iter()
            .filter(|row| !row.vendor_unresolved())
            .map(|row| row.mac_vendor.clone())
            .collect();

        ViewSummary {
            row_count: rows.len(),
            device_count: devices.len(),
            vendors,
            unresolved_vendors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommandKind, CommandOutcome, CommandRecords};
    use crate::progress::NoopProgress;
    use crate::testing::{device, interface_row};
    use crate::timefmt::UNRECOGNIZED_TIME;
    use crate::vendor::VendorDatabase;

    fn builder() -> ViewBuilder {
        let table = "00:00:0C\tCisco\tCisco Systems, Inc\n64:12:25\tCisco\tCisco Systems, Inc\nEC:74:BA\tHirschma\tHirschmann\n";
        ViewBuilder::new(
            VendorResolver::new(VendorDatabase::parse(table)),
            TimeNormalizer::new(),
        )
    }

    fn record_with(hostname: &str, address: &str, rows: Vec<crate::models::FieldMap>) -> DeviceRecord {
        let mut record = DeviceRecord::new(device(hostname, address));
        let records = CommandRecords::from_field_maps(CommandKind::ShowInterface, rows).unwrap();
        record.apply_outcome(CommandOutcome {
            kind: CommandKind::ShowInterface,
            parsed: true,
            result: Ok(records),
        });
        record
    }

    #[derive(Default)]
    struct Counting {
        reports: usize,
        last_total: usize,
    }

    impl ProgressReporter for Counting {
        fn report(&mut self, update: &ProgressUpdate) {
            self.reports += 1;
            self.last_total = update.total;
        }

        fn finish(&mut self, _total: usize) {}
    }

    #[test]
    fn test_row_enrichment() {
        let record = record_with(
            "edge-sw-01",
            "10.0.0.1",
            vec![interface_row("Gi0/1", "6412.2582.f13f", "3d04h")],
        );
        let rows = builder().build(&[record], &mut NoopProgress);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.switch_hostname, "edge-sw-01");
        assert_eq!(row.switch_ip_address, "10.0.0.1");
        assert_eq!(row.switch_region, "lab");
        assert_eq!(row.mac_vendor, "Cisco");
        assert_eq!(row.converted_last_input, "3d4h");
        assert_eq!(row.converted_last_output, "1s");
        assert_eq!(row.interface.interface, "Gi0/1");
    }

    #[test]
    fn test_lookup_failures_stay_in_their_field() {
        let record = record_with(
            "edge-sw-01",
            "10.0.0.1",
            vec![
                interface_row("Vlan1", "", "yesterday"),
                interface_row("Gi0/2", "aabb.ccdd.eeff", "never"),
            ],
        );
        let rows = builder().build(&[record], &mut NoopProgress);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].mac_vendor, INVALID_MAC_FORMAT);
        assert_eq!(rows[0].converted_last_input, UNRECOGNIZED_TIME);
        assert_eq!(rows[1].mac_vendor, "");
        assert_eq!(rows[1].converted_last_input, "never");
        assert!(rows.iter().all(ViewRow::vendor_unresolved));
    }

    #[test]
    fn test_row_count_matches_interfaces_and_progress() {
        let records = vec![
            record_with(
                "sw-a",
                "10.0.0.1",
                vec![
                    interface_row("Gi0/1", "0000.0c00.0001", "never"),
                    interface_row("Gi0/2", "ec74.ba00.0002", "never"),
                ],
            ),
            DeviceRecord::new(device("sw-b", "10.0.0.2")),
            record_with(
                "sw-c",
                "10.0.0.3",
                vec![interface_row("Gi0/1", "0000.0c00.0003", "00:00:05")],
            ),
        ];
        let mut progress = Counting::default();
        let rows = builder().build(&records, &mut progress);

        assert_eq!(rows.len(), 3);
        assert_eq!(progress.reports, 3);
        assert_eq!(progress.last_total, 3);

        let summary = ViewBuilder::summarize(&rows);
        assert_eq!(summary.row_count, 3);
        assert_eq!(summary.device_count, 2);
        assert_eq!(summary.vendors.count(&"Cisco".to_string()), 2);
        assert_eq!(summary.vendors.count(&"Hirschma".to_string()), 1);
        assert_eq!(summary.unresolved_vendors, 0);
    }

    #[test]
    fn test_row_serializes_flat() {
        let record = record_with(
            "edge-sw-01",
            "10.0.0.1",
            vec![interface_row("Gi0/1", "6412.2582.f13f", "never")],
        );
        let rows = builder().build(&[record], &mut NoopProgress);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["switch_hostname"], "edge-sw-01");
        assert_eq!(json["INTERFACE"], "Gi0/1");
        assert_eq!(json["mac_vendor"], "Cisco");
    }
}
