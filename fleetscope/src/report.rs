//! View documents and their JSON and Markdown renderings.

use askama::Template;
use fleetscope_core::error::FleetError;
use fleetscope_core::pagination::{PageSource, Paginator};
use fleetscope_core::{DeviceFailure, Result, SweepResult, VendorResolver, ViewRow, ViewSummary};
use serde::Serialize;

/// Rows per Markdown report page unless overridden
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// The port view of one sweep.
#[derive(Debug, Clone, Serialize)]
pub struct ViewDocument {
    pub sweep_id: String,
    pub started_at: String,
    pub collector_version: String,
    pub devices_attempted: usize,
    pub devices_failed: usize,
    pub summary: ViewSummary,
    pub rows: Vec<ViewRow>,
    /// Devices that produced no rows because they could not be reached
    pub failures: Vec<DeviceFailure>,
}

impl ViewDocument {
    /// Pairs built rows with the sweep they came from
    pub fn new(result: &SweepResult, rows: Vec<ViewRow>) -> Self {
        let meta = &result.metadata;
        Self {
            sweep_id: meta.sweep_id.to_string(),
            started_at: meta.started_at.to_rfc3339(),
            collector_version: meta.collector_version.clone(),
            devices_attempted: meta.devices_attempted,
            devices_failed: meta.devices_failed,
            summary: fleetscope_core::ViewBuilder::summarize(&rows),
            rows,
            failures: result.failures.clone(),
        }
    }

    /// Pretty JSON rendering
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FleetError::serialization("View document", e))
    }
}

/// One table cell row of the Markdown report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub switch: String,
    pub address: String,
    pub region: String,
    pub interface: String,
    pub mac_address: String,
    pub vendor: String,
    pub last_input: String,
    pub last_output: String,
}

impl From<&ViewRow> for ReportRow {
    fn from(row: &ViewRow) -> Self {
        Self {
            switch: cell(&row.switch_hostname),
            address: cell(&row.switch_ip_address),
            region: cell(&row.switch_region),
            interface: cell(&row.interface.interface),
            mac_address: cell(&row.interface.mac_address),
            vendor: cell(&row.mac_vendor),
            last_input: cell(&row.converted_last_input),
            last_output: cell(&row.converted_last_output),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorLine {
    pub name: String,
    pub full_name: String,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureLine {
    pub hostname: String,
    pub address: String,
    pub message: String,
}

/// Markdown report template
#[derive(Template)]
#[template(path = "view_report.md", escape = "none")]
pub struct MarkdownReport {
    pub sweep_id: String,
    pub started_at: String,
    pub collector_version: String,
    pub devices_attempted: usize,
    pub devices_failed: usize,
    pub summary: ViewSummary,
    pub pages: Vec<Vec<ReportRow>>,
    pub vendors: Vec<VendorLine>,
    pub failures: Vec<FailureLine>,
}

/// Markdown table cells cannot hold pipes or line breaks
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

impl MarkdownReport {
    /// Splits the document's rows into pages of `page_size`.
    ///
    /// Vendors are listed most common first, with full names from
    /// `resolver` where the table has one.
    ///
    /// # Errors
    /// Returns `FleetError::Configuration` for a zero page size.
    pub fn new(
        document: &ViewDocument,
        resolver: &VendorResolver,
        page_size: usize,
        max_pages: Option<usize>,
    ) -> Result<Self> {
        let mut paginator = Paginator::new(PageSource::from_slice(&document.rows), page_size);
        if let Some(limit) = max_pages {
            paginator = paginator.with_max_pages(limit);
        }
        let pages = paginator
            .pages()?
            .iter()
            .map(|page| page.iter().map(ReportRow::from).collect())
            .collect();

        let vendors = document
            .summary
            .vendors
            .most_common()
            .into_iter()
            .map(|(name, rows)| VendorLine {
                full_name: cell(resolver.database().full_name(name).unwrap_or_default()),
                name: cell(name),
                rows,
            })
            .collect();

        let failures = document
            .failures
            .iter()
            .map(|failure| FailureLine {
                hostname: cell(&failure.hostname),
                address: cell(&failure.address),
                message: cell(&failure.error_message),
            })
            .collect();

        Ok(Self {
            sweep_id: document.sweep_id.clone(),
            started_at: document.started_at.clone(),
            collector_version: document.collector_version.clone(),
            devices_attempted: document.devices_attempted,
            devices_failed: document.devices_failed,
            summary: document.summary.clone(),
            pages,
            vendors,
            failures,
        })
    }

    /// Renders the report text
    pub fn to_markdown(&self) -> Result<String> {
        self.render().map_err(|e| {
            FleetError::io("Failed to render Markdown report", std::io::Error::other(e))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fleetscope_core::{
        ConnectionStatus, DeviceCredentials, DeviceDescriptor, DeviceRecord, NoopProgress,
        TimeNormalizer, VendorDatabase, ViewBuilder,
    };
    use fleetscope_core::models::records::InterfaceRecord;

    const TABLE: &str = "64:12:25\tCisco\tCisco Systems, Inc\nEC:74:BA\tHirschma\tHirschmann Automation\n";

    fn interface(name: &str, mac: &str) -> InterfaceRecord {
        InterfaceRecord {
            interface: name.to_string(),
            mac_address: mac.to_string(),
            last_input: "1w2d".to_string(),
            last_output: "never".to_string(),
            ..InterfaceRecord::default()
        }
    }

    fn sweep() -> SweepResult {
        let creds = DeviceCredentials::new("cisco_ios", "", "netops", "pw", "en");
        let mut record = DeviceRecord::new(DeviceDescriptor::new("sw|a", "10.0.0.1", "west", &creds));
        record.connection_status = ConnectionStatus::DataRetrieved;
        record.interface_records = vec![
            interface("Gi0/1", "6412.2582.f13f"),
            interface("Gi0/2", "ec74.ba88.689a"),
            interface("Gi0/3", "6412.2582.0001"),
            interface("Vlan1", "bad"),
            interface("Gi0/5", "0000.0000.0001"),
        ];

        let mut result: SweepResult = serde_json::from_value(serde_json::json!({
            "records": [],
            "failures": [{
                "hostname": "sw-b",
                "address": "10.0.0.2",
                "status": "unable_to_connect",
                "error_message": "Device connection failed: no captures for 10.0.0.2",
                "is_connection_error": true
            }],
            "metadata": {
                "sweep_id": "7d3f0c2e-4b1a-4c55-9a0e-2f6b8d1c9e47",
                "started_at": "2026-03-02T08:15:00Z",
                "total_duration_ms": 40,
                "devices_attempted": 2,
                "devices_collected": 1,
                "devices_failed": 1,
                "max_concurrency": 1,
                "collector_version": "0.1.0",
                "command_tally": { "succeeded": {}, "failed": {} },
                "warnings": []
            }
        }))
        .unwrap();
        result.records.push(record);
        result
    }

    fn document() -> (ViewDocument, VendorResolver) {
        let result = sweep();
        let resolver = VendorResolver::new(VendorDatabase::parse(TABLE));
        let rows = ViewBuilder::new(resolver.clone(), TimeNormalizer::new())
            .build(&result.records, &mut NoopProgress);
        (ViewDocument::new(&result, rows), resolver)
    }

    #[test]
    fn test_report_document_summary() {
        let (document, _) = document();
        assert_eq!(document.rows.len(), 5);
        assert_eq!(document.summary.row_count, 5);
        assert_eq!(document.summary.unresolved_vendors, 2);
        assert_eq!(document.summary.vendors.count(&"Cisco".to_string()), 2);
        assert_eq!(document.devices_failed, 1);
    }

    #[test]
    fn test_report_json_has_flattened_rows() {
        let (document, _) = document();
        let value: serde_json::Value = serde_json::from_str(&document.to_json().unwrap()).unwrap();
        let first = &value["rows"][0];
        assert_eq!(first["switch_hostname"], "sw|a");
        assert_eq!(first["INTERFACE"], "Gi0/1");
        assert_eq!(first["mac_vendor"], "Cisco");
        assert_eq!(first["converted_last_input"], "1w2d");
        assert_eq!(value["summary"]["row_count"], 5);
    }

    #[test]
    fn test_render_markdown_pages_and_vendors() {
        let (document, resolver) = document();
        let report = MarkdownReport::new(&document, &resolver, 2, None).unwrap();
        assert_eq!(report.pages.len(), 3);
        assert_eq!(report.vendors[0].name, "Cisco");
        assert_eq!(report.vendors[0].full_name, "Cisco Systems, Inc");
        assert_eq!(report.vendors[0].rows, 2);

        let text = report.to_markdown().unwrap();
        assert!(text.starts_with("# FleetScope Port View"));
        assert!(text.contains("## Page 1 of 3"));
        assert!(text.contains("## Page 3 of 3"));
        assert!(text.contains("| sw\\|a | 10.0.0.1 | west | Gi0/1 | 6412.2582.f13f | Cisco | 1w2d | never |"));
        assert!(text.contains("| Invalid MAC format |"));
        assert!(text.contains("| Hirschma | Hirschmann Automation | 1 |"));
        assert!(text.contains("## Unable to Connect"));
        assert!(text.contains("| sw-b | 10.0.0.2 |"));
    }

    #[test]
    fn test_render_markdown_table_rows_are_contiguous() {
        let (document, resolver) = document();
        let text = MarkdownReport::new(&document, &resolver, 10, None)
            .unwrap()
            .to_markdown()
            .unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let header = lines.iter().position(|line| line.starts_with("| Switch | IP Address | Region")).unwrap();
        assert!(lines[header + 1].starts_with("|---"));
        for line in &lines[header + 2..header + 7] {
            assert!(line.starts_with("| sw\\|a"), "unexpected line {:?}", line);
        }
        assert_eq!(lines[header + 7], "");
    }

    #[test]
    fn test_render_markdown_page_limit_and_zero_size() {
        let (document, resolver) = document();
        let report = MarkdownReport::new(&document, &resolver, 2, Some(1)).unwrap();
        assert_eq!(report.pages.len(), 1);
        assert!(report.to_markdown().unwrap().contains("## Page 1 of 1"));

        let error = MarkdownReport::new(&document, &resolver, 0, None).err().unwrap();
        assert!(matches!(error, FleetError::Configuration { .. }));
    }

    #[test]
    fn test_render_markdown_without_failures_omits_section() {
        let (mut document, resolver) = document();
        document.failures.clear();
        let text = MarkdownReport::new(&document, &resolver, 50, None)
            .unwrap()
            .to_markdown()
            .unwrap();
        assert!(!text.contains("Unable to Connect"));
    }

    #[test]
    fn test_cell_escapes_pipes_and_newlines() {
        assert_eq!(cell("a|b\nc"), "a\\|b c");
    }
}
