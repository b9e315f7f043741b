//! Reading sweep documents written by the collector.

use fleetscope_core::error::FleetError;
use fleetscope_core::{Result, SweepResult};
use std::path::Path;

/// True if `path` names a zstd-compressed document
pub fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "zst")
}

/// Loads a sweep document, plain or compressed.
///
/// # Errors
/// - `FleetError::Io` if the file cannot be read or decompressed
/// - `FleetError::Configuration` for a compressed file when built without
///   the `compression` feature
/// - `FleetError::Serialization` if the JSON is not a sweep document
pub async fn load_sweep(path: &Path) -> Result<SweepResult> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| FleetError::io(format!("Failed to read {}", path.display()), e))?;

    let json = if is_compressed(path) {
        decompress(&bytes, path)?
    } else {
        bytes
    };

    let text = String::from_utf8(json).map_err(|e| {
        FleetError::io(
            format!("{} is not UTF-8 text", path.display()),
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })?;
    let result = SweepResult::from_json(&text)?;
    tracing::info!(
        "Loaded sweep {} ({} records, {} failures) from {}",
        result.metadata.sweep_id,
        result.records.len(),
        result.failures.len(),
        path.display()
    );
    Ok(result)
}

#[cfg(feature = "compression")]
fn decompress(bytes: &[u8], path: &Path) -> Result<Vec<u8>> {
    zstd::decode_all(bytes)
        .map_err(|e| FleetError::io(format!("Failed to decompress {}", path.display()), e))
}

#[cfg(not(feature = "compression"))]
fn decompress(_bytes: &[u8], path: &Path) -> Result<Vec<u8>> {
    Err(FleetError::configuration(format!(
        "{} is compressed. Compile with --features compression",
        path.display()
    )))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EMPTY_SWEEP: &str = r#"{
        "records": [],
        "failures": [],
        "metadata": {
            "sweep_id": "7d3f0c2e-4b1a-4c55-9a0e-2f6b8d1c9e47",
            "started_at": "2026-03-02T08:15:00Z",
            "total_duration_ms": 12,
            "devices_attempted": 0,
            "devices_collected": 0,
            "devices_failed": 0,
            "max_concurrency": 1,
            "collector_version": "0.1.0",
            "command_tally": { "succeeded": {}, "failed": {} },
            "warnings": ["empty device list"]
        }
    }"#;

    #[test]
    fn test_input_compression_detection() {
        assert!(is_compressed(Path::new("sweep.json.zst")));
        assert!(!is_compressed(Path::new("sweep.json")));
        assert!(!is_compressed(Path::new("zst")));
    }

    #[tokio::test]
    async fn test_input_plain_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.json");
        std::fs::write(&path, EMPTY_SWEEP).unwrap();

        let result = load_sweep(&path).await.unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.metadata.warnings, vec!["empty device list"]);
    }

    #[tokio::test]
    async fn test_input_missing_file() {
        let error = load_sweep(Path::new("/nonexistent/sweep.json")).await.unwrap_err();
        assert!(matches!(error, FleetError::Io { .. }));
    }

    #[tokio::test]
    async fn test_input_wrong_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        std::fs::write(&path, r#"{"regions": []}"#).unwrap();

        let error = load_sweep(&path).await.unwrap_err();
        assert!(matches!(error, FleetError::Serialization { .. }));
    }

    #[cfg(feature = "compression")]
    #[tokio::test]
    async fn test_input_compressed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.json.zst");
        std::fs::write(&path, zstd::encode_all(EMPTY_SWEEP.as_bytes(), 3).unwrap()).unwrap();

        let result = load_sweep(&path).await.unwrap();
        assert_eq!(result.metadata.total_duration_ms, 12);
    }
}
