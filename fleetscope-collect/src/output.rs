//! File output for sweep results and audit trails.
//!
//! Sweep documents are written as pretty JSON, or zstd-compressed JSON when
//! built with the `compression` feature. The audit trail is written as JSON
//! lines next to it.

use fleetscope_core::error::FleetError;
use fleetscope_core::{AuditLog, Result, SweepResult};
use std::path::{Path, PathBuf};

/// Default sweep document name
pub const DEFAULT_OUTPUT: &str = "sweep.fleetscope.json";

/// Extension appended to compressed documents
pub const COMPRESSED_EXTENSION: &str = "zst";

/// Compression level used for sweep documents
#[cfg(feature = "compression")]
const ZSTD_LEVEL: i32 = 3;

/// Final path for a document written to `requested`.
///
/// Compressed output always ends in `.zst`.
pub fn output_path(requested: &Path, compress: bool) -> PathBuf {
    let already_compressed = requested
        .extension()
        .is_some_and(|ext| ext == COMPRESSED_EXTENSION);
    if compress && !already_compressed {
        let mut name = requested.as_os_str().to_os_string();
        name.push(".");
        name.push(COMPRESSED_EXTENSION);
        PathBuf::from(name)
    } else {
        requested.to_path_buf()
    }
}

/// Writes the sweep document and returns the path written.
///
/// # Errors
/// - `FleetError::Serialization` if the document cannot be encoded
/// - `FleetError::Configuration` if compression is requested but not built in
/// - `FleetError::Io` if the file cannot be written
pub async fn save_sweep(result: &SweepResult, requested: &Path, compress: bool) -> Result<PathBuf> {
    let json_data = result.to_json()?;
    let path = output_path(requested, compress);

    if compress {
        #[cfg(feature = "compression")]
        {
            save_compressed(&json_data, &path).await?;
        }
        #[cfg(not(feature = "compression"))]
        {
            return Err(FleetError::configuration(
                "Compression not available. Compile with --features compression",
            ));
        }
    } else {
        save_json(&json_data, &path).await?;
    }

    tracing::info!("Sweep document saved to {}", path.display());
    Ok(path)
}

/// Writes JSON text to `path`
pub async fn save_json(json_data: &str, path: &Path) -> Result<()> {
    tokio::fs::write(path, json_data)
        .await
        .map_err(|e| FleetError::io(format!("Failed to write to {}", path.display()), e))
}

#[cfg(feature = "compression")]
async fn save_compressed(json_data: &str, path: &Path) -> Result<()> {
    let compressed = zstd::encode_all(json_data.as_bytes(), ZSTD_LEVEL)
        .map_err(|e| FleetError::io("Compression failed", e))?;

    tokio::fs::write(path, compressed).await.map_err(|e| {
        FleetError::io(
            format!("Failed to write compressed file to {}", path.display()),
            e,
        )
    })
}

/// Writes the audit trail as JSON lines and returns the entry count
pub async fn save_audit_log(audit: &AuditLog, path: &Path) -> Result<usize> {
    let lines = audit.to_json_lines()?;
    tokio::fs::write(path, lines).await.map_err(|e| {
        FleetError::io(format!("Failed to write audit log to {}", path.display()), e)
    })?;
    tracing::info!("Audit trail ({} entries) saved to {}", audit.len(), path.display());
    Ok(audit.len())
}
