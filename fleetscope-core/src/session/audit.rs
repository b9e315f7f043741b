//! Append-only audit trail of session activity.
//!
//! Entries are kept in memory for the lifetime of the process and mirrored
//! to `tracing` under the `fleetscope::audit` target. Nothing in the sweep
//! reads them back; the collector writes them out as JSON lines.

use crate::error::{FleetError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// What happened on a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    SessionOpened { device_kind: String, address: String },
    PrivilegedMode,
    CommandSent { command: String },
    OutputReceived { command: String, bytes: usize, output: String },
    SessionClosed,
    Failure { stage: String, message: String },
}

/// One audit line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub hostname: String,
    #[serde(flatten)]
    pub event: AuditEvent,
}

/// Cloneable handle to the shared append-only audit trail.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl AuditLog {
    /// Creates an empty audit trail
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event for `hostname`
    pub fn record(&self, hostname: &str, event: AuditEvent) {
        tracing::debug!(target: "fleetscope::audit", hostname, ?event, "audit");
        let entry = AuditEntry {
            timestamp: Utc::now(),
            hostname: hostname.to_string(),
            event,
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every entry recorded so far
    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Renders the trail as JSON lines.
    ///
    /// # Errors
    /// Returns `FleetError::Serialization` if an entry cannot be encoded.
    pub fn to_json_lines(&self) -> Result<String> {
        let mut out = String::new();
        for entry in self.snapshot() {
            let line = serde_json::to_string(&entry)
                .map_err(|e| FleetError::serialization("audit entry", e))?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }
}
