//! Error types with credential masking.
//!
//! Every error in this module is safe to log: passwords and privileged
//! secrets are never interpolated into messages. Credential problems name
//! the offending field, not its value.

use crate::models::FailureCategory;
use thiserror::Error;

/// Fixed mask written in place of a password or privileged secret.
pub const REDACTED_MASK: &str = "********";

/// Main error type for FleetScope operations.
///
/// # Security
/// Messages carry hostnames, command texts and template identifiers, but
/// never credential values.
#[derive(Debug, Error)]
pub enum FleetError {
    /// The session transport refused or dropped the connection
    #[error("Device connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A required credential field was empty or whitespace-only
    #[error("Missing credential field: {field}")]
    MissingCredential { field: &'static str },

    /// Transport-level failure while a command was running
    #[error("Command '{command}' failed: {context}")]
    CommandExecution { command: String, context: String },

    /// The parser rejected a command's output
    #[error("Template '{template}' could not parse output: {context}")]
    Parse { template: String, context: String },

    /// A parsed field map did not fit the typed record for its command
    #[error("Malformed {kind} record: {context}")]
    MalformedRecord { kind: String, context: String },

    /// Hardware address is not 12 hex digits after normalization
    #[error("Invalid MAC address format: {input}")]
    AddressFormat { input: String },

    /// Relative time string matched none of the known shapes
    #[error("Unrecognized time format: {input}")]
    TimeFormat { input: String },

    /// Command kind name not present in the catalogue
    #[error("Unknown command kind: {name}")]
    UnknownCommandKind { name: String },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Vendor table could not be fetched or read
    #[error("Vendor table unavailable: {context}")]
    VendorSource {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with FleetError
pub type Result<T> = std::result::Result<T, FleetError>;

/// Replaces a secret with [`REDACTED_MASK`] unless it is empty.
///
/// Empty values stay empty so that a missing secret is still visible as
/// missing in output.
///
/// # Example
///
/// ```rust
/// use fleetscope_core::error::redact_secret;
///
/// assert_eq!(redact_secret("hunter2"), "********");
/// assert_eq!(redact_secret(""), "");
/// ```
pub fn redact_secret(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        REDACTED_MASK.to_string()
    }
}

impl FleetError {
    /// Creates a connection error with a sanitized context
    pub fn connection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a connection refusal without an underlying error value
    pub fn connection_refused(context: impl Into<String>) -> Self {
        let context = context.into();
        Self::Connection {
            source: context.clone().into(),
            context,
        }
    }

    /// Creates a command execution error
    pub fn command_failed(command: impl Into<String>, context: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            context: context.into(),
        }
    }

    /// Creates a parse error for a template
    pub fn parse_failed(template: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Parse {
            template: template.into(),
            context: context.into(),
        }
    }

    /// Creates a malformed record error
    pub fn malformed_record(kind: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MalformedRecord {
            kind: kind.into(),
            context: context.into(),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a vendor source error
    pub fn vendor_source<E>(context: impl Into<String>, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::VendorSource {
            context: context.into(),
            source: error.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Returns true if this error ends processing of a device.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::MissingCredential { .. }
        )
    }

    /// Classifies the error for the device status narrative.
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::MalformedRecord { .. } => FailureCategory::MalformedInput,
            Self::CommandExecution { .. } | Self::Parse { .. } => FailureCategory::ExecutionOrParse,
            _ => FailureCategory::Unclassified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_secret() {
        let redacted = redact_secret("enable_password");
        assert_eq!(redacted, REDACTED_MASK);
        assert!(!redacted.contains("enable"));
    }

    #[test]
    fn test_redact_empty_secret() {
        assert_eq!(redact_secret(""), "");
    }

    #[test]
    fn test_missing_credential_names_field_only() {
        let error = FleetError::MissingCredential { field: "password" };
        assert_eq!(error.to_string(), "Missing credential field: password");
        assert!(error.is_connection_error());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            FleetError::malformed_record("interface", "unknown field `FOO`").category(),
            FailureCategory::MalformedInput
        );
        assert_eq!(
            FleetError::command_failed("show version", "timed out").category(),
            FailureCategory::ExecutionOrParse
        );
        assert_eq!(
            FleetError::parse_failed("cisco_ios_show_version", "no match").category(),
            FailureCategory::ExecutionOrParse
        );
        assert_eq!(
            FleetError::configuration("bad").category(),
            FailureCategory::Unclassified
        );
    }

    #[test]
    fn test_connection_refused_is_terminal() {
        let error = FleetError::connection_refused("no route to 10.0.0.1");
        assert!(error.is_connection_error());
        assert!(error.to_string().contains("10.0.0.1"));
        assert!(!FleetError::command_failed("show arp", "eof").is_connection_error());
    }
}
