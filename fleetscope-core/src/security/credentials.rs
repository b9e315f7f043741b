//! Device credential bundle with automatic memory zeroing.
//!
//! This module provides `DeviceCredentials`, the connection data handed to a
//! session transport: device kind, management address, username, password
//! and privileged-mode secret.
//!
//! # Security
//! - Username, password and secret live in `Zeroizing<String>` containers
//! - Memory is cleared when the bundle goes out of scope
//! - `Debug` and `Serialize` always mask the password and secret
//! - `redact()` overwrites the secrets in place once a device pass is done

use crate::error::{FleetError, REDACTED_MASK, Result, redact_secret};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

/// Device kind used when the inventory does not name one.
pub const DEFAULT_DEVICE_KIND: &str = "cisco_ios";

/// Credential bundle for one device session.
///
/// # Example
///
/// ```rust
/// use fleetscope_core::security::DeviceCredentials;
///
/// let mut creds = DeviceCredentials::new("cisco_ios", "10.0.0.1", "netops", "pw", "enable");
/// assert!(creds.validate().is_ok());
/// creds.redact();
/// assert_eq!(creds.password(), "********");
/// ```
#[derive(Clone, Zeroize, Serialize, Deserialize)]
#[zeroize(drop)]
#[serde(into = "MaskedCredentials", from = "MaskedCredentials")]
pub struct DeviceCredentials {
    device_kind: String,
    host: String,
    username: Zeroizing<String>,
    password: Zeroizing<String>,
    secret: Zeroizing<String>,
}

impl DeviceCredentials {
    /// Creates a credential bundle with automatic memory zeroing.
    ///
    /// No validation happens here; sessions call [`validate`](Self::validate)
    /// before any transport is touched.
    pub fn new(
        device_kind: impl Into<String>,
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            device_kind: device_kind.into(),
            host: host.into(),
            username: Zeroizing::new(username.into()),
            password: Zeroizing::new(password.into()),
            secret: Zeroizing::new(secret.into()),
        }
    }

    /// Device kind understood by the transport (e.g. `cisco_ios`)
    pub fn device_kind(&self) -> &str {
        &self.device_kind
    }

    /// Management address the session connects to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Login username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Login password (the mask once redacted)
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Privileged-mode secret (the mask once redacted)
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Returns a copy of this bundle pointed at another address.
    pub fn for_host(&self, host: impl Into<String>) -> Self {
        let mut creds = self.clone();
        creds.host = host.into();
        creds
    }

    /// Checks that every field carries a non-blank value.
    ///
    /// # Errors
    /// Returns `FleetError::MissingCredential` naming the first empty or
    /// whitespace-only field. The value itself is never reported.
    pub fn validate(&self) -> Result<()> {
        let fields: [(&'static str, &str); 5] = [
            ("device kind", &self.device_kind),
            ("address", &self.host),
            ("username", &self.username),
            ("password", &self.password),
            ("privileged secret", &self.secret),
        ];

        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(FleetError::MissingCredential { field });
            }
        }
        Ok(())
    }

    /// Overwrites the password and secret with the fixed mask.
    ///
    /// The previous values are zeroed when their containers drop.
    pub fn redact(&mut self) {
        self.password = Zeroizing::new(redact_secret(&self.password));
        self.secret = Zeroizing::new(redact_secret(&self.secret));
    }

    /// True once both secrets are masked or empty.
    pub fn is_redacted(&self) -> bool {
        [self.password.as_str(), self.secret.as_str()]
            .iter()
            .all(|value| value.is_empty() || *value == REDACTED_MASK)
    }
}

impl std::fmt::Debug for DeviceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCredentials")
            .field("device_kind", &self.device_kind)
            .field("host", &self.host)
            .field("username", &self.username.as_str())
            .field("password", &redact_secret(&self.password))
            .field("secret", &redact_secret(&self.secret))
            .finish()
    }
}

/// Serialized form of [`DeviceCredentials`]; secrets are always masked.
#[derive(Serialize, Deserialize)]
struct MaskedCredentials {
    device_type: String,
    host: String,
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    secret: String,
}

impl From<DeviceCredentials> for MaskedCredentials {
    fn from(creds: DeviceCredentials) -> Self {
        Self {
            device_type: creds.device_kind.clone(),
            host: creds.host.clone(),
            username: creds.username.to_string(),
            password: redact_secret(&creds.password),
            secret: redact_secret(&creds.secret),
        }
    }
}

impl From<MaskedCredentials> for DeviceCredentials {
    fn from(masked: MaskedCredentials) -> Self {
        Self::new(
            masked.device_type,
            masked.host,
            masked.username,
            masked.password,
            masked.secret,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeviceCredentials {
        DeviceCredentials::new(
            DEFAULT_DEVICE_KIND,
            "10.95.72.22",
            "netops",
            "s3cret-pass",
            "en4ble",
        )
    }

    #[test]
    fn test_credentials_validate_ok() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_credentials_blank_fields_rejected() {
        let cases = [
            (DeviceCredentials::new("", "h", "u", "p", "s"), "device kind"),
            (DeviceCredentials::new("k", "  ", "u", "p", "s"), "address"),
            (DeviceCredentials::new("k", "h", "\t", "p", "s"), "username"),
            (DeviceCredentials::new("k", "h", "u", "", "s"), "password"),
            (DeviceCredentials::new("k", "h", "u", "p", " "), "privileged secret"),
        ];

        for (creds, expected) in cases {
            match creds.validate() {
                Err(FleetError::MissingCredential { field }) => assert_eq!(field, expected),
                other => panic!("expected missing {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_credentials_redact() {
        let mut creds = sample();
        assert!(!creds.is_redacted());
        creds.redact();
        assert!(creds.is_redacted());
        assert_eq!(creds.password(), REDACTED_MASK);
        assert_eq!(creds.secret(), REDACTED_MASK);
        assert_eq!(creds.username(), "netops");
    }

    #[test]
    fn test_credentials_debug_masks_secrets() {
        let debug = format!("{:?}", sample());
        assert!(!debug.contains("s3cret-pass"));
        assert!(!debug.contains("en4ble"));
        assert!(debug.contains("netops"));
    }

    #[test]
    fn test_credentials_serialize_masks_secrets() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("s3cret-pass"));
        assert!(!json.contains("en4ble"));
        assert!(json.contains("\"device_type\":\"cisco_ios\""));
        assert!(json.contains(REDACTED_MASK));

        let back: DeviceCredentials = serde_json::from_str(&json).unwrap();
        assert_eq!(back.host(), "10.95.72.22");
        assert!(back.is_redacted());
    }

    #[test]
    fn test_credentials_for_host() {
        let template = DeviceCredentials::new(DEFAULT_DEVICE_KIND, "", "u", "p", "s");
        let creds = template.for_host("192.0.2.7");
        assert_eq!(creds.host(), "192.0.2.7");
        assert_eq!(template.host(), "");
        assert_eq!(creds.password(), "p");
    }
}
