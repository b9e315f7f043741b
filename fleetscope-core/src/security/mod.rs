//! Credential protection for device sessions.
//!
//! # Security Guarantees
//! - Credentials are stored in `Zeroizing` containers for automatic memory clearing
//! - Passwords and privileged secrets are masked in `Debug`, serialized output and errors
//! - Device records carry redacted credentials once their pass is complete
//!
//! # Module Structure
//! - `credentials`: Device credential bundle with validation and redaction

mod credentials;

pub use credentials::{DEFAULT_DEVICE_KIND, DeviceCredentials};
