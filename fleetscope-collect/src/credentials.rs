//! Credential resolution for device sessions.
//!
//! Passwords and privileged secrets are never accepted as plain
//! command-line values. Each one is read from a file named on the command
//! line, then from the environment, then from an interactive prompt.
//!
//! # Security
//! - Values are held in `Zeroizing` containers until they are handed to
//!   [`DeviceCredentials`]
//! - Nothing here logs a value; log lines only name the source

use fleetscope_core::error::FleetError;
use fleetscope_core::{DeviceCredentials, Result};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Environment variable holding the login username
pub const USERNAME_ENV: &str = "FLEETSCOPE_USERNAME";

/// Environment variable holding the login password
pub const PASSWORD_ENV: &str = "FLEETSCOPE_PASSWORD";

/// Environment variable holding the privileged-mode secret
pub const SECRET_ENV: &str = "FLEETSCOPE_SECRET";

/// Where a secret value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read from a file given on the command line
    File(PathBuf),
    /// Read from an environment variable
    Environment(&'static str),
    /// Typed at an interactive prompt
    Prompt,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::File(path) => write!(f, "file {}", path.display()),
            CredentialSource::Environment(var) => write!(f, "environment variable {}", var),
            CredentialSource::Prompt => write!(f, "interactive prompt"),
        }
    }
}

/// One secret to resolve
#[derive(Debug, Clone, Copy)]
pub struct SecretRequest<'a> {
    /// Field name reported when nothing is found
    pub field: &'static str,
    pub file: Option<&'a Path>,
    pub env_var: &'static str,
    /// Text shown at the prompt
    pub prompt: &'static str,
}

/// Resolves one secret: file, then environment, then prompt.
///
/// A file's trailing line ending is dropped. An environment variable that is
/// set but empty counts as absent.
///
/// # Errors
/// - `FleetError::Io` if the named file cannot be read
/// - `FleetError::MissingCredential` if no source yields a value and
///   prompting is not allowed
/// - `FleetError::Configuration` if the prompt cannot read the terminal
pub fn resolve_secret(
    request: SecretRequest<'_>,
    allow_prompt: bool,
) -> Result<(Zeroizing<String>, CredentialSource)> {
    if let Some(path) = request.file {
        let text = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
            FleetError::io(
                format!("Failed to read {} file {}", request.field, path.display()),
                e,
            )
        })?);
        let value = Zeroizing::new(text.trim_end_matches(['\r', '\n']).to_string());
        return Ok((value, CredentialSource::File(path.to_path_buf())));
    }

    if let Ok(value) = std::env::var(request.env_var) {
        let value = Zeroizing::new(value);
        if !value.is_empty() {
            return Ok((value, CredentialSource::Environment(request.env_var)));
        }
    }

    if !allow_prompt {
        return Err(FleetError::MissingCredential {
            field: request.field,
        });
    }

    let value = rpassword::prompt_password(request.prompt).map_err(|e| {
        FleetError::configuration(format!("Failed to read {}: {}", request.field, e))
    })?;
    Ok((Zeroizing::new(value), CredentialSource::Prompt))
}

/// Command-line inputs for building the credential template
#[derive(Debug, Clone, Default)]
pub struct CredentialInputs {
    pub device_kind: String,
    pub username: Option<String>,
    pub password_file: Option<PathBuf>,
    pub secret_file: Option<PathBuf>,
    pub allow_prompt: bool,
}

/// Builds the credential template shared by every inventory node.
///
/// The host is left empty; the inventory fills it in per node.
///
/// # Errors
/// Returns `FleetError::MissingCredential` if the username or either secret
/// cannot be found, or the I/O error of a credential file.
pub fn resolve_credentials(inputs: &CredentialInputs) -> Result<DeviceCredentials> {
    let username = inputs
        .username
        .clone()
        .filter(|name| !name.trim().is_empty())
        .ok_or(FleetError::MissingCredential { field: "username" })?;

    let (password, password_source) = resolve_secret(
        SecretRequest {
            field: "password",
            file: inputs.password_file.as_deref(),
            env_var: PASSWORD_ENV,
            prompt: "Device password: ",
        },
        inputs.allow_prompt,
    )?;
    tracing::debug!("Password loaded from {}", password_source);

    let (secret, secret_source) = resolve_secret(
        SecretRequest {
            field: "privileged secret",
            file: inputs.secret_file.as_deref(),
            env_var: SECRET_ENV,
            prompt: "Privileged-mode secret: ",
        },
        inputs.allow_prompt,
    )?;
    tracing::debug!("Privileged secret loaded from {}", secret_source);

    Ok(DeviceCredentials::new(
        inputs.device_kind.as_str(),
        "",
        username,
        password.as_str(),
        secret.as_str(),
    ))
}
