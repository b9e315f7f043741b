//! Device session lifecycle: connect, enable, run commands, disconnect.
//!
//! The wire protocol lives behind [`SessionTransport`]; this module owns the
//! lifecycle around it. Credentials are checked before any transport call,
//! every command and its raw output is appended to the [`AuditLog`], and a
//! broken session can always be disconnected without panicking.
//!
//! # Module Structure
//! - `audit`: Append-only audit trail shared across sessions
//! - `replay`: Transport that serves captured command output from disk

use crate::Result;
use crate::error::FleetError;
use crate::models::DeviceDescriptor;
use crate::security::DeviceCredentials;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

pub mod audit;
pub mod replay;

pub use audit::{AuditEntry, AuditEvent, AuditLog};
pub use replay::ReplayTransport;

/// Opens sessions to devices.
///
/// # Object Safety
/// This trait is object-safe, allowing `Arc<dyn SessionTransport>`.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Opens and authenticates a session.
    ///
    /// # Errors
    /// Returns `FleetError::Connection` if the device refuses or cannot be reached.
    async fn open(&self, credentials: &DeviceCredentials) -> Result<Box<dyn SessionHandle>>;
}

/// An open command shell on one device.
#[async_trait]
pub trait SessionHandle: Send {
    /// Switches the shell into privileged mode using `secret`.
    async fn enter_privileged_mode(&mut self, secret: &str) -> Result<()>;

    /// Sends one command and returns its raw text output.
    async fn send_command(&mut self, command: &str) -> Result<String>;

    /// Closes the shell.
    async fn close(&mut self) -> Result<()>;
}

/// Lifecycle state of a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Privileged,
    /// A transport call failed; only disconnect is meaningful
    Broken,
    Closed,
}

/// A connected device session owned by the caller.
pub struct Session {
    hostname: String,
    secret: zeroize::Zeroizing<String>,
    handle: Box<dyn SessionHandle>,
    state: SessionState,
}

impl Session {
    /// Hostname the session belongs to
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("hostname", &self.hostname)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Owns the connect/enable/run/disconnect lifecycle for device sessions.
#[derive(Clone)]
pub struct SessionManager {
    transport: Arc<dyn SessionTransport>,
    audit: AuditLog,
}

impl SessionManager {
    /// Creates a manager over `transport`, recording into `audit`
    pub fn new(transport: Arc<dyn SessionTransport>, audit: AuditLog) -> Self {
        Self { transport, audit }
    }

    /// The audit trail this manager appends to
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Validates credentials and opens a session.
    ///
    /// # Errors
    /// - `FleetError::MissingCredential` if any credential field is blank;
    ///   the transport is not touched in that case
    /// - `FleetError::Connection` if the transport refuses
    pub async fn connect(&self, device: &DeviceDescriptor) -> Result<Session> {
        device.credentials.validate().map_err(|e| {
            warn!("{}: credentials rejected before connect: {}", device.hostname, e);
            e
        })?;

        let handle = match self.transport.open(&device.credentials).await {
            Ok(handle) => handle,
            Err(e) => {
                self.audit.record(
                    &device.hostname,
                    AuditEvent::Failure {
                        stage: "connect".to_string(),
                        message: e.to_string(),
                    },
                );
                return Err(e);
            }
        };

        self.audit.record(
            &device.hostname,
            AuditEvent::SessionOpened {
                device_kind: device.credentials.device_kind().to_string(),
                address: device.address.clone(),
            },
        );
        debug!("{}: session opened", device.hostname);

        Ok(Session {
            hostname: device.hostname.clone(),
            secret: zeroize::Zeroizing::new(device.credentials.secret().to_string()),
            handle,
            state: SessionState::Open,
        })
    }

    /// Enters privileged mode with the device's secret.
    ///
    /// # Errors
    /// Returns the transport error; the session is marked broken.
    pub async fn enter_privileged_mode(&self, session: &mut Session) -> Result<()> {
        self.ensure_usable(session, "enable")?;
        match session.handle.enter_privileged_mode(&session.secret).await {
            Ok(()) => {
                session.state = SessionState::Privileged;
                self.audit.record(&session.hostname, AuditEvent::PrivilegedMode);
                Ok(())
            }
            Err(e) => {
                session.state = SessionState::Broken;
                self.record_failure(session, "enable", &e);
                Err(e)
            }
        }
    }

    /// Runs one command and returns its raw output.
    ///
    /// # Errors
    /// Returns `FleetError::CommandExecution` (or the transport's own error);
    /// a connection-level failure marks the session broken.
    pub async fn run_command(&self, session: &mut Session, command: &str) -> Result<String> {
        self.ensure_usable(session, command)?;
        self.audit.record(
            &session.hostname,
            AuditEvent::CommandSent {
                command: command.to_string(),
            },
        );

        match session.handle.send_command(command).await {
            Ok(output) => {
                self.audit.record(
                    &session.hostname,
                    AuditEvent::OutputReceived {
                        command: command.to_string(),
                        bytes: output.len(),
                        output: output.clone(),
                    },
                );
                Ok(output)
            }
            Err(e) => {
                if e.is_connection_error() {
                    session.state = SessionState::Broken;
                }
                self.record_failure(session, command, &e);
                Err(e)
            }
        }
    }

    /// Closes the session.
    ///
    /// Never panics, whatever state the session is in. A close failure is
    /// returned for the caller to log; the session is consumed either way.
    pub async fn disconnect(&self, mut session: Session) -> Result<()> {
        if session.state == SessionState::Closed {
            return Ok(());
        }
        let result = session.handle.close().await;
        session.state = SessionState::Closed;
        match &result {
            Ok(()) => self.audit.record(&session.hostname, AuditEvent::SessionClosed),
            Err(e) => self.record_failure(&session, "disconnect", e),
        }
        result
    }

    /// Connects, enters privileged mode and disconnects again.
    ///
    /// # Errors
    /// Returns the first failure of the three steps.
    pub async fn probe(&self, device: &DeviceDescriptor) -> Result<()> {
        let mut session = self.connect(device).await?;
        let enabled = self.enter_privileged_mode(&mut session).await;
        let closed = self.disconnect(session).await;
        enabled.and(closed)
    }

    fn ensure_usable(&self, session: &Session, stage: &str) -> Result<()> {
        match session.state {
            SessionState::Open | SessionState::Privileged => Ok(()),
            SessionState::Broken | SessionState::Closed => Err(FleetError::command_failed(
                stage,
                format!("session to {} is no longer usable", session.hostname),
            )),
        }
    }

    fn record_failure(&self, session: &Session, stage: &str, error: &FleetError) {
        self.audit.record(
            &session.hostname,
            AuditEvent::Failure {
                stage: stage.to_string(),
                message: error.to_string(),
            },
        );
    }
}
