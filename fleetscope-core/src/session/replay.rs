//! Session transport backed by captured command output.
//!
//! Captures are laid out as `<root>/<address>/<command>.txt`, where the
//! command's spaces become underscores (`show mac address-table` is read
//! from `show_mac_address-table.txt`). A missing address directory is a
//! connection refusal; a missing capture is a command failure.

use super::{SessionHandle, SessionTransport};
use crate::Result;
use crate::error::FleetError;
use crate::security::DeviceCredentials;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Replays captured output instead of talking to live devices.
#[derive(Debug, Clone)]
pub struct ReplayTransport {
    root: PathBuf,
}

impl ReplayTransport {
    /// Creates a transport reading captures below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File name a command's capture is stored under
    pub fn capture_file_name(command: &str) -> String {
        format!("{}.txt", command.trim().replace(' ', "_"))
    }

    /// Path of the capture for `command` on `address`
    pub fn capture_path(&self, address: &str, command: &str) -> PathBuf {
        self.root
            .join(address)
            .join(Self::capture_file_name(command))
    }
}

#[async_trait]
impl SessionTransport for ReplayTransport {
    async fn open(&self, credentials: &DeviceCredentials) -> Result<Box<dyn SessionHandle>> {
        let device_dir = self.root.join(credentials.host());
        match tokio::fs::metadata(&device_dir).await {
            Ok(meta) if meta.is_dir() => Ok(Box::new(ReplaySession {
                device_dir,
                open: true,
            })),
            Ok(_) => Err(FleetError::connection_refused(format!(
                "capture path for {} is not a directory",
                credentials.host()
            ))),
            Err(e) => Err(FleetError::connection_failed(
                format!("no captures for {}", credentials.host()),
                e,
            )),
        }
    }
}

struct ReplaySession {
    device_dir: PathBuf,
    open: bool,
}

impl ReplaySession {
    fn capture(&self, command: &str) -> PathBuf {
        self.device_dir
            .join(ReplayTransport::capture_file_name(command))
    }
}

async fn read_capture(path: &Path, command: &str) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        FleetError::command_failed(command, format!("capture unavailable: {}", e.kind()))
    })
}

#[async_trait]
impl SessionHandle for ReplaySession {
    async fn enter_privileged_mode(&mut self, _secret: &str) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(FleetError::connection_refused("replay session already closed"))
        }
    }

    async fn send_command(&mut self, command: &str) -> Result<String> {
        if !self.open {
            return Err(FleetError::connection_refused("replay session already closed"));
        }
        read_capture(&self.capture(command), command).await
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }
}
