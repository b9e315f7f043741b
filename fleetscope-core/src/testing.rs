//! In-memory transport and parser doubles for unit tests.

use crate::error::{FleetError, Result};
use crate::models::{CommandKind, DeviceDescriptor, FieldMap};
use crate::parser::CommandResultParser;
use crate::security::{DEFAULT_DEVICE_KIND, DeviceCredentials};
use crate::session::{SessionHandle, SessionTransport};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Commands sent, as (address, command text)
pub(crate) type SentLog = Arc<Mutex<Vec<(String, String)>>>;

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    pub refused: HashSet<String>,
    pub enable_refused: HashSet<String>,
    pub failing_commands: HashSet<String>,
    pub opened: AtomicUsize,
    pub sent: SentLog,
}

impl ScriptedTransport {
    pub(crate) fn refuse(mut self, address: &str) -> Self {
        self.refused.insert(address.to_string());
        self
    }

    pub(crate) fn refuse_enable(mut self, address: &str) -> Self {
        self.enable_refused.insert(address.to_string());
        self
    }

    pub(crate) fn fail_command(mut self, kind: CommandKind) -> Self {
        self.failing_commands.insert(kind.command_text().to_string());
        self
    }

    pub(crate) fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

struct ScriptedHandle {
    address: String,
    enable_refused: bool,
    failing_commands: HashSet<String>,
    sent: SentLog,
}

#[async_trait]
impl SessionTransport for ScriptedTransport {
    async fn open(&self, credentials: &DeviceCredentials) -> Result<Box<dyn SessionHandle>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let address = credentials.host().to_string();
        if self.refused.contains(&address) {
            return Err(FleetError::connection_refused(format!("{} refused", address)));
        }
        Ok(Box::new(ScriptedHandle {
            enable_refused: self.enable_refused.contains(&address),
            address,
            failing_commands: self.failing_commands.clone(),
            sent: Arc::clone(&self.sent),
        }))
    }
}

#[async_trait]
impl SessionHandle for ScriptedHandle {
    async fn enter_privileged_mode(&mut self, _secret: &str) -> Result<()> {
        if self.enable_refused {
            Err(FleetError::connection_refused("enable rejected"))
        } else {
            Ok(())
        }
    }

    async fn send_command(&mut self, command: &str) -> Result<String> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((self.address.clone(), command.to_string()));
        }
        if self.failing_commands.contains(command) {
            return Err(FleetError::command_failed(command, "% Invalid input detected"));
        }
        Ok(format!("{} output from {}", command, self.address))
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Parser returning canned rows per template; unknown templates parse to
/// an empty list.
#[derive(Default)]
pub(crate) struct ScriptedParser {
    rows: HashMap<String, Vec<FieldMap>>,
    failing: HashSet<String>,
}

impl ScriptedParser {
    pub(crate) fn rows(mut self, kind: CommandKind, rows: Vec<FieldMap>) -> Self {
        self.rows.insert(kind.template_id().to_string(), rows);
        self
    }

    pub(crate) fn fail(mut self, kind: CommandKind) -> Self {
        self.failing.insert(kind.template_id().to_string());
        self
    }
}

#[async_trait]
impl CommandResultParser for ScriptedParser {
    async fn parse(&self, template_id: &str, _raw_text: &str) -> Result<Vec<FieldMap>> {
        if self.failing.contains(template_id) {
            return Err(FleetError::parse_failed(template_id, "no template row matched"));
        }
        Ok(self.rows.get(template_id).cloned().unwrap_or_default())
    }
}

pub(crate) fn field_map(pairs: &[(&str, &str)]) -> FieldMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

pub(crate) fn interface_row(name: &str, mac: &str, last_input: &str) -> FieldMap {
    field_map(&[
        ("INTERFACE", name),
        ("LINK_STATUS", "up"),
        ("MAC_ADDRESS", mac),
        ("LAST_INPUT", last_input),
        ("LAST_OUTPUT", "00:00:01"),
    ])
}

pub(crate) fn credentials() -> DeviceCredentials {
    DeviceCredentials::new(DEFAULT_DEVICE_KIND, "", "netops", "Sw1tchPw!", "En4ble!")
}

pub(crate) fn device(hostname: &str, address: &str) -> DeviceDescriptor {
    DeviceDescriptor::new(hostname, address, "lab", &credentials())
}
