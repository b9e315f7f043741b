//! Device inventory: region groupings of named nodes.
//!
//! ```json
//! { "regions": [ { "region_name": "west",
//!                  "nodes": [ { "node_name": "edge-sw-01", "ip": "10.0.0.1" } ] } ] }
//! ```

use crate::error::{FleetError, Result};
use crate::models::DeviceDescriptor;
use crate::security::DeviceCredentials;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A managed node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(alias = "Node_Name")]
    pub node_name: String,
    /// Management address
    #[serde(alias = "IP")]
    pub ip: String,
}

/// Nodes grouped under one region label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub region_name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// Ordered region groupings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(alias = "MDTA_Regions")]
    pub regions: Vec<Region>,
}

impl Inventory {
    /// Parses an inventory document.
    ///
    /// # Errors
    /// Returns `FleetError::Serialization` if the JSON does not match.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| FleetError::serialization("Invalid inventory document", e))
    }

    /// Reads and parses an inventory file.
    ///
    /// # Errors
    /// Returns `FleetError::Io` if the file cannot be read, or
    /// `FleetError::Serialization` if it does not parse.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            FleetError::io(format!("Failed to read inventory {}", path.display()), e)
        })?;
        let inventory = Self::from_json(&text)?;
        tracing::info!(
            "Loaded {} devices in {} regions from {}",
            inventory.device_count(),
            inventory.regions.len(),
            path.display()
        );
        Ok(inventory)
    }

    /// Total nodes across all regions
    pub fn device_count(&self) -> usize {
        self.regions.iter().map(|region| region.nodes.len()).sum()
    }

    /// Builds descriptors in document order.
    ///
    /// Every descriptor gets its own copy of `credentials`, addressed to the
    /// node's management address.
    pub fn descriptors(&self, credentials: &DeviceCredentials) -> Vec<DeviceDescriptor> {
        self.regions
            .iter()
            .flat_map(|region| {
                region.nodes.iter().map(move |node| {
                    DeviceDescriptor::new(
                        node.node_name.as_str(),
                        node.ip.as_str(),
                        region.region_name.as_str(),
                        credentials,
                    )
                })
            })
            .collect()
    }
}
