//! Storage records from the `/nodes/{node}/storage` endpoint.

use super::derived;
use crate::core::domain::value_object::serde_helpers;
use serde::{Deserialize, Serialize};

/// A storage volume on one node.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageRecord {
    /// Storage identifier (e.g., `local`, `local-zfs`).
    pub storage: String,
    /// Owning node name, stamped by the coordinator.
    #[serde(default)]
    pub node: String,
    /// Storage plugin type (e.g., `dir`, `zfspool`, `lvmthin`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
    /// Comma separated content types (e.g., `images,rootdir`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "serde_helpers::flag")]
    pub active: bool,
    #[serde(default, deserialize_with = "serde_helpers::flag")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "serde_helpers::flag")]
    pub shared: bool,
    /// Used space in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<u64>,
    /// Total capacity in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Available space in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avail: Option<u64>,
}

impl StorageRecord {
    /// Fleet-wide key of a volume: node name and volume name joined by `_`.
    #[must_use]
    pub fn key_for(node: &str, storage: &str) -> String {
        format!("{}_{}", node, storage)
    }

    #[must_use]
    pub fn key(&self) -> String {
        Self::key_for(&self.node, &self.storage)
    }

    #[must_use]
    pub fn used_gb(&self) -> f64 {
        derived::bytes_to_gb(self.used.unwrap_or(0))
    }

    #[must_use]
    pub fn total_gb(&self) -> f64 {
        derived::bytes_to_gb(self.total.unwrap_or(0))
    }

    #[must_use]
    pub fn usage_percentage(&self) -> f64 {
        derived::usage_percentage(self.used, self.total)
    }
}
