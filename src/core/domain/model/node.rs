//! Node records from the `/nodes` and `/nodes/{node}/status` endpoints.

use super::derived;
use serde::{Deserialize, Serialize};

/// A node in the Proxmox cluster as returned by `/api2/json/nodes`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeRecord {
    /// The node name (e.g., "pve1"), unique within the fleet.
    pub node: String,
    /// Liveness status ("online", "offline", "unknown").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// CPU usage fraction (0.0 to 1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Number of logical CPUs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxcpu: Option<u32>,
    /// Memory usage in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Total memory in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Root filesystem usage in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
    /// Root filesystem size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxdisk: Option<u64>,
    /// Uptime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Resource identifier (e.g., "node/pve1").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl NodeRecord {
    /// Creates a bare record with only a name and status.
    pub fn new(node: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            status: Some(status.into()),
            cpu: None,
            maxcpu: None,
            mem: None,
            maxmem: None,
            disk: None,
            maxdisk: None,
            uptime: None,
            id: None,
        }
    }

    /// True only when the status is exactly "online".
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.status.as_deref() == Some("online")
    }

    #[must_use]
    pub fn cpu_percentage(&self) -> f64 {
        derived::cpu_percentage(self.cpu)
    }

    #[must_use]
    pub fn memory_percentage(&self) -> f64 {
        derived::memory_percentage(self.mem, self.maxmem)
    }

    #[must_use]
    pub fn memory_total_gb(&self) -> f64 {
        derived::bytes_to_gb(self.maxmem.unwrap_or(0))
    }

    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.uptime.unwrap_or(0)
    }
}

/// Detailed status of one node, from `/api2/json/nodes/{node}/status`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeStatus {
    /// CPU usage fraction (0.0 to 1.0).
    #[serde(default)]
    pub cpu: f64,
    /// Memory usage in bytes.
    pub memory: MemoryInfo,
    /// Swap usage in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<MemoryInfo>,
    /// System uptime in seconds.
    #[serde(default)]
    pub uptime: u64,
    /// Kernel version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kversion: Option<String>,
    /// Load average over 1, 5, and 15 minutes. Proxmox reports these as strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loadavg: Option<Vec<String>>,
    /// IO delay fraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<f64>,
    /// Package version of the running `pve-manager`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pveversion: Option<String>,
}

/// Memory usage information.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MemoryInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}
