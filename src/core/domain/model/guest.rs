//! Guest (QEMU virtual machine or LXC container) records and control types.

use super::derived;
use crate::core::domain::value_object::serde_helpers;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of guest a record describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestKind {
    /// A QEMU/KVM virtual machine.
    #[default]
    Vm,
    /// An LXC container.
    Container,
}

impl GuestKind {
    /// Both kinds, in the order a refresh cycle lists them.
    pub const ALL: [GuestKind; 2] = [GuestKind::Vm, GuestKind::Container];

    /// The API path segment for this kind (`qemu` or `lxc`).
    #[must_use]
    pub fn api_segment(self) -> &'static str {
        match self {
            GuestKind::Vm => "qemu",
            GuestKind::Container => "lxc",
        }
    }
}

impl fmt::Display for GuestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GuestKind::Vm => "vm",
            GuestKind::Container => "container",
        })
    }
}

/// A guest as returned by `/nodes/{node}/qemu` or `/nodes/{node}/lxc`.
///
/// The listing does not carry the owning node or the kind; the client stamps
/// `kind` from the endpoint it called and the coordinator stamps `node`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GuestRecord {
    /// The guest identifier.
    #[serde(deserialize_with = "serde_helpers::vmid")]
    pub vmid: u32,
    /// VM or container.
    #[serde(default)]
    pub kind: GuestKind,
    /// Owning node name. Lookup only.
    #[serde(default)]
    pub node: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Running state ("running", "stopped", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// CPU usage fraction (0.0 to 1.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Number of allocated virtual CPUs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<f64>,
    /// Memory usage in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem: Option<u64>,
    /// Memory limit in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxmem: Option<u64>,
    /// Disk usage in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<u64>,
    /// Disk size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxdisk: Option<u64>,
    /// Uptime in seconds (if running).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Semicolon separated tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl GuestRecord {
    /// Creates a bare record for the given id, kind and running state.
    pub fn new(vmid: u32, kind: GuestKind, name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            vmid,
            kind,
            node: String::new(),
            name: name.into(),
            status: Some(status.into()),
            cpu: None,
            cpus: None,
            mem: None,
            maxmem: None,
            disk: None,
            maxdisk: None,
            uptime: None,
            tags: None,
        }
    }

    /// True only when the status is exactly "running".
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status.as_deref() == Some("running")
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
    pub fn memory_used_gb(&self) -> f64 {
        derived::bytes_to_gb(self.mem.unwrap_or(0))
    }
}

/// A power action on a guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    Start,
    /// Hard stop, equivalent to pulling the plug.
    Stop,
    /// Graceful ACPI / init shutdown.
    Shutdown,
    Reboot,
}

impl PowerAction {
    /// The API path segment under `status/`.
    #[must_use]
    pub fn api_segment(self) -> &'static str {
        match self {
            PowerAction::Start => "start",
            PowerAction::Stop => "stop",
            PowerAction::Shutdown => "shutdown",
            PowerAction::Reboot => "reboot",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_segment())
    }
}

/// Config field holding the boot-on-start flag.
pub const ONBOOT_FIELD: &str = "onboot";

/// Persistent configuration of a guest, from `/nodes/{node}/{qemu|lxc}/{vmid}/config`.
///
/// Configuration keys differ between kinds and versions, so the record is kept
/// as a raw map with typed accessors for the fields this crate uses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct GuestConfig(serde_json::Map<String, serde_json::Value>);

impl GuestConfig {
    /// Returns a raw configuration value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.0.get(field)
    }

    /// The boot-on-start flag. An unset `onboot` means disabled.
    #[must_use]
    pub fn onboot(&self) -> bool {
        match self.0.get(ONBOOT_FIELD) {
            Some(serde_json::Value::Number(n)) => n.as_u64().is_some_and(|n| n != 0),
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s.trim() == "1",
            _ => false,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0
            .get("name")
            .or_else(|| self.0.get("hostname"))
            .and_then(serde_json::Value::as_str)
    }

    /// Configuration digest, used by the API to detect concurrent edits.
    #[must_use]
    pub fn digest(&self) -> Option<&str> {
        self.0.get("digest").and_then(serde_json::Value::as_str)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for GuestConfig {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}
