//! The aggregate produced by one refresh cycle.

use super::{GuestKind, GuestRecord, NodeRecord, StorageRecord};
use crate::core::domain::value_object::serde_helpers;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;

/// An immutable view of the whole fleet.
///
/// A snapshot is built privately by the coordinator and only shared once it
/// is complete; published snapshots are handed out behind an `Arc` and are
/// never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Nodes keyed by node name.
    pub nodes: BTreeMap<String, NodeRecord>,
    /// VMs and containers keyed by guest id.
    pub guests: BTreeMap<u32, GuestRecord>,
    /// Storage volumes keyed by [`StorageRecord::key_for`].
    pub storage: BTreeMap<String, StorageRecord>,
    /// When the cycle that produced this snapshot completed. `None` before the first cycle.
    #[serde(default, with = "serde_helpers::optional_system_time")]
    pub taken_at: Option<SystemTime>,
}

impl Snapshot {
    /// The empty snapshot published before the first successful refresh.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.guests.is_empty() && self.storage.is_empty()
    }

    #[must_use]
    pub fn node(&self, name: &str) -> Option<&NodeRecord> {
        self.nodes.get(name)
    }

    #[must_use]
    pub fn guest(&self, vmid: u32) -> Option<&GuestRecord> {
        self.guests.get(&vmid)
    }

    #[must_use]
    pub fn storage_volume(&self, node: &str, storage: &str) -> Option<&StorageRecord> {
        self.storage.get(&StorageRecord::key_for(node, storage))
    }

    /// Virtual machines, in id order.
    pub fn vms(&self) -> impl Iterator<Item = &GuestRecord> {
        self.guests_of_kind(GuestKind::Vm)
    }

    /// Containers, in id order.
    pub fn containers(&self) -> impl Iterator<Item = &GuestRecord> {
        self.guests_of_kind(GuestKind::Container)
    }

    /// Guests hosted on `node`, in id order.
    pub fn guests_on<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a GuestRecord> {
        self.guests.values().filter(move |guest| guest.node == node)
    }

    fn guests_of_kind(&self, kind: GuestKind) -> impl Iterator<Item = &GuestRecord> {
        self.guests.values().filter(move |guest| guest.kind == kind)
    }
}
