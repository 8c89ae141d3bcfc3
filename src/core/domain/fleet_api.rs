//! The seam between the polling coordinator and whatever talks to the cluster.

use crate::core::domain::{
    error::ProxmoxResult,
    model::{GuestConfig, GuestKind, GuestRecord, NodeRecord, PowerAction, StorageRecord},
};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Fleet operations the coordinator depends on.
///
/// Only [`FleetApi::list_nodes`] can fail: an `Err` there aborts the refresh
/// cycle. Every other listing degrades to an empty result on failure, and
/// actions report success as a boolean.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// Lists the nodes of the cluster.
    async fn list_nodes(&self) -> ProxmoxResult<Vec<NodeRecord>>;

    /// Lists the guests of one kind hosted on `node`.
    async fn list_guests(&self, node: &str, kind: GuestKind) -> Vec<GuestRecord>;

    /// Lists the storage volumes visible on `node`.
    async fn list_storage(&self, node: &str) -> Vec<StorageRecord>;

    /// Issues a power action against a guest.
    async fn set_power_state(
        &self,
        node: &str,
        vmid: u32,
        kind: GuestKind,
        action: PowerAction,
    ) -> bool;

    /// Reads a guest's persistent configuration.
    async fn get_guest_config(&self, node: &str, vmid: u32, kind: GuestKind)
    -> Option<GuestConfig>;

    /// Writes one field of a guest's persistent configuration.
    async fn set_guest_config(
        &self,
        node: &str,
        vmid: u32,
        kind: GuestKind,
        field: &str,
        value: serde_json::Value,
    ) -> bool;
}
