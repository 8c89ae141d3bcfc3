//! Polls a Proxmox VE cluster and keeps an in-memory snapshot of its nodes,
//! guests and storage.
//!
//! [`ProxmoxClient`] wraps the REST API and never fails past its own
//! boundary: listings degrade to empty, lookups to `None`, actions to `false`.
//! [`PollingCoordinator`] fans out over the fleet once per cycle and publishes
//! each complete [`Snapshot`] atomically.

mod auth;
pub mod config;
mod core;
pub mod polling;

#[cfg(test)]
mod tests;

pub use crate::config::{ClientConfig, MonitorConfig, PollingSettings, RateLimitConfig};
pub use crate::core::domain::error::{ProxmoxError, ProxmoxResult, ValidationError};
pub use crate::core::domain::fleet_api::FleetApi;
pub use crate::core::domain::model::{
    GuestConfig, GuestKind, GuestRecord, MemoryInfo, NodeRecord, NodeStatus, ONBOOT_FIELD,
    PowerAction, ProxmoxConnection, Snapshot, StorageRecord, VersionInfo, derived,
};
pub use crate::core::domain::value_object::{
    ProxmoxHost, ProxmoxPassword, ProxmoxPort, ProxmoxRealm, ProxmoxUsername, sanitize_address,
};
pub use crate::polling::{PollingCoordinator, RefreshError, RefreshStatus};

use crate::core::domain::value_object::DEFAULT_PORT;
use crate::core::infrastructure::api_client::ApiClient;
use async_trait::async_trait;
use std::future::Future;
use tracing::{debug, error, warn};

/// A client for one Proxmox VE endpoint.
///
/// The client owns the credentials and the session. Calls are safe to issue
/// from several tasks, but the session is shared: a re-authentication
/// triggered by one call replaces the ticket for all of them.
///
/// # Examples
///
/// ```no_run
/// use pve_fleet_monitor::{ProxmoxClient, ProxmoxResult};
///
/// #[tokio::main]
/// async fn main() -> ProxmoxResult<()> {
///     let client = ProxmoxClient::builder()
///         .host("https://pve.example.com/")
///         .port(8006)
///         .credentials("monitor", "password", "pve")
///         .tls_verify(false)
///         .build()?;
///
///     if !client.connect().await {
///         eprintln!("cannot reach Proxmox VE");
///         return Ok(());
///     }
///     for node in client.list_nodes().await {
///         println!("{} online={}", node.node, node.is_online());
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ProxmoxClient {
    api_client: ApiClient,
}

/// Builder for ProxmoxClient configuration
#[derive(Debug, Default)]
pub struct ProxmoxClientBuilder {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    realm: Option<String>,
    tls_verify: Option<bool>,
    config: ClientConfig,
}

impl ProxmoxClientBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self.realm = Some(realm.into());
        self
    }

    /// Verify server certificates (default `true`).
    pub fn tls_verify(mut self, tls_verify: bool) -> Self {
        self.tls_verify = Some(tls_verify);
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates the settings and creates a client without a session.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Validation` for missing or malformed settings.
    pub fn build(self) -> ProxmoxResult<ProxmoxClient> {
        let connection = ProxmoxConnection::new(
            ProxmoxHost::new(&required("host", self.host)?)?,
            ProxmoxPort::new(self.port.unwrap_or(DEFAULT_PORT))?,
            ProxmoxUsername::new(required("username", self.username)?)?,
            ProxmoxPassword::new(required("password", self.password)?)?,
            match self.realm {
                Some(realm) => ProxmoxRealm::new(realm)?,
                None => ProxmoxRealm::default(),
            },
            self.tls_verify.unwrap_or(true),
        )?;

        Ok(ProxmoxClient {
            api_client: ApiClient::new(connection, self.config)?,
        })
    }
}

fn required(field: &str, value: Option<String>) -> ProxmoxResult<String> {
    value.ok_or_else(|| {
        ValidationError::Field {
            field: field.to_string(),
            message: format!("{} is required", field),
        }
        .into()
    })
}

impl ProxmoxClient {
    /// Creates a new builder for ProxmoxClient configuration
    pub fn builder() -> ProxmoxClientBuilder {
        ProxmoxClientBuilder::default()
    }

    /// Creates a client with default transport settings.
    pub fn new(
        address: &str,
        username: &str,
        password: &str,
        port: u16,
        realm: &str,
        tls_verify: bool,
    ) -> ProxmoxResult<Self> {
        Self::builder()
            .host(address)
            .port(port)
            .credentials(username, password, realm)
            .tls_verify(tls_verify)
            .build()
    }

    /// Creates a client from a loaded [`MonitorConfig`].
    pub fn from_config(config: &MonitorConfig) -> ProxmoxResult<Self> {
        Self::builder()
            .host(config.host.as_str())
            .port(config.port)
            .credentials(
                config.username.as_str(),
                config.password.as_str(),
                config.realm.as_str(),
            )
            .tls_verify(config.verify_ssl)
            .config(config.client_config())
            .build()
    }

    #[cfg(test)]
    pub(crate) fn from_api_client(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// Connection details (sanitized host, port, realm).
    pub fn connection(&self) -> &ProxmoxConnection {
        self.api_client.connection()
    }

    /// Establishes a session with the stored credentials and probes the API version.
    ///
    /// Returns `false` on any failure; the held session is cleared in that case.
    pub async fn connect(&self) -> bool {
        let host = self.connection().host().as_str().to_string();
        if let Err(e) = self.api_client.login().await {
            match &e {
                ProxmoxError::Connection(_) | ProxmoxError::Timeout(_) => {
                    error!(%host, error = %e, "Failed to connect to Proxmox VE")
                }
                _ => error!(%host, error = %e, "Unexpected error connecting to Proxmox VE"),
            }
            return false;
        }

        match self.api_client.get::<VersionInfo>("version").await {
            Ok(version) => {
                debug!(%host, version = %version.version, "Connected to Proxmox VE");
                true
            }
            Err(e) => {
                error!(%host, error = %e, "Connected but version probe failed");
                self.api_client.invalidate().await;
                false
            }
        }
    }

    /// Returns `true` while a non-expired session is held.
    pub async fn is_connected(&self) -> bool {
        self.api_client.is_authenticated().await
    }

    /// Drops the held session. The next call logs in again.
    pub async fn disconnect(&self) {
        self.api_client.invalidate().await;
    }

    pub async fn get_version(&self) -> Option<VersionInfo> {
        self.api_client
            .get("version")
            .await
            .inspect_err(|e| error!(error = %e, "Failed to get version"))
            .ok()
    }

    /// Lists the cluster nodes. Empty on any failure.
    ///
    /// A rejected ticket triggers one reconnect and one retry.
    pub async fn list_nodes(&self) -> Vec<NodeRecord> {
        self.fetch_nodes().await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to get nodes");
            Vec::new()
        })
    }

    /// Node listing that propagates only a missing session.
    async fn fetch_nodes(&self) -> ProxmoxResult<Vec<NodeRecord>> {
        match self
            .with_reauth("nodes", move || self.api_client.get::<Vec<NodeRecord>>("nodes"))
            .await
        {
            Err(e) if e.is_session_unavailable() => Err(e),
            Err(e) => {
                error!(error = %e, "Failed to get nodes");
                Ok(Vec::new())
            }
            ok => ok,
        }
    }

    /// Detailed status of one node. `None` on any failure, no retry.
    pub async fn get_node_status(&self, node: &str) -> Option<NodeStatus> {
        self.api_client
            .get(&format!("nodes/{}/status", node))
            .await
            .inspect_err(|e| error!(node, error = %e, "Failed to get node status"))
            .ok()
    }

    /// Lists the guests of one kind on `node`, each stamped with `kind`. Empty on any failure.
    ///
    /// A rejected ticket triggers one reconnect and one retry.
    pub async fn list_guests(&self, node: &str, kind: GuestKind) -> Vec<GuestRecord> {
        let path = format!("nodes/{}/{}", node, kind.api_segment());
        let path = path.as_str();
        match self
            .with_reauth(path, move || self.api_client.get::<Vec<GuestRecord>>(path))
            .await
        {
            Ok(mut guests) => {
                for guest in &mut guests {
                    guest.kind = kind;
                }
                guests
            }
            Err(e) => {
                error!(node, %kind, error = %e, "Failed to get guests");
                Vec::new()
            }
        }
    }

    /// Lists storage volumes on `node`. Empty on any failure, no retry.
    pub async fn list_storage(&self, node: &str) -> Vec<StorageRecord> {
        self.api_client
            .get(&format!("nodes/{}/storage", node))
            .await
            .unwrap_or_else(|e| {
                error!(node, error = %e, "Failed to get storage");
                Vec::new()
            })
    }

    /// Issues a power action. `false` on any failure, no retry.
    pub async fn set_power_state(
        &self,
        node: &str,
        vmid: u32,
        kind: GuestKind,
        action: PowerAction,
    ) -> bool {
        let path = format!(
            "nodes/{}/{}/{}/status/{}",
            node,
            kind.api_segment(),
            vmid,
            action.api_segment()
        );
        match self
            .api_client
            .post::<_, serde_json::Value>(&path, &serde_json::json!({}))
            .await
        {
            Ok(task) => {
                debug!(node, vmid, %kind, %action, %task, "power action accepted");
                true
            }
            Err(e) => {
                error!(node, vmid, %kind, %action, error = %e, "Failed to change power state");
                false
            }
        }
    }

    pub async fn start(&self, node: &str, vmid: u32, kind: GuestKind) -> bool {
        self.set_power_state(node, vmid, kind, PowerAction::Start).await
    }

    /// Hard stop.
    pub async fn stop(&self, node: &str, vmid: u32, kind: GuestKind) -> bool {
        self.set_power_state(node, vmid, kind, PowerAction::Stop).await
    }

    /// Graceful shutdown.
    pub async fn shutdown(&self, node: &str, vmid: u32, kind: GuestKind) -> bool {
        self.set_power_state(node, vmid, kind, PowerAction::Shutdown)
            .await
    }

    pub async fn reboot(&self, node: &str, vmid: u32, kind: GuestKind) -> bool {
        self.set_power_state(node, vmid, kind, PowerAction::Reboot)
            .await
    }

    /// Reads a guest's persistent configuration. `None` on any failure.
    pub async fn get_guest_config(
        &self,
        node: &str,
        vmid: u32,
        kind: GuestKind,
    ) -> Option<GuestConfig> {
        self.api_client
            .get(&config_path(node, vmid, kind))
            .await
            .inspect_err(|e| error!(node, vmid, %kind, error = %e, "Failed to get guest config"))
            .ok()
    }

    /// Writes one configuration field. `false` on any failure.
    pub async fn set_guest_config(
        &self,
        node: &str,
        vmid: u32,
        kind: GuestKind,
        field: &str,
        value: serde_json::Value,
    ) -> bool {
        let mut body = serde_json::Map::new();
        body.insert(field.to_string(), value);
        match self
            .api_client
            .put::<_, serde_json::Value>(&config_path(node, vmid, kind), &body)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(node, vmid, %kind, field, error = %e, "Failed to set guest config");
                false
            }
        }
    }

    /// The boot-on-start flag, read from the guest configuration.
    pub async fn get_boot_on_start(&self, node: &str, vmid: u32, kind: GuestKind) -> Option<bool> {
        self.get_guest_config(node, vmid, kind)
            .await
            .map(|config| config.onboot())
    }

    pub async fn set_boot_on_start(
        &self,
        node: &str,
        vmid: u32,
        kind: GuestKind,
        enabled: bool,
    ) -> bool {
        self.set_guest_config(
            node,
            vmid,
            kind,
            ONBOOT_FIELD,
            serde_json::json!(u8::from(enabled)),
        )
        .await
    }

    /// Runs `call`; on a rejected ticket reconnects once and retries once.
    ///
    /// A reconnect that fails is reported as `SessionUnavailable`.
    async fn with_reauth<T, F, Fut>(&self, what: &str, call: F) -> ProxmoxResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ProxmoxResult<T>>,
    {
        match call().await {
            Err(e) if e.is_unauthorized() => {
                warn!(what, "Auth ticket rejected, reconnecting");
                if self.connect().await {
                    call()
                        .await
                        .inspect_err(|retry| error!(what, error = %retry, "Retry after reconnect failed"))
                } else {
                    error!(what, "Reconnection failed");
                    Err(ProxmoxError::SessionUnavailable(format!(
                        "{} was rejected and reconnecting failed",
                        what
                    )))
                }
            }
            other => other,
        }
    }
}

fn config_path(node: &str, vmid: u32, kind: GuestKind) -> String {
    format!("nodes/{}/{}/{}/config", node, kind.api_segment(), vmid)
}

#[async_trait]
impl FleetApi for ProxmoxClient {
    async fn list_nodes(&self) -> ProxmoxResult<Vec<NodeRecord>> {
        self.fetch_nodes().await
    }

    async fn list_guests(&self, node: &str, kind: GuestKind) -> Vec<GuestRecord> {
        ProxmoxClient::list_guests(self, node, kind).await
    }

    async fn list_storage(&self, node: &str) -> Vec<StorageRecord> {
        ProxmoxClient::list_storage(self, node).await
    }

    async fn set_power_state(
        &self,
        node: &str,
        vmid: u32,
        kind: GuestKind,
        action: PowerAction,
    ) -> bool {
        ProxmoxClient::set_power_state(self, node, vmid, kind, action).await
    }

    async fn get_guest_config(
        &self,
        node: &str,
        vmid: u32,
        kind: GuestKind,
    ) -> Option<GuestConfig> {
        ProxmoxClient::get_guest_config(self, node, vmid, kind).await
    }

    async fn set_guest_config(
        &self,
        node: &str,
        vmid: u32,
        kind: GuestKind,
        field: &str,
        value: serde_json::Value,
    ) -> bool {
        ProxmoxClient::set_guest_config(self, node, vmid, kind, field, value).await
    }
}
