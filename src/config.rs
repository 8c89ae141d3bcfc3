//! Configuration for the API client and the polling coordinator.
//!
//! [`MonitorConfig`] is the file/environment facing shape. It splits into a
//! [`ClientConfig`] for the transport and [`PollingSettings`] for the
//! coordinator, which can also be built directly in code.

use crate::core::domain::{
    error::ProxmoxResult,
    value_object::{DEFAULT_PORT, DEFAULT_REALM},
};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix read by [`MonitorConfig::load`].
pub const ENV_PREFIX: &str = "PVE";

/// Client-side request throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: NonZeroU32,
    pub burst_size: NonZeroU32,
}

/// Transport settings of the API client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Upper bound for every HTTP request, login included.
    pub request_timeout: Duration,
    /// Age after which a ticket is re-established before use.
    pub ticket_lifetime: Duration,
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(default_request_timeout_secs()),
            ticket_lifetime: Duration::from_secs(default_ticket_lifetime_secs()),
            rate_limit: None,
        }
    }
}

/// Cadence and filters of the polling coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct PollingSettings {
    /// Fixed interval between scheduled cycles.
    pub interval: Duration,
    /// Nodes that are never enumerated.
    pub exclude_nodes: BTreeSet<String>,
    /// Guest ids that are never published.
    pub exclude_guests: BTreeSet<u32>,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(default_poll_interval_secs()),
            exclude_nodes: BTreeSet::new(),
            exclude_guests: BTreeSet::new(),
        }
    }
}

/// Full monitor configuration as read from a file and/or `PVE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Address of the API endpoint; a scheme prefix or trailing slash is stripped.
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default = "default_realm")]
    pub realm: String,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_ticket_lifetime_secs")]
    pub ticket_lifetime_secs: u64,
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
    #[serde(default)]
    pub exclude_nodes: Vec<String>,
    #[serde(default)]
    pub exclude_guests: Vec<u32>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_realm() -> String {
    DEFAULT_REALM.to_string()
}

fn default_verify_ssl() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_ticket_lifetime_secs() -> u64 {
    // Proxmox tickets are valid for two hours.
    7200
}

impl MonitorConfig {
    /// Loads configuration from `PVE_*` environment variables only.
    pub fn load() -> ProxmoxResult<Self> {
        Self::build(None)
    }

    /// Loads configuration from a file (format inferred from the extension),
    /// with `PVE_*` environment variables taking precedence.
    pub fn load_from(path: impl AsRef<Path>) -> ProxmoxResult<Self> {
        Self::build(Some(path.as_ref()))
    }

    fn build(path: Option<&Path>) -> ProxmoxResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("exclude_nodes")
                    .with_list_parse_key("exclude_guests"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ticket_lifetime: Duration::from_secs(self.ticket_lifetime_secs),
            rate_limit: self.rate_limit,
        }
    }

    #[must_use]
    pub fn polling_settings(&self) -> PollingSettings {
        PollingSettings {
            interval: Duration::from_secs(self.poll_interval_secs),
            exclude_nodes: self.exclude_nodes.iter().cloned().collect(),
            exclude_guests: self.exclude_guests.iter().copied().collect(),
        }
    }
}
