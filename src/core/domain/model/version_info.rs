//! Server version from `/api2/json/version`.

use serde::{Deserialize, Serialize};

/// Version information reported by the API daemon.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VersionInfo {
    /// Product version (e.g., "8.2.4").
    pub version: String,
    /// Repository id of the build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repoid: Option<String>,
    /// Major release (e.g., "8.2").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
}
