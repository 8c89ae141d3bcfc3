use crate::core::domain::{
    error::{ProxmoxError, ProxmoxResult},
    value_object::{ProxmoxHost, ProxmoxPassword, ProxmoxPort, ProxmoxRealm, ProxmoxUsername},
};
use url::Url;

/// Everything needed to reach and authenticate against one Proxmox VE endpoint.
#[derive(Debug, Clone)]
pub struct ProxmoxConnection {
    host: ProxmoxHost,
    port: ProxmoxPort,
    username: ProxmoxUsername,
    password: ProxmoxPassword,
    realm: ProxmoxRealm,
    tls_verify: bool,
    base_url: Url,
}

impl ProxmoxConnection {
    pub fn new(
        host: ProxmoxHost,
        port: ProxmoxPort,
        username: ProxmoxUsername,
        password: ProxmoxPassword,
        realm: ProxmoxRealm,
        tls_verify: bool,
    ) -> ProxmoxResult<Self> {
        let base_url = Url::parse(&format!(
            "https://{}:{}/api2/json/",
            host.as_str(),
            port.get()
        ))
        .map_err(|e| ProxmoxError::Connection(format!("Invalid API URL: {}", e)))?;

        Ok(Self {
            host,
            port,
            username,
            password,
            realm,
            tls_verify,
            base_url,
        })
    }

    /// Points the connection at a different API root, e.g. a plain-HTTP test server.
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, server_uri: &str) -> Self {
        self.base_url = Url::parse(&format!("{}/api2/json/", server_uri.trim_end_matches('/')))
            .expect("valid test server uri");
        self
    }

    pub fn host(&self) -> &ProxmoxHost {
        &self.host
    }

    pub fn port(&self) -> ProxmoxPort {
        self.port
    }

    pub fn username(&self) -> &ProxmoxUsername {
        &self.username
    }

    pub fn password(&self) -> &ProxmoxPassword {
        &self.password
    }

    pub fn realm(&self) -> &ProxmoxRealm {
        &self.realm
    }

    /// Whether server certificates are verified.
    pub fn tls_verify(&self) -> bool {
        self.tls_verify
    }

    /// `user@realm`, the form Proxmox reports in tickets and permissions.
    pub fn user_id(&self) -> String {
        format!("{}@{}", self.username.as_str(), self.realm.as_str())
    }

    /// Resolves an API path (`nodes/pve1/qemu`) against the API root.
    pub fn endpoint(&self, path: &str) -> ProxmoxResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ProxmoxError::Connection(format!("Invalid API path '{}': {}", path, e)))
    }
}
