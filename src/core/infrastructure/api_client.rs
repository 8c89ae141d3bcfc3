//! Internal HTTP client that holds the session and classifies every failure.

use crate::{
    auth::application::service::login_service::LoginService,
    config::ClientConfig,
    core::domain::{
        error::{ProxmoxError, ProxmoxResult},
        model::{ProxmoxAuth, ProxmoxConnection},
    },
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Every API response is wrapped in a `data` envelope.
#[derive(Deserialize)]
struct ApiResponse<T> {
    data: T,
}

/// Internal HTTP client that manages the session and calls the Proxmox API.
///
/// Each request carries the `PVEAuthCookie` and `CSRFPreventionToken` headers
/// of the held session. A missing or expired session is re-established lazily
/// before the request is sent. A `401 Unauthorized` answer drops the session
/// and is returned as [`ProxmoxError::Unauthorized`]; deciding whether to
/// reconnect and retry is left to the caller.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<ProxmoxConnection>,
    auth: Arc<RwLock<Option<ProxmoxAuth>>>,
    config: Arc<ClientConfig>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`. The client starts without a session.
    ///
    /// # Errors
    /// Returns `ProxmoxError::Connection` if the HTTP client cannot be built.
    pub fn new(connection: ProxmoxConnection, config: ClientConfig) -> ProxmoxResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(!connection.tls_verify())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProxmoxError::Connection(e.to_string()))?;

        let rate_limiter = config.rate_limit.map(|rl| {
            let quota = Quota::per_second(rl.requests_per_second).allow_burst(rl.burst_size);
            Arc::new(DefaultDirectRateLimiter::direct(quota))
        });

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            auth: Arc::new(RwLock::new(None)),
            config: Arc::new(config),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &ProxmoxConnection {
        &self.connection
    }

    /// Sets the session handle directly.
    #[cfg(test)]
    pub async fn set_auth(&self, auth: ProxmoxAuth) {
        *self.auth.write().await = Some(auth);
    }

    /// Returns `true` if there is a non-expired session handle.
    pub async fn is_authenticated(&self) -> bool {
        self.auth
            .read()
            .await
            .as_ref()
            .is_some_and(|a| !a.is_expired(self.config.ticket_lifetime))
    }

    /// Drops the held session handle.
    pub async fn invalidate(&self) {
        *self.auth.write().await = None;
    }

    /// Performs a fresh login with the stored credentials.
    ///
    /// On failure the previous session handle is cleared as well.
    pub async fn login(&self) -> ProxmoxResult<()> {
        match LoginService::new()
            .execute(&self.http_client, &self.connection)
            .await
        {
            Ok(auth) => {
                *self.auth.write().await = Some(auth);
                Ok(())
            }
            Err(e) => {
                self.invalidate().await;
                Err(e)
            }
        }
    }

    /// Performs an authenticated GET request and unwraps the `data` envelope.
    pub async fn get<T>(&self, path: &str) -> ProxmoxResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.execute_request(Method::GET, path, None::<&()>).await
    }

    /// Performs an authenticated POST request with a JSON body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> ProxmoxResult<T>
    where
        B: serde::Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        self.execute_request(Method::POST, path, Some(body)).await
    }

    /// Performs an authenticated PUT request with a JSON body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> ProxmoxResult<T>
    where
        B: serde::Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        self.execute_request(Method::PUT, path, Some(body)).await
    }

    async fn execute_request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ProxmoxResult<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        self.ensure_authenticated().await?;

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.connection.endpoint(path)?;
        debug!(%method, path, "api request");
        let mut req_builder = self.http_client.request(method, url);

        {
            let auth_guard = self.auth.read().await;
            if let Some(auth) = auth_guard.as_ref() {
                req_builder = req_builder
                    .header("Cookie", auth.ticket().as_cookie_header())
                    .header("CSRFPreventionToken", auth.csrf_token().as_str());
            }
        }

        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| ProxmoxError::from_transport(path, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.invalidate().await;
            return Err(ProxmoxError::Unauthorized {
                path: path.to_string(),
            });
        }

        if !status.is_success() {
            // Proxmox puts the reason in the status line; the body is often empty.
            let reason = status.canonical_reason().unwrap_or("unknown").to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(ProxmoxError::Api {
                status,
                path: path.to_string(),
                message: if body.trim().is_empty() { reason } else { body },
            });
        }

        response
            .json::<ApiResponse<T>>()
            .await
            .map(|envelope| envelope.data)
            .map_err(|e| {
                if e.is_timeout() {
                    ProxmoxError::Timeout(path.to_string())
                } else {
                    ProxmoxError::Decode {
                        path: path.to_string(),
                        message: e.to_string(),
                    }
                }
            })
    }

    /// Ensures that a non-expired session exists, logging in if needed.
    async fn ensure_authenticated(&self) -> ProxmoxResult<()> {
        if self.is_authenticated().await {
            return Ok(());
        }
        debug!("no valid session, logging in");
        self.login()
            .await
            .map_err(|e| ProxmoxError::SessionUnavailable(e.to_string()))
    }
}
