use crate::{
    auth::application::{
        request::login_request::LoginRequest, response::login_response::LoginResponse,
    },
    core::domain::{
        error::{ProxmoxError, ProxmoxResult},
        model::{ProxmoxAuth, ProxmoxConnection},
        value_object::{ProxmoxCSRFToken, ProxmoxTicket},
    },
};

use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use tracing::debug;

const LOGIN_PATH: &str = "access/ticket";

/// Exchanges stored credentials for a ticket and CSRF token.
pub struct LoginService {
    default_headers: HeaderMap,
}

impl LoginService {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self { default_headers }
    }

    pub async fn execute(
        &self,
        http_client: &Client,
        connection: &ProxmoxConnection,
    ) -> ProxmoxResult<ProxmoxAuth> {
        let url = connection.endpoint(LOGIN_PATH)?;
        let request = LoginRequest {
            username: connection.username().as_str(),
            password: connection.password().as_str(),
            realm: connection.realm().as_str(),
        };

        debug!(user = %connection.user_id(), "requesting ticket");
        let response = http_client
            .post(url)
            .headers(self.default_headers.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProxmoxError::from_transport(LOGIN_PATH, e))?;

        match response.status() {
            StatusCode::OK => self.handle_successful_login(response).await,
            // Proxmox answers rejected credentials with 401.
            StatusCode::UNAUTHORIZED => Err(ProxmoxError::Authentication(
                "Invalid credentials provided".to_string(),
            )),
            StatusCode::NOT_FOUND => Err(ProxmoxError::Connection(
                "Login endpoint not found".to_string(),
            )),
            StatusCode::SERVICE_UNAVAILABLE => Err(ProxmoxError::Connection(
                "Proxmox service is currently unavailable".to_string(),
            )),
            status => Err(ProxmoxError::Authentication(format!(
                "Unexpected login response status: {}",
                status
            ))),
        }
    }

    async fn handle_successful_login(
        &self,
        response: reqwest::Response,
    ) -> ProxmoxResult<ProxmoxAuth> {
        let login_response = response.json::<LoginResponse>().await.map_err(|e| {
            ProxmoxError::Authentication(format!("Failed to parse login response: {}", e))
        })?;

        let ticket = ProxmoxTicket::new(login_response.data.ticket)?;
        let csrf_token = ProxmoxCSRFToken::new(login_response.data.csrf_token)?;
        if let Some(user) = login_response.data.username.as_deref() {
            debug!(user, "ticket issued");
        }

        Ok(ProxmoxAuth::new(ticket, csrf_token))
    }
}

impl Default for LoginService {
    fn default() -> Self {
        Self::new()
    }
}
