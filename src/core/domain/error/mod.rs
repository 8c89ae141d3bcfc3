use reqwest::StatusCode;
use thiserror::Error;

/// The main error type for Proxmox VE client operations.
///
/// Variants are classified by the transport so that callers never have to
/// inspect error text to find out what went wrong. In particular an expired
/// or rejected ticket always surfaces as [`ProxmoxError::Unauthorized`].
#[derive(Error, Debug)]
pub enum ProxmoxError {
    /// The server could not be reached (DNS, TCP, TLS handshake).
    ///
    /// # Fields
    /// * `0` - A description of what went wrong during the connection attempt
    #[error("Connection error: {0}")]
    Connection(String),

    /// Login was rejected or the login response was unusable.
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A resource call was answered with `401 Unauthorized`.
    ///
    /// # Fields
    /// * `path` - The API path that was rejected
    #[error("Unauthorized request to '{path}'")]
    Unauthorized { path: String },

    /// The API answered with a non-success status other than 401.
    #[error("API error ({status}) on '{path}': {message}")]
    Api {
        status: StatusCode,
        path: String,
        message: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request to '{0}' timed out")]
    Timeout(String),

    /// The response body could not be decoded into the expected record type.
    #[error("Failed to decode response from '{path}': {message}")]
    Decode { path: String, message: String },

    /// No session exists and a new one could not be established.
    #[error("No session available: {0}")]
    SessionUnavailable(String),

    /// Represents validation failures of construction-time input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded or deserialized.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProxmoxError {
    /// Returns `true` when the error means the held ticket is no longer accepted.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ProxmoxError::Unauthorized { .. })
    }

    /// Returns `true` when the error means no session could be obtained at all.
    #[must_use]
    pub fn is_session_unavailable(&self) -> bool {
        matches!(self, ProxmoxError::SessionUnavailable(_))
    }

    /// Classifies a `reqwest` send error for the given path.
    pub(crate) fn from_transport(path: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProxmoxError::Timeout(path.to_string())
        } else if error.is_decode() {
            ProxmoxError::Decode {
                path: path.to_string(),
                message: error.to_string(),
            }
        } else {
            ProxmoxError::Connection(format!("HTTP request to '{}' failed: {}", path, error))
        }
    }
}

impl From<config::ConfigError> for ProxmoxError {
    fn from(error: config::ConfigError) -> Self {
        ProxmoxError::Config(error.to_string())
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a ProxmoxError
pub type ProxmoxResult<T> = Result<T, ProxmoxError>;
