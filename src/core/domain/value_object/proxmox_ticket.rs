use crate::core::domain::error::ValidationError;
use std::time::{Duration, SystemTime};

/// A Proxmox authentication ticket.
#[derive(Debug, Clone)]
pub struct ProxmoxTicket {
    value: String,
    created_at: SystemTime,
}

impl ProxmoxTicket {
    /// Validates a ticket returned by the login endpoint.
    pub fn new(value: String) -> Result<Self, ValidationError> {
        validate_ticket(&value)?;
        Ok(Self::new_unchecked(value))
    }

    /// Creates a new ticket without validation.
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self {
            value,
            created_at: SystemTime::now(),
        }
    }

    /// Returns the ticket value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Checks if the ticket is expired based on a given lifetime.
    #[must_use]
    pub fn is_expired(&self, lifetime: Duration) -> bool {
        self.created_at
            .elapsed()
            .map(|age| age > lifetime)
            .unwrap_or(true)
    }

    /// Formats the ticket as a cookie header value.
    #[must_use]
    pub fn as_cookie_header(&self) -> String {
        format!("PVEAuthCookie={}", self.value)
    }
}

/// A Proxmox CSRF protection token, required on every write request.
#[derive(Debug, Clone)]
pub struct ProxmoxCSRFToken(String);

impl ProxmoxCSRFToken {
    /// Validates a token returned by the login endpoint.
    pub fn new(value: String) -> Result<Self, ValidationError> {
        validate_csrf_token(&value)?;
        Ok(Self(value))
    }

    /// Creates a new CSRF token without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// Returns the token value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates the format of a ticket string.
pub(crate) fn validate_ticket(ticket: &str) -> Result<(), ValidationError> {
    if ticket.is_empty() {
        return Err(ValidationError::Field {
            field: "ticket".to_string(),
            message: "Ticket cannot be empty".to_string(),
        });
    }
    let parts: Vec<&str> = ticket.split(':').collect();
    if parts.len() < 5 || parts[0] != "PVE" {
        return Err(ValidationError::Format(
            "Invalid ticket format: must start with 'PVE:' and have at least 5 parts".to_string(),
        ));
    }
    Ok(())
}

/// Validates the format of a CSRF token string (`TOKENID:VALUE`).
pub(crate) fn validate_csrf_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::Field {
            field: "csrf_token".to_string(),
            message: "CSRF token cannot be empty".to_string(),
        });
    }
    match token.split_once(':') {
        Some((id, value))
            if id.len() == 8 && id.chars().all(|c| c.is_ascii_hexdigit()) && !value.is_empty() =>
        {
            Ok(())
        }
        _ => Err(ValidationError::Format(
            "CSRF token must be in format TOKENID:VALUE with an 8 digit hex id".to_string(),
        )),
    }
}
