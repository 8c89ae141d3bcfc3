use crate::core::domain::value_object::{ProxmoxCSRFToken, ProxmoxTicket};
use std::time::Duration;

/// The authenticated handle of a session: ticket plus CSRF token.
#[derive(Debug, Clone)]
pub struct ProxmoxAuth {
    ticket: ProxmoxTicket,
    csrf_token: ProxmoxCSRFToken,
}

impl ProxmoxAuth {
    pub fn new(ticket: ProxmoxTicket, csrf_token: ProxmoxCSRFToken) -> Self {
        Self { ticket, csrf_token }
    }

    pub fn ticket(&self) -> &ProxmoxTicket {
        &self.ticket
    }

    pub fn csrf_token(&self) -> &ProxmoxCSRFToken {
        &self.csrf_token
    }

    /// A handle older than `lifetime` is treated as absent.
    pub fn is_expired(&self, lifetime: Duration) -> bool {
        self.ticket.is_expired(lifetime)
    }
}
