use crate::core::domain::error::ProxmoxError;
use std::time::SystemTime;
use thiserror::Error;

/// The one failure a refresh cycle can report.
///
/// The previously published snapshot stays in place whenever this is returned.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Failed to list nodes: {0}")]
    NodeList(#[source] ProxmoxError),
}

/// Bookkeeping the collaborator uses to decide whether data is stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStatus {
    /// Completion time of the last cycle that published a snapshot.
    pub last_success: Option<SystemTime>,
    /// Message of the most recent failure, cleared by the next success.
    pub last_error: Option<String>,
    /// Failed cycles since the last success.
    pub consecutive_failures: u32,
    /// Cycles run, successful or not.
    pub cycles: u64,
}

impl RefreshStatus {
    pub(crate) fn record_success(&mut self, at: SystemTime) {
        self.cycles += 1;
        self.last_success = Some(at);
        self.last_error = None;
        self.consecutive_failures = 0;
    }

    pub(crate) fn record_failure(&mut self, error: &RefreshError) {
        self.cycles += 1;
        self.last_error = Some(error.to_string());
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// True once at least one cycle has published a snapshot.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.last_success.is_some()
    }
}
