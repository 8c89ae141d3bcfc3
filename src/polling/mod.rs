//! Fleet-wide refresh cycles and snapshot publication.

mod coordinator;
mod refresh_status;

pub use coordinator::PollingCoordinator;
pub use refresh_status::{RefreshError, RefreshStatus};
