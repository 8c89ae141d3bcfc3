mod proxmox_host;
mod proxmox_password;
mod proxmox_port;
mod proxmox_realm;
mod proxmox_ticket;
mod proxmox_username;
pub(crate) mod serde_helpers;

pub use proxmox_host::{ProxmoxHost, sanitize_address};
pub use proxmox_password::ProxmoxPassword;
pub use proxmox_port::{DEFAULT_PORT, ProxmoxPort};
pub use proxmox_realm::{DEFAULT_REALM, ProxmoxRealm};
pub use proxmox_ticket::{ProxmoxCSRFToken, ProxmoxTicket};
pub use proxmox_username::ProxmoxUsername;
