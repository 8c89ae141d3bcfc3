pub mod derived;
mod guest;
mod node;
mod proxmox_auth;
mod proxmox_connection;
mod snapshot;
mod storage;
mod version_info;

pub use guest::{GuestConfig, GuestKind, GuestRecord, ONBOOT_FIELD, PowerAction};
pub use node::{MemoryInfo, NodeRecord, NodeStatus};
pub use proxmox_auth::ProxmoxAuth;
pub use proxmox_connection::ProxmoxConnection;
pub use snapshot::Snapshot;
pub use storage::StorageRecord;
pub use version_info::VersionInfo;
