//! Serde helpers for the loosely typed fields the Proxmox API returns.

use serde::{Deserialize, Deserializer, Serializer};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// `Option<SystemTime>` as optional seconds since UNIX epoch.
pub mod optional_system_time {
    use super::*;

    pub fn serialize<S>(time: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(time) => {
                let duration = time
                    .duration_since(UNIX_EPOCH)
                    .map_err(|_| serde::ser::Error::custom("SystemTime before UNIX epoch"))?;
                serializer.serialize_some(&duration.as_secs())
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SystemTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(|secs| UNIX_EPOCH + Duration::from_secs(secs)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(u64),
    String(String),
}

/// Guest ids arrive as integers from `qemu` listings and as strings from some `lxc` listings.
pub fn vmid<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(value) => u32::try_from(value).map_err(serde::de::Error::custom),
        IntOrString::String(value) => value.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Proxmox flags are `0`/`1` integers (occasionally strings or booleans). Absent means false.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(u64),
        String(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Bool(value)) => value,
        Some(Flag::Int(value)) => value != 0,
        Some(Flag::String(value)) => matches!(value.trim(), "1" | "true" | "yes" | "on"),
    })
}
