use crate::core::domain::error::ValidationError;

/// Realm used when none is configured.
pub const DEFAULT_REALM: &str = "pam";

/// A Proxmox authentication realm (`pam`, `pve`, or the id of an LDAP/AD/OpenID realm).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxRealm(String);

impl ProxmoxRealm {
    /// Validates and wraps a realm identifier.
    pub fn new(realm: impl Into<String>) -> Result<Self, ValidationError> {
        let realm = realm.into();
        validate_realm(&realm)?;
        Ok(Self(realm))
    }

    /// Returns the realm as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProxmoxRealm {
    fn default() -> Self {
        Self(DEFAULT_REALM.to_string())
    }
}

/// Validates a realm identifier.
///
/// Proxmox realm ids start with a letter, end with a letter or digit, and
/// may contain letters, digits, `.`, `-` and `_` in between.
pub(crate) fn validate_realm(realm: &str) -> Result<(), ValidationError> {
    if realm.is_empty() {
        return Err(ValidationError::Field {
            field: "realm".to_string(),
            message: "Realm cannot be empty".to_string(),
        });
    }
    if realm.len() < 2 || realm.len() > 32 {
        return Err(ValidationError::Format(format!(
            "Realm length must be between 2 and 32 characters (got {})",
            realm.len()
        )));
    }
    let inner = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_');
    let starts_with_letter = realm.starts_with(|c: char| c.is_ascii_alphabetic());
    let ends_alphanumeric = realm.ends_with(|c: char| c.is_ascii_alphanumeric());
    if !starts_with_letter || !ends_alphanumeric || !realm.chars().all(inner) {
        return Err(ValidationError::Format(
            "Realm contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
