use crate::core::domain::error::ValidationError;

/// A Proxmox user name without the `@realm` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUsername(String);

impl ProxmoxUsername {
    /// Validates and wraps a user name.
    pub fn new(username: impl Into<String>) -> Result<Self, ValidationError> {
        let username = username.into();
        validate_username(&username)?;
        Ok(Self(username))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates a user name.
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::Field {
            field: "username".to_string(),
            message: "Username cannot be empty".to_string(),
        });
    }
    if username.len() > 64 {
        return Err(ValidationError::Format(format!(
            "Username cannot exceed 64 characters (got {})",
            username.len()
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(ValidationError::Format(
            "Username cannot contain whitespace".to_string(),
        ));
    }
    if username.contains('@') {
        return Err(ValidationError::ConstraintViolation(
            "Username must not include the realm; configure it separately".to_string(),
        ));
    }
    Ok(())
}
