//! Session identity configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default display name reported for guest sessions.
pub const DEFAULT_GUEST_NAME: &str = "Guest";

/// Session identity configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name returned by `SessionIdentity::name` while no name state is set
    /// (default: "Guest")
    pub guest_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            guest_name: DEFAULT_GUEST_NAME.to_string(),
        }
    }
}

impl SessionConfig {
    /// Set the guest display name
    pub fn with_guest_name(mut self, guest_name: impl Into<String>) -> Self {
        self.guest_name = guest_name.into();
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.guest_name.trim().is_empty() {
            return Err(ConfigValidationError::MissingGuestName);
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("guest_name must not be empty")]
    MissingGuestName,

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigValidationError {
    /// Create an invalid value error for a named field
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
