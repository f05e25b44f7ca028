//! Error types for websess-core.

use thiserror::Error;

use crate::config::ConfigValidationError;

/// Result type alias using websess-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for session identity operations.
///
/// Absent records and cancelled logins are not errors; they are reported
/// through `Option`/`bool` return values.
#[derive(Error, Debug)]
pub enum Error {
    // Collaborator errors
    #[error("Session store error: {message}")]
    Store { message: String },

    #[error("Record repository error: {message}")]
    Repository { message: String },

    // Hook errors
    #[error("Hook '{hook}' failed: {message}")]
    Hook { hook: String, message: String },

    #[error("Lock poisoned")]
    LockPoisoned,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigValidationError),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a session store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a record repository error
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
        }
    }

    /// Create a hook failure attributed to a named handler
    pub fn hook(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Hook {
            hook: hook.into(),
            message: message.into(),
        }
    }

    /// Check if this error came from a session store
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store { .. })
    }

    /// Check if this error came from a record repository
    pub fn is_repository(&self) -> bool {
        matches!(self, Self::Repository { .. })
    }
}
