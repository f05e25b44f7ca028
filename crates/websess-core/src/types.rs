//! Shared session identity types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Named state values scoped to one session.
pub type StateMap = HashMap<String, serde_json::Value>;

/// Reserved state key holding the display name of the authenticated user.
pub const NAME_STATE_KEY: &str = "__name";

// ─────────────────────────────────────────────────────────────────────────────
// User ID
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque identifier of an authenticated principal.
///
/// Integer keys are normalized to their decimal string form, so `5` and
/// `"5"` name the same user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawUserId", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a user ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for UserId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Wire form accepted when deserializing a [`UserId`].
#[derive(Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawUserId> for UserId {
    fn from(raw: RawUserId) -> Self {
        match raw {
            RawUserId::Text(id) => Self(id),
            RawUserId::Signed(id) => id.into(),
            RawUserId::Unsigned(id) => id.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// The persisted portion of a session identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Authenticated principal, `None` for guests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    /// Named state values.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub states: StateMap,
}

impl SessionSnapshot {
    /// Snapshot of a guest session.
    pub fn guest() -> Self {
        Self::default()
    }

    /// Snapshot of an authenticated session without states.
    pub fn authenticated(id: impl Into<UserId>) -> Self {
        Self {
            id: Some(id.into()),
            states: StateMap::new(),
        }
    }

    /// Add a state value.
    pub fn with_state(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.states.insert(key.into(), value);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Verified Identity
// ─────────────────────────────────────────────────────────────────────────────

/// A principal whose credentials were already accepted by an external
/// verifier.
pub trait VerifiedIdentity {
    /// Identifier to log in as.
    fn id(&self) -> UserId;

    /// Display name, stored under [`NAME_STATE_KEY`] on login.
    fn name(&self) -> String;

    /// States to attach to the session on login.
    fn persistent_states(&self) -> StateMap {
        StateMap::new()
    }
}
