//! Identity and named states of one session.

use serde_json::Value;

use crate::types::{SessionSnapshot, StateMap, UserId};

/// The mutable identity data of a session: who is logged in, plus states.
///
/// `restored` hooks receive this directly, so they can adjust the session
/// (including invalidating it) while it is being hydrated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityState {
    id: Option<UserId>,
    states: StateMap,
}

impl IdentityState {
    /// Create a guest state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            id: snapshot.id,
            states: snapshot.states,
        }
    }

    pub fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            states: self.states.clone(),
        }
    }

    /// Current principal, `None` for guests.
    pub fn id(&self) -> Option<&UserId> {
        self.id.as_ref()
    }

    pub fn is_guest(&self) -> bool {
        self.id.is_none()
    }

    /// Overwrite the principal without touching states.
    pub fn set_id(&mut self, id: Option<UserId>) {
        self.id = id;
    }

    /// Read a named state; unknown keys are absent.
    pub fn state(&self, key: &str) -> Option<&Value> {
        self.states.get(key)
    }

    /// Write a named state. Writing `null` removes the key.
    pub fn set_state(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        match value.into() {
            Value::Null => {
                self.states.remove(&key);
            }
            value => {
                self.states.insert(key, value);
            }
        }
    }

    pub fn remove_state(&mut self, key: &str) -> Option<Value> {
        self.states.remove(key)
    }

    pub fn has_state(&self, key: &str) -> bool {
        self.states.contains_key(key)
    }

    pub fn clear_states(&mut self) {
        self.states.clear();
    }

    pub fn states(&self) -> &StateMap {
        &self.states
    }

    /// Drop the principal and every state, turning the session into a guest.
    pub fn clear(&mut self) {
        self.id = None;
        self.states.clear();
    }

    /// Replace principal and states in one step.
    pub(crate) fn commit(&mut self, id: UserId, states: StateMap) {
        self.id = Some(id);
        self.states = states;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_guest_by_default() {
        let state = IdentityState::new();
        assert!(state.is_guest());
        assert!(state.id().is_none());
        assert!(state.state("missing").is_none());
    }

    #[test]
    fn test_null_removes_state() {
        let mut state = IdentityState::new();
        state.set_state("email", "a@b.test");
        assert_eq!(state.state("email"), Some(&json!("a@b.test")));

        state.set_state("email", Value::Null);
        assert!(!state.has_state("email"));
    }

    #[test]
    fn test_clear() {
        let mut state = IdentityState::from_snapshot(
            SessionSnapshot::authenticated(9).with_state("x", json!(1)),
        );
        assert!(!state.is_guest());

        state.clear();
        assert!(state.is_guest());
        assert!(state.states().is_empty());
        assert_eq!(state.to_snapshot(), SessionSnapshot::guest());
    }
}
