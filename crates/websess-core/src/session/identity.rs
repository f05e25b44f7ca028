//! Session identity with cancellable login/logout hooks.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use super::state::IdentityState;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::hooks::{
    AfterLoginEvent, AfterLogoutEvent, BeforeLoginEvent, BeforeLogoutEvent, LifecycleHooks,
};
use crate::store::{MemorySessionStore, SessionStore};
use crate::types::{SessionSnapshot, StateMap, UserId, VerifiedIdentity, NAME_STATE_KEY};

/// Authenticated/guest state of one logical session.
///
/// All mutations take `&mut self`; share a session across threads by
/// wrapping it in a `Mutex`.
pub struct SessionIdentity {
    state: IdentityState,
    hooks: LifecycleHooks,
    config: SessionConfig,
    store: Arc<dyn SessionStore>,
    restored: bool,
}

impl SessionIdentity {
    /// Create a guest session backed by a process-local store.
    pub fn new() -> Self {
        Self {
            state: IdentityState::new(),
            hooks: LifecycleHooks::new(),
            config: SessionConfig::default(),
            store: Arc::new(MemorySessionStore::new()),
            restored: false,
        }
    }

    /// Hydrate a session from a store with the default configuration.
    pub fn hydrate(store: Arc<dyn SessionStore>) -> Result<Self> {
        Self::hydrate_with_config(store, SessionConfig::default())
    }

    /// Hydrate a session from a store.
    ///
    /// Hooks are not run here; subscribe them, then call [`restore`](Self::restore).
    pub fn hydrate_with_config(store: Arc<dyn SessionStore>, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let snapshot = store.load()?;
        debug!(guest = snapshot.id.is_none(), "session hydrated");

        Ok(Self {
            state: IdentityState::from_snapshot(snapshot),
            hooks: LifecycleHooks::new(),
            config,
            store,
            restored: false,
        })
    }

    /// Reload identity and states from the store, starting a new hydration.
    ///
    /// Subscribed hooks are kept.
    pub fn rehydrate(&mut self) -> Result<()> {
        let snapshot = self.store.load()?;
        self.state = IdentityState::from_snapshot(snapshot);
        self.restored = false;
        Ok(())
    }

    /// Persist identity and states to the store.
    pub fn save(&self) -> Result<()> {
        self.store.save(&self.state.to_snapshot())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.to_snapshot()
    }

    pub fn hooks(&self) -> &LifecycleHooks {
        &self.hooks
    }

    /// Hook registry, for subscribing lifecycle handlers.
    pub fn hooks_mut(&mut self) -> &mut LifecycleHooks {
        &mut self.hooks
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Run the `restored` hooks for a hydrated, authenticated session.
    ///
    /// Fires at most once per hydration and never for guests. Returns whether
    /// the hooks ran.
    pub fn restore(&mut self) -> Result<bool> {
        if self.restored {
            return Ok(false);
        }
        self.restored = true;

        let Some(id) = self.state.id().cloned() else {
            debug!("guest session, restore skipped");
            return Ok(false);
        };

        debug!(id = %id, "session restored");
        self.hooks.dispatch_restored(&mut self.state)?;
        Ok(true)
    }

    /// Whether [`restore`](Self::restore) already ran for this hydration.
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    /// Log in as `id` with the given states.
    ///
    /// Returns `false`, leaving the session untouched, when a `before_login`
    /// hook denies the login.
    pub fn login(&mut self, id: impl Into<UserId>, states: StateMap, from_cookie: bool) -> bool {
        self.login_inner(id.into(), states, None, from_cookie)
    }

    /// Log in with an identity whose credentials were already verified.
    ///
    /// On success the identity name becomes the session display name.
    pub fn login_with(&mut self, identity: &impl VerifiedIdentity) -> bool {
        self.login_inner(
            identity.id(),
            identity.persistent_states(),
            Some(identity.name()),
            false,
        )
    }

    fn login_inner(
        &mut self,
        id: UserId,
        mut states: StateMap,
        name: Option<String>,
        from_cookie: bool,
    ) -> bool {
        let mut event = BeforeLoginEvent {
            id: &id,
            states: &states,
            from_cookie,
            allow_login: true,
        };
        if !self.hooks.dispatch_before_login(&mut event).is_allowed() {
            info!(id = %id, from_cookie, "login denied by before_login hook");
            return false;
        }

        if let Some(name) = name {
            states.insert(NAME_STATE_KEY.to_string(), Value::String(name));
        }
        self.state.commit(id.clone(), states);
        info!(id = %id, from_cookie, "login accepted");

        self.hooks
            .dispatch_after_login(&AfterLoginEvent { id: &id, from_cookie });
        true
    }

    /// Log out, clearing identity and states.
    ///
    /// A no-op for guests and when a `before_logout` hook denies the logout.
    /// Returns whether the session was logged out.
    pub fn logout(&mut self) -> bool {
        let Some(id) = self.state.id().cloned() else {
            return false;
        };

        let mut event = BeforeLogoutEvent {
            id: &id,
            allow_logout: true,
        };
        if !self.hooks.dispatch_before_logout(&mut event).is_allowed() {
            info!(id = %id, "logout denied by before_logout hook");
            return false;
        }

        self.state.clear();
        info!(id = %id, "logout accepted");

        self.hooks.dispatch_after_logout(&AfterLogoutEvent { id: &id });
        true
    }

    /// Clear identity and states without running any hook.
    pub fn force_logout(&mut self) {
        if let Some(id) = self.state.id() {
            info!(id = %id, "session invalidated");
        }
        self.state.clear();
    }

    /// Overwrite the principal directly, bypassing login hooks.
    pub fn set_id(&mut self, id: Option<UserId>) {
        debug!(id = ?id.as_ref().map(UserId::as_str), "identity switched");
        self.state.set_id(id);
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn id(&self) -> Option<&UserId> {
        self.state.id()
    }

    pub fn is_guest(&self) -> bool {
        self.state.is_guest()
    }

    /// Display name, falling back to the configured guest name.
    pub fn name(&self) -> String {
        match self.state.state(NAME_STATE_KEY) {
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => self.config.guest_name.clone(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.state.set_state(NAME_STATE_KEY, name.into());
    }

    pub fn state(&self, key: &str) -> Option<&Value> {
        self.state.state(key)
    }

    /// Write a named state. Writing `null` removes the key.
    pub fn set_state(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.state.set_state(key, value);
    }

    pub fn remove_state(&mut self, key: &str) -> Option<Value> {
        self.state.remove_state(key)
    }

    pub fn has_state(&self, key: &str) -> bool {
        self.state.has_state(key)
    }

    pub fn clear_states(&mut self) {
        self.state.clear_states();
    }

    pub fn states(&self) -> &StateMap {
        self.state.states()
    }

    pub fn identity_state(&self) -> &IdentityState {
        &self.state
    }

    /// Direct access to identity and states, bypassing every hook.
    pub fn identity_state_mut(&mut self) -> &mut IdentityState {
        &mut self.state
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIdentity")
            .field("state", &self.state)
            .field("hooks", &self.hooks)
            .field("config", &self.config)
            .field("restored", &self.restored)
            .finish_non_exhaustive()
    }
}
