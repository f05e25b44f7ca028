//! Session Lifecycle Hooks
//!
//! Named, ordered handler chains for the session identity lifecycle.
//!
//! # Phases
//!
//! - `restored`: after a persisted, non-guest session was hydrated
//! - `before_login`: before an identity is accepted - can deny the login
//! - `after_login`: after an identity was committed
//! - `before_logout`: before the session is cleared - can deny the logout
//! - `after_logout`: after the session was cleared
//!
//! # Decisions
//!
//! Before-hooks return a [`Decision`]. Handlers run in order and each one
//! sees the decision left by the handlers before it (`allow_login` /
//! `allow_logout` on the event); the value returned by the last handler is
//! what the session acts on. A handler without an opinion returns
//! `event.decision()`.
//!
//! # Example
//!
//! ```rust
//! use websess_core::hooks::{Decision, LifecycleHooks, Subscription};
//!
//! let mut hooks = LifecycleHooks::new();
//!
//! hooks.on_before_login("block-banned", |event| {
//!     if event.id.as_str() == "banned" {
//!         Decision::deny()
//!     } else {
//!         event.decision()
//!     }
//! });
//!
//! hooks.on_after_login(Subscription::new("audit").priority(10), |event| {
//!     println!("{} logged in (cookie: {})", event.id, event.from_cookie);
//! });
//! ```

mod chain;

pub use chain::{HookChain, Subscription, DEFAULT_PRIORITY};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::session::IdentityState;
use crate::types::{StateMap, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle Phase
// ─────────────────────────────────────────────────────────────────────────────

/// Point in the session lifecycle at which a hook chain runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// A persisted, authenticated session was hydrated.
    Restored,

    /// An identity is about to be logged in.
    /// Hooks at this phase can deny the login.
    BeforeLogin,

    /// An identity was logged in.
    AfterLogin,

    /// The session is about to be logged out.
    /// Hooks at this phase can deny the logout.
    BeforeLogout,

    /// The session was logged out.
    AfterLogout,
}

impl LifecyclePhase {
    /// All phases, in lifecycle order.
    pub const ALL: [LifecyclePhase; 5] = [
        LifecyclePhase::Restored,
        LifecyclePhase::BeforeLogin,
        LifecyclePhase::AfterLogin,
        LifecyclePhase::BeforeLogout,
        LifecyclePhase::AfterLogout,
    ];
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Restored => write!(f, "restored"),
            LifecyclePhase::BeforeLogin => write!(f, "before_login"),
            LifecyclePhase::AfterLogin => write!(f, "after_login"),
            LifecyclePhase::BeforeLogout => write!(f, "before_logout"),
            LifecyclePhase::AfterLogout => write!(f, "after_logout"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision & Events
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a before-hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allow: bool,
}

impl Decision {
    /// Let the transition proceed.
    pub fn allow() -> Self {
        Self { allow: true }
    }

    /// Cancel the transition.
    pub fn deny() -> Self {
        Self { allow: false }
    }

    pub fn is_allowed(&self) -> bool {
        self.allow
    }
}

impl Default for Decision {
    fn default() -> Self {
        Self::allow()
    }
}

impl From<bool> for Decision {
    fn from(allow: bool) -> Self {
        Self { allow }
    }
}

/// Payload of the `before_login` phase.
#[derive(Debug)]
pub struct BeforeLoginEvent<'a> {
    /// Identity about to be logged in.
    pub id: &'a UserId,
    /// States proposed for the new session.
    pub states: &'a StateMap,
    /// Whether the login comes from an auto-login cookie.
    pub from_cookie: bool,
    /// Decision left by the preceding handlers.
    pub allow_login: bool,
}

impl BeforeLoginEvent<'_> {
    /// The current decision, for handlers that do not want to change it.
    pub fn decision(&self) -> Decision {
        Decision::from(self.allow_login)
    }
}

/// Payload of the `after_login` phase.
#[derive(Debug)]
pub struct AfterLoginEvent<'a> {
    /// Identity that was logged in.
    pub id: &'a UserId,
    /// Whether the login came from an auto-login cookie.
    pub from_cookie: bool,
}

/// Payload of the `before_logout` phase.
#[derive(Debug)]
pub struct BeforeLogoutEvent<'a> {
    /// Identity about to be logged out.
    pub id: &'a UserId,
    /// Decision left by the preceding handlers.
    pub allow_logout: bool,
}

impl BeforeLogoutEvent<'_> {
    /// The current decision, for handlers that do not want to change it.
    pub fn decision(&self) -> Decision {
        Decision::from(self.allow_logout)
    }
}

/// Payload of the `after_logout` phase.
#[derive(Debug)]
pub struct AfterLogoutEvent<'a> {
    /// Identity that was logged out.
    pub id: &'a UserId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handler Types
// ─────────────────────────────────────────────────────────────────────────────

/// Handler run after hydration; may adjust the restored state.
pub type RestoredHandler = dyn Fn(&mut IdentityState) -> Result<()> + Send + Sync;

pub type BeforeLoginHandler = dyn Fn(&BeforeLoginEvent<'_>) -> Decision + Send + Sync;

pub type AfterLoginHandler = dyn Fn(&AfterLoginEvent<'_>) + Send + Sync;

pub type BeforeLogoutHandler = dyn Fn(&BeforeLogoutEvent<'_>) -> Decision + Send + Sync;

pub type AfterLogoutHandler = dyn Fn(&AfterLogoutEvent<'_>) + Send + Sync;

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle Hooks
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of handler chains, one per lifecycle phase.
#[derive(Debug, Default)]
pub struct LifecycleHooks {
    restored: HookChain<RestoredHandler>,
    before_login: HookChain<BeforeLoginHandler>,
    after_login: HookChain<AfterLoginHandler>,
    before_logout: HookChain<BeforeLogoutHandler>,
    after_logout: HookChain<AfterLogoutHandler>,
}

impl LifecycleHooks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `restored`.
    pub fn on_restored<F>(&mut self, subscription: impl Into<Subscription>, handler: F)
    where
        F: Fn(&mut IdentityState) -> Result<()> + Send + Sync + 'static,
    {
        let subscription = subscription.into();
        log_subscribe(LifecyclePhase::Restored, &subscription);
        self.restored.register(subscription, Arc::new(handler));
    }

    /// Subscribe to `before_login`.
    pub fn on_before_login<F>(&mut self, subscription: impl Into<Subscription>, handler: F)
    where
        F: Fn(&BeforeLoginEvent<'_>) -> Decision + Send + Sync + 'static,
    {
        let subscription = subscription.into();
        log_subscribe(LifecyclePhase::BeforeLogin, &subscription);
        self.before_login.register(subscription, Arc::new(handler));
    }

    /// Subscribe to `after_login`.
    pub fn on_after_login<F>(&mut self, subscription: impl Into<Subscription>, handler: F)
    where
        F: Fn(&AfterLoginEvent<'_>) + Send + Sync + 'static,
    {
        let subscription = subscription.into();
        log_subscribe(LifecyclePhase::AfterLogin, &subscription);
        self.after_login.register(subscription, Arc::new(handler));
    }

    /// Subscribe to `before_logout`.
    pub fn on_before_logout<F>(&mut self, subscription: impl Into<Subscription>, handler: F)
    where
        F: Fn(&BeforeLogoutEvent<'_>) -> Decision + Send + Sync + 'static,
    {
        let subscription = subscription.into();
        log_subscribe(LifecyclePhase::BeforeLogout, &subscription);
        self.before_logout.register(subscription, Arc::new(handler));
    }

    /// Subscribe to `after_logout`.
    pub fn on_after_logout<F>(&mut self, subscription: impl Into<Subscription>, handler: F)
    where
        F: Fn(&AfterLogoutEvent<'_>) + Send + Sync + 'static,
    {
        let subscription = subscription.into();
        log_subscribe(LifecyclePhase::AfterLogout, &subscription);
        self.after_logout.register(subscription, Arc::new(handler));
    }

    /// Remove every handler registered under `name` for one phase.
    ///
    /// Returns the number of handlers removed.
    pub fn unsubscribe(&mut self, phase: LifecyclePhase, name: &str) -> usize {
        match phase {
            LifecyclePhase::Restored => self.restored.unregister(name),
            LifecyclePhase::BeforeLogin => self.before_login.unregister(name),
            LifecyclePhase::AfterLogin => self.after_login.unregister(name),
            LifecyclePhase::BeforeLogout => self.before_logout.unregister(name),
            LifecyclePhase::AfterLogout => self.after_logout.unregister(name),
        }
    }

    /// Remove every handler registered under `name`, across all phases.
    pub fn unsubscribe_all(&mut self, name: &str) -> usize {
        LifecyclePhase::ALL
            .iter()
            .map(|phase| self.unsubscribe(*phase, name))
            .sum()
    }

    /// Handler names for a phase, in execution order.
    pub fn handler_names(&self, phase: LifecyclePhase) -> Vec<&str> {
        match phase {
            LifecyclePhase::Restored => self.restored.names(),
            LifecyclePhase::BeforeLogin => self.before_login.names(),
            LifecyclePhase::AfterLogin => self.after_login.names(),
            LifecyclePhase::BeforeLogout => self.before_logout.names(),
            LifecyclePhase::AfterLogout => self.after_logout.names(),
        }
    }

    /// Check whether any handler is registered for a phase.
    pub fn has_handlers(&self, phase: LifecyclePhase) -> bool {
        !self.handler_names(phase).is_empty()
    }

    // ── Dispatch ────────────────────────────────────────────────────────────

    /// Run the `restored` chain, stopping at the first failing handler.
    pub(crate) fn dispatch_restored(&self, state: &mut IdentityState) -> Result<()> {
        for (_, handler) in self.restored.iter() {
            handler(&mut *state)?;
        }
        Ok(())
    }

    /// Run the `before_login` chain and return the final decision.
    pub(crate) fn dispatch_before_login(&self, event: &mut BeforeLoginEvent<'_>) -> Decision {
        for (name, handler) in self.before_login.iter() {
            let decision = handler(&*event);
            if decision.allow != event.allow_login {
                debug!(hook = name, allow = decision.allow, "before_login decision changed");
            }
            event.allow_login = decision.allow;
        }
        event.decision()
    }

    pub(crate) fn dispatch_after_login(&self, event: &AfterLoginEvent<'_>) {
        for (_, handler) in self.after_login.iter() {
            handler(event);
        }
    }

    /// Run the `before_logout` chain and return the final decision.
    pub(crate) fn dispatch_before_logout(&self, event: &mut BeforeLogoutEvent<'_>) -> Decision {
        for (name, handler) in self.before_logout.iter() {
            let decision = handler(&*event);
            if decision.allow != event.allow_logout {
                debug!(hook = name, allow = decision.allow, "before_logout decision changed");
            }
            event.allow_logout = decision.allow;
        }
        event.decision()
    }

    pub(crate) fn dispatch_after_logout(&self, event: &AfterLogoutEvent<'_>) {
        for (_, handler) in self.after_logout.iter() {
            handler(event);
        }
    }
}

fn log_subscribe(phase: LifecyclePhase, subscription: &Subscription) {
    debug!(
        phase = %phase,
        hook = subscription.name(),
        priority = subscription.priority_value(),
        "hook subscribed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn login_event<'a>(id: &'a UserId, states: &'a StateMap) -> BeforeLoginEvent<'a> {
        BeforeLoginEvent {
            id,
            states,
            from_cookie: false,
            allow_login: true,
        }
    }

    #[test]
    fn test_lifecycle_phase_display() {
        assert_eq!(LifecyclePhase::Restored.to_string(), "restored");
        assert_eq!(LifecyclePhase::BeforeLogin.to_string(), "before_login");
        assert_eq!(LifecyclePhase::AfterLogout.to_string(), "after_logout");
    }

    #[test]
    fn test_decision() {
        assert!(Decision::default().is_allowed());
        assert!(!Decision::deny().is_allowed());
        assert_eq!(Decision::from(false), Decision::deny());
    }

    #[test]
    fn test_before_login_chain_sees_earlier_decisions() {
        let mut hooks = LifecycleHooks::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        hooks.on_before_login("deny", |_event| Decision::deny());
        let observed = Arc::clone(&seen);
        hooks.on_before_login("observer", move |event| {
            observed.lock().unwrap().push(event.allow_login);
            event.decision()
        });

        let id = UserId::from(1);
        let states = StateMap::new();
        let mut event = login_event(&id, &states);
        let decision = hooks.dispatch_before_login(&mut event);

        assert!(!decision.is_allowed());
        assert_eq!(*seen.lock().unwrap(), vec![false]);
    }

    #[test]
    fn test_later_handler_can_overturn_denial() {
        let mut hooks = LifecycleHooks::new();
        hooks.on_before_login("deny", |_event| Decision::deny());
        hooks.on_before_login("override", |_event| Decision::allow());

        let id = UserId::from(1);
        let states = StateMap::new();
        let mut event = login_event(&id, &states);
        assert!(hooks.dispatch_before_login(&mut event).is_allowed());
    }

    #[test]
    fn test_handlers_run_in_subscription_then_priority_order() {
        let mut hooks = LifecycleHooks::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second"] {
            let order = Arc::clone(&order);
            hooks.on_after_logout(name, move |_event| order.lock().unwrap().push(name));
        }
        let early = Arc::clone(&order);
        hooks.on_after_logout(Subscription::new("early").priority(10), move |_event| {
            early.lock().unwrap().push("early")
        });

        assert_eq!(
            hooks.handler_names(LifecyclePhase::AfterLogout),
            vec!["early", "first", "second"]
        );

        let id = UserId::from("u");
        hooks.dispatch_after_logout(&AfterLogoutEvent { id: &id });
        assert_eq!(*order.lock().unwrap(), vec!["early", "first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut hooks = LifecycleHooks::new();
        hooks.on_before_logout("guard", |_event| Decision::deny());
        hooks.on_after_logout("guard", |_event| {});
        hooks.on_after_login("audit", |_event| {});

        assert_eq!(hooks.unsubscribe(LifecyclePhase::BeforeLogout, "guard"), 1);
        assert!(!hooks.has_handlers(LifecyclePhase::BeforeLogout));
        assert!(hooks.has_handlers(LifecyclePhase::AfterLogout));

        assert_eq!(hooks.unsubscribe_all("guard"), 1);
        assert_eq!(hooks.unsubscribe_all("missing"), 0);
        assert!(hooks.has_handlers(LifecyclePhase::AfterLogin));
    }

    #[test]
    fn test_before_logout_without_handlers_allows() {
        let hooks = LifecycleHooks::new();
        let id = UserId::from(3);
        let mut event = BeforeLogoutEvent {
            id: &id,
            allow_logout: true,
        };
        assert!(hooks.dispatch_before_logout(&mut event).is_allowed());
    }
}
