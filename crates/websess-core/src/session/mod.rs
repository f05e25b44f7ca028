//! Session identity lifecycle.
//!
//! ## Lifecycle
//!
//! ```text
//! Hydrate (load snapshot from SessionStore)
//!   │
//!   └─► restore() ── non-guest ──► restored hooks (once per hydration)
//!
//! Guest ──login()──► before_login hooks ── allowed ──► commit ──► after_login hooks
//!                                        └─ denied ──► unchanged, returns false
//!
//! Authenticated ──logout()──► before_logout hooks ── allowed ──► clear ──► after_logout hooks
//!                                                   └─ denied ──► unchanged
//!
//! Authenticated ──set_id(None) / force_logout()──► Guest (no hooks)
//! ```

mod identity;
mod state;

pub use identity::*;
pub use state::IdentityState;
