//! websess-core - Session identity lifecycle
//!
//! Tracks who is logged in to one logical session and surrounds every
//! transition with hooks:
//!
//! - **session**: `SessionIdentity`, the guest/authenticated state machine
//! - **hooks**: ordered, named handler chains with cancellable before-hooks
//! - **store**: the `SessionStore` seam to the host's session backend
//! - **types**: user IDs, state maps, snapshots and verified identities
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use websess_core::hooks::Decision;
//! use websess_core::store::MemorySessionStore;
//! use websess_core::{SessionIdentity, StateMap};
//!
//! # fn main() -> websess_core::Result<()> {
//! let mut session = SessionIdentity::hydrate(Arc::new(MemorySessionStore::new()))?;
//!
//! session.hooks_mut().on_before_login("maintenance", |event| {
//!     if event.from_cookie { Decision::deny() } else { event.decision() }
//! });
//!
//! session.restore()?;
//! assert!(session.login(5, StateMap::new(), false));
//! assert!(!session.login(6, StateMap::new(), true));
//! session.save()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod hooks;
pub mod session;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{ConfigValidationError, SessionConfig};
pub use error::{Error, Result};
pub use session::{IdentityState, SessionIdentity};
pub use store::SessionStore;
pub use types::{SessionSnapshot, StateMap, UserId, VerifiedIdentity, NAME_STATE_KEY};
