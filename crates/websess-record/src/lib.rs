//! websess-record - User record binding for session identities
//!
//! Extends a [`SessionIdentity`](websess_core::SessionIdentity) with its
//! backing user record:
//!
//! - **binding**: `RecordBinding`, lazy per-ID record lookup with a
//!   single-entry cache and state synchronization
//! - **repository**: the `Record` / `RecordRepository` seams to the host's
//!   data-access layer
//! - **config**: find criteria, auto-sync and attribute → state mapping
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use websess_core::SessionIdentity;
//! use websess_record::{Record, RecordBinding, RecordBindingConfig, RecordRepository};
//!
//! fn bind<R: RecordRepository>(
//!     identity: SessionIdentity,
//!     repository: Arc<R>,
//!     criteria: R::Criteria,
//! ) -> websess_core::Result<()> {
//!     let config = RecordBindingConfig::new(criteria)
//!         .map_attribute("username", "__name")
//!         .map_attribute("email", "email");
//!
//!     let mut binding = RecordBinding::attach(identity, repository, config)?;
//!     binding.restore()?;
//!
//!     if let Some(record) = binding.get_record()? {
//!         println!("logged in as {}", record.primary_key());
//!     }
//!     Ok(())
//! }
//! ```

pub mod binding;
pub mod config;
pub mod repository;

#[cfg(test)]
mod test_support;

pub use binding::{RecordBinding, AUTO_SYNC_HOOK};
pub use config::RecordBindingConfig;
pub use repository::{serialized_attribute, Record, RecordRepository};
