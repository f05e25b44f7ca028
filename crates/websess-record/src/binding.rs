//! Lazy, cached binding between a session identity and its user record.

use std::fmt;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, warn};
use websess_core::hooks::LifecyclePhase;
use websess_core::{Error, IdentityState, Result, SessionIdentity, UserId};

use crate::config::RecordBindingConfig;
use crate::repository::{Record, RecordRepository};

/// Name of the `restored` hook installed when auto-sync is enabled.
pub const AUTO_SYNC_HOOK: &str = "record-binding.auto-sync";

/// The single cached lookup: the ID it was made for and its result.
struct RecordCache<T> {
    entry: Option<(UserId, Option<Arc<T>>)>,
}

impl<T> Default for RecordCache<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

/// State shared between the binding and its `restored` hook.
struct BindingInner<R: RecordRepository> {
    repository: Arc<R>,
    config: RecordBindingConfig<R::Criteria>,
    cache: Mutex<RecordCache<R::Record>>,
}

impl<R: RecordRepository> BindingInner<R> {
    /// Record for the current principal, looked up at most once per ID.
    fn record_for(&self, state: &IdentityState) -> Result<Option<Arc<R::Record>>> {
        let Some(id) = state.id() else {
            return Ok(None);
        };

        let mut cache = self.cache.lock().map_err(|_| Error::LockPoisoned)?;
        if let Some((cached_id, record)) = &cache.entry {
            if cached_id == id {
                return Ok(record.clone());
            }
        }

        debug!(id = %id, "record cache miss");
        let record = self
            .repository
            .find_by_id(id, &self.config.model_find_criteria)?
            .map(Arc::new);
        cache.entry = Some((id.clone(), record.clone()));
        Ok(record)
    }

    fn store(&self, record: Option<Arc<R::Record>>) -> Result<()> {
        let mut cache = self.cache.lock().map_err(|_| Error::LockPoisoned)?;
        cache.entry = record.map(|record| (record.primary_key(), Some(record)));
        Ok(())
    }

    /// Copy mapped attributes into states, or invalidate the session when
    /// its record no longer exists.
    fn sync(&self, state: &mut IdentityState) -> Result<()> {
        if state.is_guest() {
            return Ok(());
        }

        match self.record_for(state)? {
            None => {
                if let Some(id) = state.id() {
                    warn!(id = %id, "user record not found, invalidating session");
                }
                state.clear();
            }
            Some(record) => {
                for (attribute, key) in &self.config.attribute_to_state_map {
                    let value = record.attribute(attribute).unwrap_or(Value::Null);
                    state.set_state(key.clone(), value);
                }
            }
        }
        Ok(())
    }
}

/// Session identity extended with access to its user record.
///
/// Owns the identity it was attached to; use [`identity`](Self::identity) /
/// [`identity_mut`](Self::identity_mut) for login, logout and states.
pub struct RecordBinding<R: RecordRepository> {
    identity: SessionIdentity,
    inner: Arc<BindingInner<R>>,
}

impl<R: RecordRepository> RecordBinding<R> {
    /// Attach a binding to a session identity.
    ///
    /// With `auto_sync_model` enabled, [`sync_record`](Self::sync_record)
    /// runs as a `restored` hook.
    pub fn attach(
        mut identity: SessionIdentity,
        repository: Arc<R>,
        config: RecordBindingConfig<R::Criteria>,
    ) -> Result<Self> {
        config.validate()?;

        let inner = Arc::new(BindingInner {
            repository,
            config,
            cache: Mutex::new(RecordCache::default()),
        });

        if inner.config.auto_sync_model {
            let hook_inner = Arc::clone(&inner);
            identity
                .hooks_mut()
                .on_restored(AUTO_SYNC_HOOK, move |state| hook_inner.sync(state));
        }

        Ok(Self { identity, inner })
    }

    /// Record of the current principal; `None` for guests or missing records.
    pub fn get_record(&self) -> Result<Option<Arc<R::Record>>> {
        self.inner.record_for(self.identity.identity_state())
    }

    /// Switch the session to `record`'s principal, without login hooks.
    ///
    /// `None` turns the session into a guest (without logout hooks).
    /// Otherwise states are synchronized from the new record.
    pub fn set_record(&mut self, record: Option<R::Record>) -> Result<()> {
        match record {
            None => {
                self.inner.store(None)?;
                self.identity.set_id(None);
                Ok(())
            }
            Some(record) => {
                let id = record.primary_key();
                self.inner.store(Some(Arc::new(record)))?;
                self.identity.set_id(Some(id));
                self.sync_record()
            }
        }
    }

    /// Synchronize session states with the record.
    ///
    /// A no-op for guests. When the record is gone the session is cleared
    /// without running logout hooks.
    pub fn sync_record(&mut self) -> Result<()> {
        self.inner.sync(self.identity.identity_state_mut())
    }

    /// Run the identity's `restored` hooks (including auto-sync).
    pub fn restore(&mut self) -> Result<bool> {
        self.identity.restore()
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn identity_mut(&mut self) -> &mut SessionIdentity {
        &mut self.identity
    }

    pub fn config(&self) -> &RecordBindingConfig<R::Criteria> {
        &self.inner.config
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.inner.repository
    }

    /// Remove the binding, returning the identity without the auto-sync hook.
    pub fn detach(mut self) -> SessionIdentity {
        self.identity
            .hooks_mut()
            .unsubscribe(LifecyclePhase::Restored, AUTO_SYNC_HOOK);
        self.identity
    }
}

impl<R: RecordRepository> fmt::Debug for RecordBinding<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordBinding")
            .field("identity", &self.identity)
            .field("auto_sync_model", &self.inner.config.auto_sync_model)
            .field("attribute_to_state_map", &self.inner.config.attribute_to_state_map)
            .finish_non_exhaustive()
    }
}
