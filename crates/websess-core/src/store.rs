//! Session store seam.
//!
//! The persistent session backend (cookies, server-side sessions, ...) is
//! provided by the host application. The core only loads a snapshot on
//! hydration and writes one back on save.

use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::types::SessionSnapshot;

/// Backend that persists a session's identity and states across requests.
pub trait SessionStore: Send + Sync {
    /// Load the persisted snapshot; an empty session loads as a guest.
    fn load(&self) -> Result<SessionSnapshot>;

    /// Persist the given snapshot, replacing what was stored.
    fn save(&self, snapshot: &SessionSnapshot) -> Result<()>;
}

/// Process-local store holding a single snapshot.
///
/// Thread-safe via internal Mutex.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    snapshot: Mutex<SessionSnapshot>,
}

impl MemorySessionStore {
    /// Create an empty (guest) store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a snapshot.
    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
        }
    }

    /// Copy of the currently stored snapshot.
    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        let snapshot = self.snapshot.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(snapshot.clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionSnapshot> {
        self.snapshot()
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let mut stored = self.snapshot.lock().map_err(|_| Error::LockPoisoned)?;
        *stored = snapshot.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load().unwrap(), SessionSnapshot::guest());

        let snapshot = SessionSnapshot::authenticated("u1").with_state("theme", json!("dark"));
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), snapshot);
    }
}
