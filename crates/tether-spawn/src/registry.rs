//! Named lookup of running units
//!
//! Maps a `(process key, owner)` composite to a live [`UnitHandle`]. The map
//! is the one genuinely shared resource in the system; `DashMap` supplies the
//! atomic register/lookup/unregister semantics.

use std::fmt::{self, Display, Formatter};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;

use tether_core::PathKey;

use crate::error::SpawnError;
use crate::handle::{UnitHandle, UnitId};

static GLOBAL: Lazy<NamedLookup> = Lazy::new(NamedLookup::new);

/// Composite registration key: which unit, for which owner.
///
/// Singleton units use their kind as the process key; multi-instance units
/// use an instance key derived from their input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryKey {
    process_key: PathKey,
    owner: PathKey,
}

impl RegistryKey {
    /// Compose a registration key
    #[inline]
    #[must_use]
    pub fn new(process_key: PathKey, owner: PathKey) -> Self {
        Self { process_key, owner }
    }

    /// The unit-specific component
    #[inline]
    #[must_use]
    pub fn process_key(&self) -> &PathKey {
        &self.process_key
    }

    /// The owning session's key
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &PathKey {
        &self.owner
    }
}

impl Display for RegistryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.process_key, self.owner)
    }
}

/// Registry of running units keyed by [`RegistryKey`]
#[derive(Debug, Default)]
pub struct NamedLookup {
    entries: DashMap<RegistryKey, UnitHandle>,
}

impl NamedLookup {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The process-wide registry the spawn adapters register into
    #[inline]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Register a handle under its key.
    ///
    /// A stale entry left by a unit that already stopped is replaced; a live
    /// one is a conflict.
    ///
    /// # Errors
    /// [`SpawnError::AlreadyRegistered`] if a live unit holds the key.
    pub fn register(&self, handle: UnitHandle) -> Result<(), SpawnError> {
        match self.entries.entry(handle.key().clone()) {
            Entry::Occupied(mut slot) => {
                if slot.get().is_alive() {
                    return Err(SpawnError::AlreadyRegistered(handle.key().clone()));
                }
                tracing::trace!(key = %handle.key(), "replacing stale registration");
                slot.insert(handle);
                Ok(())
            }
            Entry::Vacant(slot) => {
                slot.insert(handle);
                Ok(())
            }
        }
    }

    /// Look up the live handle for a key; `None` is a normal miss
    #[inline]
    #[must_use]
    pub fn lookup(&self, key: &RegistryKey) -> Option<UnitHandle> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Remove a registration, but only if it still belongs to the given unit
    /// instance; a successor registered under the same key is left alone.
    pub fn unregister_if(&self, key: &RegistryKey, id: UnitId) {
        self.entries.remove_if(key, |_, handle| handle.id() == id);
    }

    /// Number of registered units
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::watch;

    fn key(owner: &str) -> RegistryKey {
        RegistryKey::new(PathKey::name("Worker"), PathKey::name(owner))
    }

    fn handle(key: RegistryKey) -> (watch::Sender<bool>, UnitHandle) {
        let (done_tx, done_rx) = watch::channel(false);
        let join = tokio::spawn(async {});
        (
            done_tx,
            UnitHandle::new(UnitId::new(), key, join.abort_handle(), done_rx),
        )
    }

    #[tokio::test]
    async fn register_and_lookup() {
        let lookup = NamedLookup::new();
        let (_done, unit) = handle(key("r1"));

        lookup.register(unit.clone()).unwrap();
        let found = lookup.lookup(&key("r1")).unwrap();
        assert_eq!(found.id(), unit.id());
        assert!(lookup.lookup(&key("other")).is_none());
    }

    #[tokio::test]
    async fn live_duplicate_is_rejected() {
        let lookup = NamedLookup::new();
        let (_done_a, a) = handle(key("r2"));
        let (_done_b, b) = handle(key("r2"));

        lookup.register(a).unwrap();
        let err = lookup.register(b).unwrap_err();
        assert!(matches!(err, SpawnError::AlreadyRegistered(_)));
    }

    #[tokio::test]
    async fn stale_entry_is_replaced() {
        let lookup = NamedLookup::new();
        let (done_a, a) = handle(key("r3"));
        let (_done_b, b) = handle(key("r3"));
        let b_id = b.id();

        lookup.register(a).unwrap();
        done_a.send(true).unwrap();
        lookup.register(b).unwrap();
        assert_eq!(lookup.lookup(&key("r3")).unwrap().id(), b_id);
    }

    #[tokio::test]
    async fn unregister_respects_instance_identity() {
        let lookup = NamedLookup::new();
        let (_done_a, a) = handle(key("r4"));
        let a_id = a.id();
        let (_done_b, b) = handle(key("r4"));
        let b_id = b.id();

        lookup.register(a).unwrap();
        // stale id does not evict the current registration
        lookup.unregister_if(&key("r4"), b_id);
        assert!(lookup.lookup(&key("r4")).is_some());

        lookup.unregister_if(&key("r4"), a_id);
        assert!(lookup.lookup(&key("r4")).is_none());
    }
}
