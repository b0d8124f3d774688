//! Handles for spawned units
//!
//! A [`UnitHandle`] is the cloneable face of a running unit: registry key,
//! liveness flag, and (in test builds) remote termination. Liveness is
//! tracked by a watch channel whose sender lives inside the spawned future,
//! so the flag flips whether the unit returns normally or is aborted.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::registry::{NamedLookup, RegistryKey};

#[cfg(any(test, feature = "test-support"))]
const TERMINATE_TIMEOUT: Duration = Duration::from_secs(1);

/// Unique identifier of one spawned unit instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId(pub Uuid);

impl UnitId {
    /// Fresh random id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UnitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors from test-only remote termination
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TerminateError {
    /// No live unit resolved for the request
    #[error("no process found")]
    NoProcess,

    /// The unit did not report termination within the bound
    #[error("unit did not terminate within {0:?}")]
    Timeout(Duration),
}

/// Live handle to a registered unit
#[derive(Debug, Clone)]
pub struct UnitHandle {
    id: UnitId,
    key: RegistryKey,
    // only read by test-support termination
    #[cfg_attr(not(any(test, feature = "test-support")), allow(dead_code))]
    abort: AbortHandle,
    done: watch::Receiver<bool>,
}

impl UnitHandle {
    pub(crate) fn new(
        id: UnitId,
        key: RegistryKey,
        abort: AbortHandle,
        done: watch::Receiver<bool>,
    ) -> Self {
        Self {
            id,
            key,
            abort,
            done,
        }
    }

    /// Identifier of this unit instance
    #[inline]
    #[must_use]
    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Registration key the unit runs under
    #[inline]
    #[must_use]
    pub fn key(&self) -> &RegistryKey {
        &self.key
    }

    /// Whether the unit is still running
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !*self.done.borrow()
    }

    /// Signal the unit to stop and wait up to one second for it to go down.
    ///
    /// # Errors
    /// [`TerminateError::Timeout`] if no termination was observed in time.
    #[cfg(any(test, feature = "test-support"))]
    pub async fn terminate(&self) -> Result<(), TerminateError> {
        tracing::debug!(key = %self.key, unit = %self.id, "terminating unit");
        self.abort.abort();
        let mut done = self.done.clone();
        let finished = async move {
            loop {
                if *done.borrow_and_update() {
                    break;
                }
                // channel closed means the unit future is gone
                if done.changed().await.is_err() {
                    break;
                }
            }
        };
        tokio::time::timeout(TERMINATE_TIMEOUT, finished)
            .await
            .map_err(|_| TerminateError::Timeout(TERMINATE_TIMEOUT))
    }
}

/// Terminate a possibly-resolved unit.
///
/// `None` reports [`TerminateError::NoProcess`] immediately; a handle is
/// terminated as in [`UnitHandle::terminate`].
///
/// # Errors
/// See [`TerminateError`].
#[cfg(any(test, feature = "test-support"))]
pub async fn terminate(handle: Option<UnitHandle>) -> Result<(), TerminateError> {
    match handle {
        Some(handle) => handle.terminate().await,
        None => Err(TerminateError::NoProcess),
    }
}

/// Handle to a running supervisor unit.
///
/// Supervisors are not registered for addressed lookup, so the handle only
/// exposes liveness.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    done: watch::Receiver<bool>,
}

impl SupervisorHandle {
    pub(crate) fn new(done: watch::Receiver<bool>) -> Self {
        Self { done }
    }

    /// Whether the supervisor is still running
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !*self.done.borrow()
    }
}

/// Owned by every spawned wrapper future. Whether the unit returns normally
/// or its future is dropped by an abort, the drop unregisters the unit and
/// flips the done flag, in that order, so an observed termination implies
/// the registry entry is gone.
pub(crate) struct DoneGuard {
    entry: Option<(UnitId, RegistryKey)>,
    done: watch::Sender<bool>,
}

impl DoneGuard {
    pub(crate) fn registered(id: UnitId, key: RegistryKey, done: watch::Sender<bool>) -> Self {
        Self {
            entry: Some((id, key)),
            done,
        }
    }

    pub(crate) fn detached(done: watch::Sender<bool>) -> Self {
        Self { entry: None, done }
    }
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        if let Some((id, key)) = self.entry.take() {
            NamedLookup::global().unregister_if(&key, id);
            tracing::trace!(key = %key, unit = %id, "unit finished; registration removed");
        }
        let _ = self.done.send(true);
    }
}
