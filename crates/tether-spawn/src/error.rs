//! Error types for spawn adapters

use tether_core::CallbackError;

use crate::registry::RegistryKey;

/// Failures surfaced synchronously to whoever starts a unit.
///
/// A unit that fails during wrapped init fails to start, exactly as if its
/// own initializer had failed; the starter never sees a silent partial state.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    /// A live unit already holds this registration key
    #[error("unit already registered under {0}")]
    AlreadyRegistered(RegistryKey),

    /// A startup callback faulted before the user initializer ran
    #[error("startup callback fault: {0}")]
    Callback(#[from] CallbackError),

    /// The unit's own initializer failed
    #[error("unit init failed: {0}")]
    Init(anyhow::Error),

    /// The unit exited before reporting an init result
    #[error("unit exited before init completed")]
    InitInterrupted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::PathKey;

    #[test]
    fn display_names_the_registration_key() {
        let key = RegistryKey::new(PathKey::name("Worker"), PathKey::name("t1"));
        let err = SpawnError::AlreadyRegistered(key);
        assert!(err.to_string().contains("Worker@t1"));
    }
}
