//! Process-style spawn adapter
//!
//! Turns "start a unit given an envelope" into: the unit runs with a derived
//! config stored in its own ambient slot, startup callbacks already fired,
//! and an identity path extended by the unit's own key. Units are registered
//! in the global [`NamedLookup`] so peers can find them by
//! `(process key, owner)`.

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};

use tether_core::{ambient, Envelope, PathKey};

use crate::error::SpawnError;
use crate::handle::{DoneGuard, UnitHandle, UnitId};
use crate::registry::{NamedLookup, RegistryKey};

/// A long-lived, individually addressable unit.
///
/// The default [`ProcessUnit::process_key`] makes a unit a singleton per
/// owner; units that need several live instances per owner override it to
/// derive an instance key from their input. The key must be a pure function
/// of the input.
#[async_trait]
pub trait ProcessUnit: Sized + Send + 'static {
    /// Opaque input carried through the envelope
    type Input: Send + 'static;

    /// Unit-type identifier; the default registration key
    fn unit_kind() -> &'static str;

    /// Registration-key component for this input
    fn process_key(_input: &Self::Input) -> PathKey {
        PathKey::name(Self::unit_kind())
    }

    /// User initializer. Runs inside the unit with the derived config
    /// already ambient and callbacks already executed; full control over
    /// start success.
    async fn init(input: Self::Input) -> anyhow::Result<Self>;

    /// Unit body, entered after a successful init
    async fn run(self);
}

/// Start a unit from an envelope.
///
/// Blocks until the unit's wrapped init completes: derive the child config,
/// make it ambient, execute its callbacks, then run [`ProcessUnit::init`].
/// Any failure along that path is a start failure; the unit is unregistered
/// and the error surfaces here.
///
/// # Errors
/// [`SpawnError::AlreadyRegistered`] when a live unit holds the key;
/// [`SpawnError::Callback`] and [`SpawnError::Init`] for wrapped-init
/// failures; [`SpawnError::InitInterrupted`] if the unit vanished first.
pub async fn start_unit<U: ProcessUnit>(
    envelope: Envelope<U::Input>,
) -> Result<UnitHandle, SpawnError> {
    let (config, input) = envelope.into_parts();
    let process_key = U::process_key(&input);
    let key = RegistryKey::new(process_key.clone(), config.owner().clone());
    let unit_id = UnitId::new();
    let derived = config.derive_child(process_key);

    let (init_tx, init_rx) = oneshot::channel::<Result<(), SpawnError>>();
    let (go_tx, go_rx) = oneshot::channel::<()>();
    let (done_tx, done_rx) = watch::channel(false);
    let guard = DoneGuard::registered(unit_id, key.clone(), done_tx);

    let wrapped = {
        let derived = derived.clone();
        async move {
            let _guard = guard;
            // registration failed on the starter side; never run init
            if go_rx.await.is_err() {
                return;
            }
            let started = match derived.execute_callbacks() {
                Ok(()) => U::init(input).await.map_err(SpawnError::Init),
                Err(fault) => Err(SpawnError::Callback(fault)),
            };
            match started {
                Ok(unit) => {
                    if init_tx.send(Ok(())).is_err() {
                        return;
                    }
                    unit.run().await;
                }
                Err(error) => {
                    let _ = init_tx.send(Err(error));
                }
            }
        }
    };

    let join = tokio::spawn(ambient::scope(derived, wrapped));
    let handle = UnitHandle::new(unit_id, key.clone(), join.abort_handle(), done_rx);

    if let Err(error) = NamedLookup::global().register(handle.clone()) {
        drop(go_tx);
        return Err(error);
    }
    let _ = go_tx.send(());

    match init_rx.await {
        Ok(Ok(())) => {
            tracing::debug!(key = %key, unit = %unit_id, "unit started");
            Ok(handle)
        }
        Ok(Err(error)) => {
            NamedLookup::global().unregister_if(&key, unit_id);
            tracing::debug!(key = %key, %error, "unit failed to start");
            Err(error)
        }
        Err(_) => {
            NamedLookup::global().unregister_if(&key, unit_id);
            Err(SpawnError::InitInterrupted)
        }
    }
}

/// Registration key from explicit owner and input
#[must_use]
pub fn via_key<U: ProcessUnit>(owner: PathKey, input: &U::Input) -> RegistryKey {
    RegistryKey::new(U::process_key(input), owner)
}

/// Registration key with the owner taken from the ambient config
#[must_use]
pub fn via_key_ambient<U: ProcessUnit>(input: &U::Input) -> RegistryKey {
    via_key::<U>(ambient::current().owner().clone(), input)
}

/// Registration key with the owner taken from an envelope's config
#[must_use]
pub fn via_key_envelope<U: ProcessUnit>(envelope: &Envelope<U::Input>) -> RegistryKey {
    via_key::<U>(envelope.config().owner().clone(), envelope.input())
}

/// Registration key for a singleton unit (default process key), owner from
/// the ambient config
#[must_use]
pub fn via_key_current<U: ProcessUnit>() -> RegistryKey {
    RegistryKey::new(
        PathKey::name(U::unit_kind()),
        ambient::current().owner().clone(),
    )
}

/// Live handle for the unit this input addresses, under the ambient owner
#[must_use]
pub fn get_handle<U: ProcessUnit>(input: &U::Input) -> Option<UnitHandle> {
    NamedLookup::global().lookup(&via_key_ambient::<U>(input))
}

/// Live handle for the unit this input addresses, under an explicit owner
#[must_use]
pub fn get_handle_for<U: ProcessUnit>(owner: PathKey, input: &U::Input) -> Option<UnitHandle> {
    NamedLookup::global().lookup(&via_key::<U>(owner, input))
}

/// Whether a registered, still-running unit answers for this input
#[must_use]
pub fn is_alive<U: ProcessUnit>(input: &U::Input) -> bool {
    get_handle::<U>(input).is_some_and(|handle| handle.is_alive())
}

/// Resolve a unit from its input and terminate it.
///
/// # Errors
/// [`TerminateError::NoProcess`](crate::TerminateError::NoProcess) when
/// nothing is registered for the input; otherwise as
/// [`UnitHandle::terminate`].
#[cfg(any(test, feature = "test-support"))]
pub async fn terminate_unit<U: ProcessUnit>(
    input: &U::Input,
) -> Result<(), crate::handle::TerminateError> {
    crate::handle::terminate(get_handle::<U>(input)).await
}
