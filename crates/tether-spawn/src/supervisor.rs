//! Supervisor-style spawn adapter
//!
//! Same wrapped-init contract as the process adapter, minus registration:
//! supervisors own a set of children and are not individually addressed.
//! Children are not auto-wrapped — the supervisor's init reads
//! `ambient::current()` itself and builds an envelope for every child it
//! starts, so a missed wrap is visible in caller code.

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};

use tether_core::{ambient, Envelope, PathKey};

use crate::error::SpawnError;
use crate::handle::{DoneGuard, SupervisorHandle};

/// A unit that owns children and needs no addressed lookup
#[async_trait]
pub trait SupervisorUnit: Sized + Send + 'static {
    /// Opaque input carried through the envelope
    type Input: Send + 'static;

    /// Unit-type identifier, used as the derived path segment
    fn unit_kind() -> &'static str;

    /// User initializer; responsible for wrapping each child it starts
    async fn init(input: Self::Input) -> anyhow::Result<Self>;

    /// Unit body, entered after a successful init
    async fn run(self);
}

/// Start a supervising unit from an envelope.
///
/// Blocks until wrapped init completes, exactly like
/// [`start_unit`](crate::start_unit), but performs no registration.
///
/// # Errors
/// [`SpawnError::Callback`], [`SpawnError::Init`], or
/// [`SpawnError::InitInterrupted`], as for the process adapter.
pub async fn start_supervisor<S: SupervisorUnit>(
    envelope: Envelope<S::Input>,
) -> Result<SupervisorHandle, SpawnError> {
    let (config, input) = envelope.into_parts();
    let derived = config.derive_child(PathKey::name(S::unit_kind()));

    let (init_tx, init_rx) = oneshot::channel::<Result<(), SpawnError>>();
    let (done_tx, done_rx) = watch::channel(false);
    let guard = DoneGuard::detached(done_tx);

    let wrapped = {
        let derived = derived.clone();
        async move {
            let _guard = guard;
            let started = match derived.execute_callbacks() {
                Ok(()) => S::init(input).await.map_err(SpawnError::Init),
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

    tokio::spawn(ambient::scope(derived.clone(), wrapped));

    match init_rx.await {
        Ok(Ok(())) => {
            tracing::debug!(supervisor = %derived.display_name(), "supervisor started");
            Ok(SupervisorHandle::new(done_rx))
        }
        Ok(Err(error)) => Err(error),
        Err(_) => Err(SpawnError::InitInterrupted),
    }
}
