//! Tether Spawn
//!
//! Adapters that carry a session config across spawn boundaries:
//!
//! - [`ProcessUnit`] / [`start_unit`]: long-lived, individually addressable
//!   units registered in the global [`NamedLookup`]
//! - [`SupervisorUnit`] / [`start_supervisor`]: units that own children and
//!   skip registration
//! - [`run_async`] / [`map_async`]: the same propagation applied to
//!   fire-and-forget and parallel tasks
//!
//! Every adapter follows one contract: derive a child config from the
//! envelope, install it as the new unit's ambient config, execute the
//! config's callbacks, then hand control to user code. Failures during that
//! path are start failures, surfaced synchronously to the starter.
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_core::{Config, Envelope};
//! use tether_spawn::{start_unit, ProcessUnit};
//!
//! let root = Config::new("my_test");
//! let handle = start_unit::<Worker>(Envelope::new(root, WorkerInput::default())).await?;
//! assert!(handle.is_alive());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod handle;
mod process;
mod registry;
mod supervisor;
mod task;

// Re-exports
pub use error::SpawnError;
#[cfg(any(test, feature = "test-support"))]
pub use handle::terminate;
pub use handle::{SupervisorHandle, TerminateError, UnitHandle, UnitId};
#[cfg(any(test, feature = "test-support"))]
pub use process::terminate_unit;
pub use process::{
    get_handle, get_handle_for, is_alive, start_unit, via_key, via_key_ambient, via_key_current,
    via_key_envelope, ProcessUnit,
};
pub use registry::{NamedLookup, RegistryKey};
pub use supervisor::{start_supervisor, SupervisorUnit};
pub use task::{
    join_all, map_async, run_async, run_async_with, MapOptions, TaskError, TaskHandle,
    TimeoutPolicy, DEFAULT_JOIN_TIMEOUT,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with spawn adapters
    pub use crate::{
        run_async, start_supervisor, start_unit, MapOptions, NamedLookup, ProcessUnit,
        RegistryKey, SupervisorUnit, TaskHandle, UnitHandle,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
