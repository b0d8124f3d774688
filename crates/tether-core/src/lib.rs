//! Tether Core
//!
//! Blueprint values for propagating ambient test configuration across
//! process-spawn boundaries:
//!
//! - [`Config`]: owner, identity path, context map, and deferred callbacks
//! - [`IdentityPath`] / [`PathKey`]: a unit's position in the spawn tree
//! - [`Envelope<T>`]: config plus opaque input, passed once across a spawn
//! - [`ambient`]: per-unit slot holding "the current config"
//!
//! Configs are immutable; every mutation produces a new value, which makes
//! sharing one across concurrent units safe without synchronization. The
//! explicit API lives on [`Config`]; [`ambient`] is the convenience tier the
//! spawn adapters wire up at unit boundaries.
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_core::{ambient, Config, Envelope};
//!
//! let root = Config::new("my_test");
//! let child = root.derive_child("Worker");
//! assert_eq!(child.display_name(), "my_test/Worker");
//!
//! let envelope = Envelope::new(child, WorkerInput::default());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod ambient;
mod callback;
mod config;
mod envelope;
mod error;
mod path;

// Re-exports
pub use callback::{Callback, CallbackTarget};
pub use config::{
    Config, ConfigValue, SessionDescriptor, DEFAULT_OWNER, PROTECTED_KEYS,
};
pub use envelope::Envelope;
pub use error::{CallbackError, ContextError};
pub use path::{IdentityPath, PathKey};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with tether configs
    pub use crate::{ambient, Callback, Config, Envelope, IdentityPath, PathKey};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
