//! Tether Integrations
//!
//! Glue for the optional collaborators a test session may carry:
//!
//! - [`sandbox`]: database-sandbox authorization, delivered as a config
//!   callback so every spawned unit is authorized when it stores its config
//! - [`pubsub`]: per-session isolated broker bootstrap, recorded under the
//!   `pubsub_name` context key
//!
//! Collaborators stay opaque behind [`SandboxProvider`] and
//! [`PubSubProvider`]; a missing provider is a
//! [`IntegrationError::MissingDependency`] raised at setup call time, never
//! a deferred crash inside a spawned unit.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod providers;
pub mod pubsub;
pub mod sandbox;

// Re-exports
pub use error::IntegrationError;
pub use providers::{
    clear_pubsub_provider, clear_sandbox_provider, install_pubsub_provider,
    install_sandbox_provider, PubSubProvider, SandboxProvider,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
