//! Provider seams for external collaborators
//!
//! The core never talks to a database sandbox or a message broker directly;
//! it only requires an installed provider implementing one of these traits.
//! Installation is process-wide and checked eagerly by the setup functions,
//! so "not installed" is a detectable, distinct failure.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use tether_core::Config;

use crate::error::IntegrationError;

static SANDBOX: Lazy<RwLock<Option<Arc<dyn SandboxProvider>>>> = Lazy::new(|| RwLock::new(None));
static PUBSUB: Lazy<RwLock<Option<Arc<dyn PubSubProvider>>>> = Lazy::new(|| RwLock::new(None));

/// Database-sandbox authorizer.
///
/// Grants a spawned unit access to the transaction owned by its ancestor.
pub trait SandboxProvider: Send + Sync {
    /// Authorize the unit described by `config` against the named repo,
    /// on behalf of the ancestor that owns the sandbox.
    ///
    /// # Errors
    /// Provider-specific refusal, reported as is.
    fn allow(&self, config: &Config, repo: &str, ancestor: &str) -> Result<(), IntegrationError>;
}

/// Pub/sub bootstrap.
///
/// Starts one isolated broker instance per session so concurrent sessions
/// never share topics.
pub trait PubSubProvider: Send + Sync {
    /// Start (or attach to) the named broker instance.
    ///
    /// # Errors
    /// Provider-specific startup failure, reported as is.
    fn start_instance(&self, name: &str) -> Result<(), IntegrationError>;
}

/// Install the process-wide sandbox provider
pub fn install_sandbox_provider(provider: Arc<dyn SandboxProvider>) {
    *SANDBOX.write() = Some(provider);
}

/// Remove the sandbox provider (test teardown)
pub fn clear_sandbox_provider() {
    *SANDBOX.write() = None;
}

/// Install the process-wide pub/sub provider
pub fn install_pubsub_provider(provider: Arc<dyn PubSubProvider>) {
    *PUBSUB.write() = Some(provider);
}

/// Remove the pub/sub provider (test teardown)
pub fn clear_pubsub_provider() {
    *PUBSUB.write() = None;
}

pub(crate) fn sandbox_provider() -> Option<Arc<dyn SandboxProvider>> {
    SANDBOX.read().clone()
}

pub(crate) fn pubsub_provider() -> Option<Arc<dyn PubSubProvider>> {
    PUBSUB.read().clone()
}
