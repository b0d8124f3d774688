//! Error types for integrations

use tether_core::ContextError;

/// Failures raised by integration setup.
///
/// Missing collaborators are detected eagerly at setup call time, before any
/// unit spawns, so misconfiguration surfaces as one descriptive error rather
/// than an obscure crash later.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// The integration's backing library/service is not installed
    #[error("optional dependency for {integration} is not installed: {hint}")]
    MissingDependency {
        /// Which integration was being set up
        integration: &'static str,
        /// What to install or call first
        hint: &'static str,
    },

    /// The provider accepted the call but failed to complete it
    #[error("{integration} setup failed: {message}")]
    SetupFailed {
        /// Which integration failed
        integration: &'static str,
        /// Provider-reported reason
        message: String,
    },

    /// Writing integration output into the config failed
    #[error(transparent)]
    Context(#[from] ContextError),
}
