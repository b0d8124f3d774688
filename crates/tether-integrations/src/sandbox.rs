//! Database-sandbox authorization callback
//!
//! Produces the callback a session config carries so every unit deriving a
//! child config gets authorized against the ancestor's sandboxed
//! transaction the moment it stores its config.

use tether_core::{Callback, CallbackError};

use crate::error::IntegrationError;
use crate::providers;

/// Label the sandbox callback registers and faults under
pub const SANDBOX_CALLBACK: &str = "sandbox.allow";

/// Build the sandbox-authorization callback for a repo and ancestor.
///
/// Fails fast: the provider must already be installed when the allowance is
/// requested, not when the first unit spawns.
///
/// # Errors
/// [`IntegrationError::MissingDependency`] when no sandbox provider is
/// installed.
pub fn allowance(
    repo: impl Into<String>,
    ancestor: impl Into<String>,
) -> Result<Callback, IntegrationError> {
    if providers::sandbox_provider().is_none() {
        return Err(IntegrationError::MissingDependency {
            integration: "sandbox",
            hint: "install a SandboxProvider before requesting sandbox allowances",
        });
    }

    let repo = repo.into();
    let ancestor = ancestor.into();
    let args = serde_json::json!({ "repo": repo, "ancestor": ancestor });

    Ok(Callback::with_args(
        SANDBOX_CALLBACK,
        move |config, _args| {
            let provider = providers::sandbox_provider().ok_or_else(|| {
                CallbackError::new(SANDBOX_CALLBACK, "sandbox provider was removed after setup")
            })?;
            provider
                .allow(config, &repo, &ancestor)
                .map_err(|error| CallbackError::new(SANDBOX_CALLBACK, error.to_string()))
        },
        args,
    ))
}
