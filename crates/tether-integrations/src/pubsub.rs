//! Pub/sub bootstrap
//!
//! Starts one isolated broker instance per session and records its name in
//! the session config, so units resolve their broker through the context
//! instead of a shared global.

use tether_core::Config;
use uuid::Uuid;

use crate::error::IntegrationError;
use crate::providers;

/// Context key the broker instance name is stored under
pub const PUBSUB_NAME_KEY: &str = "pubsub_name";

/// Start an isolated broker instance and store its name into the config.
///
/// Uses the caller-supplied name when given, otherwise generates one. The
/// write goes through [`Config::put`], so the config's callbacks observe the
/// new `pubsub_name` immediately.
///
/// # Errors
/// [`IntegrationError::MissingDependency`] when no pub/sub provider is
/// installed (checked before anything starts); provider startup failures and
/// callback faults from the context write propagate unchanged.
pub fn setup(config: &Config, name: Option<&str>) -> Result<Config, IntegrationError> {
    let provider =
        providers::pubsub_provider().ok_or(IntegrationError::MissingDependency {
            integration: "pubsub",
            hint: "install a PubSubProvider before pubsub setup",
        })?;

    let instance = name.map_or_else(
        || format!("tether-pubsub-{}", Uuid::new_v4()),
        str::to_owned,
    );
    provider.start_instance(&instance)?;
    tracing::debug!(instance = %instance, session = %config.display_name(), "pubsub instance started");

    let updated = config.put(PUBSUB_NAME_KEY, serde_json::Value::String(instance))?;
    Ok(updated)
}
