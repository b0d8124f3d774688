//! Per-unit ambient storage for the current config
//!
//! Each concurrent unit owns one task-local slot holding "the current
//! config". Slots are never shared between units, so there are no locks:
//! isolation comes from `tokio::task_local!`, and config values themselves
//! are immutable.
//!
//! This module is the implicit tier of the API. The explicit tier lives on
//! [`Config`] itself; the spawn and task adapters install a scope around
//! every unit they start, so unit code can simply call [`current`].

use std::cell::RefCell;
use std::future::Future;

use serde_json::Value;

use crate::callback::Callback;
use crate::config::{Config, ConfigValue};
use crate::error::ContextError;

tokio::task_local! {
    static AMBIENT: RefCell<Config>;
}

/// Run a future with its own ambient slot initialized to `config`.
///
/// The spawn adapters call this for every unit they start; call it directly
/// only for the root unit of a session (e.g. a test body).
pub async fn scope<F>(config: Config, future: F) -> F::Output
where
    F: Future,
{
    AMBIENT.scope(RefCell::new(config), future).await
}

/// The current unit's config, or [`Config::defaults`] if this unit never
/// stored one (or has no ambient slot at all).
#[must_use]
pub fn current() -> Config {
    AMBIENT
        .try_with(|slot| slot.borrow().clone())
        .unwrap_or_else(|_| Config::defaults())
}

/// Replace the current unit's config, returning it for chaining.
///
/// Outside any [`scope`] there is no slot to write; the value is returned
/// but not retained.
pub fn store(config: Config) -> Config {
    let installed = AMBIENT
        .try_with(|slot| {
            *slot.borrow_mut() = config.clone();
        })
        .is_ok();
    if !installed {
        tracing::warn!(
            config = %config.display_name(),
            "ambient store outside a config scope; value not retained"
        );
    }
    config
}

/// Read a key from the current config.
///
/// # Errors
/// [`ContextError::KeyNotFound`] on a context miss.
pub fn get(key: &str) -> Result<ConfigValue, ContextError> {
    current().get(key)
}

/// Put a context entry on the current config and store the result.
///
/// # Errors
/// Same failure modes as [`Config::put`]; on failure nothing is stored.
pub fn put(key: impl Into<String>, value: Value) -> Result<Config, ContextError> {
    let next = current().put(key, value)?;
    Ok(store(next))
}

/// Append a callback to the current config and store the result
pub fn add_callback(callback: Callback) -> Config {
    store(current().add_callback(callback))
}
