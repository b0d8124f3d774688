//! Deferred callbacks registered on a config
//!
//! A [`Callback`] is captured at setup time and executed once per unit that
//! derives a child config carrying it, in registration order, synchronously.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::error::CallbackError;

/// Invocable applied to `(config, args)` when a unit stores its config
pub type CallbackTarget =
    Arc<dyn Fn(&Config, Option<&Value>) -> Result<(), CallbackError> + Send + Sync>;

/// Deferred callback descriptor.
///
/// Collaborator state that is not plain data belongs in the closure itself;
/// `args` mirrors the `(target, args)` descriptor shape for data options and
/// shows up in logs and faults.
#[derive(Clone)]
pub struct Callback {
    label: String,
    target: CallbackTarget,
    args: Option<Value>,
}

impl Callback {
    /// Descriptor without args; the target sees only the config
    #[must_use]
    pub fn new<F>(label: impl Into<String>, target: F) -> Self
    where
        F: Fn(&Config) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            target: Arc::new(move |config, _| target(config)),
            args: None,
        }
    }

    /// Descriptor with caller-supplied args
    #[must_use]
    pub fn with_args<F>(label: impl Into<String>, target: F, args: Value) -> Self
    where
        F: Fn(&Config, Option<&Value>) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            target: Arc::new(target),
            args: Some(args),
        }
    }

    /// Label used in logs and faults
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Caller-supplied args, if any
    #[inline]
    #[must_use]
    pub fn args(&self) -> Option<&Value> {
        self.args.as_ref()
    }

    /// Apply the target to the config (and args, if any).
    ///
    /// # Errors
    /// Propagates the target's fault unchanged; the core never catches it.
    pub fn invoke(&self, config: &Config) -> Result<(), CallbackError> {
        tracing::trace!(callback = %self.label, config = %config.display_name(), "executing callback");
        (self.target)(config, self.args.as_ref())
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("label", &self.label)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && Arc::ptr_eq(&self.target, &other.target)
            && self.args == other.args
    }
}
