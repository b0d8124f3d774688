//! Error types for tether-core
//!
//! Covers context-map access failures and callback faults. The core performs
//! no retries anywhere: every failure surfaces to the immediate caller, and a
//! failed operation never produces a new [`Config`](crate::Config).

/// Context-map access errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// Attempted to set owner/path/callbacks through the generic put path
    #[error("context key '{0}' is protected")]
    ProtectedKey(String),

    /// Lookup miss on a non-protected key
    #[error("context key '{0}' not found")]
    KeyNotFound(String),

    /// A callback faulted while a put was re-running the callback list
    #[error(transparent)]
    Callback(#[from] CallbackError),
}

/// Fault raised by a user or integration callback.
///
/// Never caught or retried by the core; it propagates to whatever invoked
/// init/spawn, which aborts that unit's startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("callback '{label}' failed: {message}")]
pub struct CallbackError {
    label: String,
    message: String,
}

impl CallbackError {
    /// Create a fault attributed to the named callback
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            message: message.into(),
        }
    }

    /// Label of the callback that faulted
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Fault description
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
