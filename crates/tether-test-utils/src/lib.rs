//! Testing utilities for the tether workspace
//!
//! Shared fixtures: recording callbacks, in-memory providers, and helpers
//! for driving spawned units in tests.

#![allow(missing_docs)]

use std::sync::Arc;

use parking_lot::Mutex;

use tether_core::{Callback, Config};
use tether_integrations::{
    install_pubsub_provider, install_sandbox_provider, IntegrationError, PubSubProvider,
    SandboxProvider,
};
use tether_spawn::{TerminateError, UnitHandle};

/// Initialize tracing for a test binary; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Root config for a test session.
pub fn session_config(owner: &str) -> Config {
    Config::new(owner)
}

/// Shared log that callbacks append `label@path` entries to.
#[derive(Debug, Clone, Default)]
pub struct CallbackLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback that records its label and the config it ran against.
    pub fn callback(&self, label: &'static str) -> Callback {
        let entries = Arc::clone(&self.entries);
        Callback::new(label, move |config| {
            entries
                .lock()
                .push(format!("{label}@{}", config.display_name()));
            Ok(())
        })
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// One recorded sandbox authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxCall {
    pub unit: String,
    pub repo: String,
    pub ancestor: String,
}

/// Sandbox provider that records every authorization it grants.
#[derive(Debug, Default)]
pub struct RecordingSandbox {
    calls: Mutex<Vec<SandboxCall>>,
}

impl RecordingSandbox {
    pub fn calls(&self) -> Vec<SandboxCall> {
        self.calls.lock().clone()
    }
}

impl SandboxProvider for RecordingSandbox {
    fn allow(&self, config: &Config, repo: &str, ancestor: &str) -> Result<(), IntegrationError> {
        self.calls.lock().push(SandboxCall {
            unit: config.display_name(),
            repo: repo.to_string(),
            ancestor: ancestor.to_string(),
        });
        Ok(())
    }
}

/// Pub/sub provider that records started instances instead of running a broker.
#[derive(Debug, Default)]
pub struct InMemoryPubSub {
    instances: Mutex<Vec<String>>,
}

impl InMemoryPubSub {
    pub fn instances(&self) -> Vec<String> {
        self.instances.lock().clone()
    }
}

impl PubSubProvider for InMemoryPubSub {
    fn start_instance(&self, name: &str) -> Result<(), IntegrationError> {
        self.instances.lock().push(name.to_string());
        Ok(())
    }
}

/// Install a recording sandbox provider and keep a handle to its log.
pub fn install_recording_sandbox() -> Arc<RecordingSandbox> {
    let provider = Arc::new(RecordingSandbox::default());
    install_sandbox_provider(provider.clone());
    provider
}

/// Install an in-memory pub/sub provider and keep a handle to its log.
pub fn install_in_memory_pubsub() -> Arc<InMemoryPubSub> {
    let provider = Arc::new(InMemoryPubSub::default());
    install_pubsub_provider(provider.clone());
    provider
}

/// Terminate a unit and surface how it went down.
pub async fn stop_unit(handle: Option<UnitHandle>) -> Result<(), TerminateError> {
    tether_spawn::terminate(handle).await
}
