//! Session config blueprint
//!
//! [`Config`] carries a unit's identity path, an open-ended context map, and
//! the deferred callback list across spawn boundaries. Configs are immutable
//! values: every "mutation" clones into a new config, so concurrent holders
//! never observe each other's changes and no synchronization is needed.

use std::collections::HashMap;

use serde_json::Value;

use crate::callback::Callback;
use crate::error::{CallbackError, ContextError};
use crate::path::{IdentityPath, PathKey};

/// Keys that resolve to struct fields and reject generic puts
pub const PROTECTED_KEYS: [&str; 3] = ["owner", "path", "callbacks"];

/// Owner sentinel of the process-wide fallback config
pub const DEFAULT_OWNER: &str = "global";

const SESSION_SEPARATOR: char = ':';
const MAX_OWNER_LEN: usize = 200;

/// Structured session identity, typically a test module plus test name.
///
/// Collapsed into a single owner key by [`SessionDescriptor::owner`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionDescriptor {
    /// Module or suite the session belongs to
    pub module: String,
    /// Session name within the module
    pub name: String,
}

impl SessionDescriptor {
    /// Create a descriptor from module and session name
    #[inline]
    #[must_use]
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Derive the owner key: fields joined with `:`, truncated to the last
    /// 200 chars (the suffix carries the test name, the prefix is droppable
    /// module qualification).
    #[must_use]
    pub fn owner(&self) -> PathKey {
        let joined = format!("{}{}{}", self.module, SESSION_SEPARATOR, self.name);
        let length = joined.chars().count();
        if length <= MAX_OWNER_LEN {
            return PathKey::Name(joined);
        }
        PathKey::Name(joined.chars().skip(length - MAX_OWNER_LEN).collect())
    }
}

/// Value returned by [`Config::get`].
///
/// Protected keys resolve to struct fields; everything else comes out of the
/// context map.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// The `owner` field
    Owner(PathKey),
    /// The `path` field
    Path(IdentityPath),
    /// The `callbacks` field
    Callbacks(Vec<Callback>),
    /// A context-map entry
    Context(Value),
}

impl ConfigValue {
    /// Context-map entry, if that is what was read
    #[inline]
    #[must_use]
    pub fn as_context(&self) -> Option<&Value> {
        match self {
            Self::Context(value) => Some(value),
            _ => None,
        }
    }

    /// Consume into a context-map entry
    #[inline]
    #[must_use]
    pub fn into_context(self) -> Option<Value> {
        match self {
            Self::Context(value) => Some(value),
            _ => None,
        }
    }
}

/// Blueprint for ambient test configuration.
///
/// Created once per logical session, threaded by hand through
/// [`Envelope`](crate::Envelope)s to each spawned unit, and derived per spawn
/// via [`Config::derive_child`]. The owner is segment 0 of the path and is
/// not stored separately, so the two can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    path: IdentityPath,
    context: HashMap<String, Value>,
    callbacks: Vec<Callback>,
}

impl Config {
    /// Root config for an owner, with empty context and callbacks
    #[must_use]
    pub fn new(owner: impl Into<PathKey>) -> Self {
        Self {
            path: IdentityPath::root(owner),
            context: HashMap::new(),
            callbacks: Vec::new(),
        }
    }

    /// Root config for a structured session descriptor
    #[inline]
    #[must_use]
    pub fn for_session(session: &SessionDescriptor) -> Self {
        Self::new(session.owner())
    }

    /// Process-wide fallback config.
    ///
    /// Pure function of the `"global"` sentinel: no mutable global state.
    /// Returned by the ambient store whenever a unit never stored anything.
    #[must_use]
    pub fn defaults() -> Self {
        Self::new(DEFAULT_OWNER)
    }

    /// Seed a context entry at construction time.
    ///
    /// Unlike [`Config::put`] this does not run the callback list; it exists
    /// for building the root config before any unit is spawned.
    #[must_use]
    pub fn with_seeded(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Register a callback at construction time
    #[must_use]
    pub fn with_callback(mut self, callback: Callback) -> Self {
        self.callbacks.push(callback);
        self
    }

    /// The owner key (path segment 0)
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &PathKey {
        self.path.owner()
    }

    /// The identity path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &IdentityPath {
        &self.path
    }

    /// Registered callbacks, in registration order
    #[inline]
    #[must_use]
    pub fn callbacks(&self) -> &[Callback] {
        &self.callbacks
    }

    /// The context map
    #[inline]
    #[must_use]
    pub fn context(&self) -> &HashMap<String, Value> {
        &self.context
    }

    /// Root of the identity path; same as [`Config::owner`]
    #[inline]
    #[must_use]
    pub fn root(&self) -> &PathKey {
        self.path.owner()
    }

    /// Whether a key is protected from generic puts
    #[inline]
    #[must_use]
    pub fn is_protected(key: &str) -> bool {
        PROTECTED_KEYS.contains(&key)
    }

    /// Read a key.
    ///
    /// Protected keys return the corresponding struct field; anything else is
    /// looked up in the context map.
    ///
    /// # Errors
    /// [`ContextError::KeyNotFound`] on a context miss.
    pub fn get(&self, key: &str) -> Result<ConfigValue, ContextError> {
        match key {
            "owner" => Ok(ConfigValue::Owner(self.owner().clone())),
            "path" => Ok(ConfigValue::Path(self.path.clone())),
            "callbacks" => Ok(ConfigValue::Callbacks(self.callbacks.clone())),
            _ => self
                .context
                .get(key)
                .cloned()
                .map(ConfigValue::Context)
                .ok_or_else(|| ContextError::KeyNotFound(key.to_string())),
        }
    }

    /// Set a context entry, returning the new config.
    ///
    /// Runs the callback list against the new config before returning it, so
    /// collaborators keyed off context values observe the update immediately.
    /// On a callback fault no new config is produced; `self` stays valid.
    ///
    /// # Errors
    /// [`ContextError::ProtectedKey`] for owner/path/callbacks;
    /// [`ContextError::Callback`] if the re-run callback list faults.
    pub fn put(&self, key: impl Into<String>, value: Value) -> Result<Self, ContextError> {
        let key = key.into();
        if Self::is_protected(&key) {
            return Err(ContextError::ProtectedKey(key));
        }
        let mut next = self.clone();
        next.context.insert(key, value);
        next.execute_callbacks()?;
        Ok(next)
    }

    /// Append a callback, returning the new config
    #[must_use]
    pub fn add_callback(&self, callback: Callback) -> Self {
        let mut next = self.clone();
        next.callbacks.push(callback);
        next
    }

    /// Execute every callback against this config, in registration order,
    /// synchronously, ignoring return values.
    ///
    /// # Errors
    /// The first fault propagates unchanged; later callbacks do not run.
    pub fn execute_callbacks(&self) -> Result<(), CallbackError> {
        for callback in &self.callbacks {
            callback.invoke(self)?;
        }
        Ok(())
    }

    /// Derive the config a child unit runs under.
    ///
    /// Extends the path by the child's key; context and callbacks carry over
    /// by value. Deriving with a key equal to the current last path segment
    /// returns the config unchanged, so a unit whose init runs twice with the
    /// same parent config does not double-extend.
    #[must_use]
    pub fn derive_child(&self, key: impl Into<PathKey>) -> Self {
        let key = key.into();
        if *self.path.last() == key {
            return self.clone();
        }
        let mut next = self.clone();
        next.path = self.path.child(key);
        next
    }

    /// Path rendered for humans: segments joined with `/`
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_path_is_owner() {
        let config = Config::new("t1");
        assert_eq!(config.owner(), &PathKey::name("t1"));
        assert_eq!(config.path().segments(), &[PathKey::name("t1")]);
        assert!(config.context().is_empty());
        assert!(config.callbacks().is_empty());
    }

    #[test]
    fn defaults_owner_is_global_sentinel() {
        let defaults = Config::defaults();
        assert_eq!(defaults.owner(), &PathKey::name(DEFAULT_OWNER));
        assert_eq!(defaults, Config::defaults());
    }

    #[test]
    fn put_rejects_protected_keys() {
        let config = Config::new("t1");
        for key in PROTECTED_KEYS {
            let err = config.put(key, Value::Bool(true)).unwrap_err();
            assert_eq!(err, ContextError::ProtectedKey(key.to_string()));
        }
        // original untouched
        assert!(config.context().is_empty());
    }

    #[test]
    fn get_resolves_protected_keys_to_fields() {
        let config = Config::new("t1").with_seeded("db_pool", Value::from("pool_a"));
        assert_eq!(
            config.get("owner").unwrap(),
            ConfigValue::Owner(PathKey::name("t1"))
        );
        assert!(matches!(config.get("path").unwrap(), ConfigValue::Path(_)));
        assert_eq!(
            config.get("db_pool").unwrap().into_context(),
            Some(Value::from("pool_a"))
        );
        assert_eq!(
            config.get("missing").unwrap_err(),
            ContextError::KeyNotFound("missing".to_string())
        );
    }

    #[test]
    fn derive_child_extends_and_is_idempotent() {
        let root = Config::new("t1");
        let child = root.derive_child("Worker");
        assert_eq!(
            child.path().segments(),
            &[PathKey::name("t1"), PathKey::name("Worker")]
        );
        assert_eq!(child.derive_child("Worker"), child);
        assert_eq!(child.root(), &PathKey::name("t1"));
    }

    #[test]
    fn session_owner_truncates_to_suffix() {
        let session = SessionDescriptor::new("m".repeat(250), "keeps_the_name");
        let PathKey::Name(owner) = session.owner() else {
            panic!("session owner is a plain key");
        };
        assert_eq!(owner.chars().count(), 200);
        assert!(owner.ends_with("keeps_the_name"));

        let short = SessionDescriptor::new("my_app::worker_test", "spawns children");
        assert_eq!(
            short.owner(),
            PathKey::name("my_app::worker_test:spawns children")
        );
    }

    #[test]
    fn display_name_joins_path() {
        let config = Config::new("t1")
            .derive_child("Worker")
            .derive_child(("Worker", "inst1"));
        assert_eq!(config.display_name(), "t1/Worker/Worker:inst1");
    }
}
