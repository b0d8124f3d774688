//! Config algebra tests
//!
//! Session-level scenarios plus property tests for the path-extension rules.

use proptest::prelude::*;
use std::sync::{Arc, Mutex};

use tether_core::{ambient, Callback, Config, ContextError, PathKey};

fn recording_callback(label: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Callback {
    let log = Arc::clone(log);
    Callback::new(label, move |config| {
        log.lock().unwrap().push(format!("{label}@{}", config.display_name()));
        Ok(())
    })
}

#[test]
fn session_with_two_spawns() {
    let root = Config::new("t1");
    let child = root.derive_child("Worker");
    assert_eq!(
        child.path().segments(),
        &[PathKey::name("t1"), PathKey::name("Worker")]
    );

    let grandchild = child.derive_child(("Worker", "inst1"));
    assert_eq!(
        grandchild.path().segments(),
        &[
            PathKey::name("t1"),
            PathKey::name("Worker"),
            PathKey::instance("Worker", "inst1"),
        ]
    );
    assert_eq!(grandchild.root(), &PathKey::name("t1"));
}

#[test]
fn callbacks_run_in_registration_order_exactly_once() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let config = Config::new("t1")
        .with_callback(recording_callback("A", &log))
        .with_callback(recording_callback("B", &log));

    config.execute_callbacks().unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["A@t1", "B@t1"]);
}

#[test]
fn a_faulting_callback_stops_the_list() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let config = Config::new("t1")
        .with_callback(recording_callback("A", &log))
        .with_callback(Callback::new("boom", |_| {
            Err(tether_core::CallbackError::new("boom", "fault"))
        }))
        .with_callback(recording_callback("C", &log));

    let err = config.execute_callbacks().unwrap_err();
    assert_eq!(err.label(), "boom");
    // A ran, C never did
    assert_eq!(*log.lock().unwrap(), vec!["A@t1"]);
}

#[test]
fn put_runs_callbacks_against_the_new_config() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&log);
    let config = Config::new("t1").with_callback(Callback::new("observe", move |config| {
        let value = config
            .get("db_pool")
            .map(|v| v.into_context().unwrap_or_default())
            .unwrap_or_default();
        seen.lock().unwrap().push(value.to_string());
        Ok(())
    }));

    let updated = config.put("db_pool", serde_json::json!("pool_a")).unwrap();

    // the callback observed the freshly-written value, not the old config
    assert_eq!(*log.lock().unwrap(), vec!["\"pool_a\""]);
    assert_eq!(
        updated.get("db_pool").unwrap().into_context(),
        Some(serde_json::json!("pool_a"))
    );
}

#[test]
fn failed_put_leaves_no_new_config() {
    let config = Config::new("t1").with_callback(Callback::new("boom", |_| {
        Err(tether_core::CallbackError::new("boom", "fault"))
    }));

    let err = config.put("db_pool", serde_json::json!(1)).unwrap_err();
    assert!(matches!(err, ContextError::Callback(_)));
    // the old value stays valid and unchanged
    assert!(config.context().is_empty());
}

#[tokio::test]
async fn derived_config_carries_callbacks_into_ambient_tier() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let root = Config::new("t1").with_callback(recording_callback("A", &log));

    ambient::scope(root.derive_child("Worker"), async {
        ambient::current().execute_callbacks().unwrap();
    })
    .await;

    assert_eq!(*log.lock().unwrap(), vec!["A@t1/Worker"]);
}

proptest! {
    #[test]
    fn derive_child_is_idempotent(owner in "[a-z][a-z0-9_]{0,12}", key in "[A-Z][A-Za-z0-9]{0,12}") {
        let config = Config::new(owner.as_str());
        let once = config.derive_child(key.as_str());
        let twice = once.derive_child(key.as_str());
        prop_assert_eq!(&once, &twice);
    }

    #[test]
    fn derive_child_chains(
        owner in "[a-z][a-z0-9_]{0,12}",
        k1 in "[A-Z][A-Za-z0-9]{0,12}",
        k2 in "[A-Z][A-Za-z0-9]{0,12}",
    ) {
        prop_assume!(k1 != k2 && k1 != owner);
        let config = Config::new(owner.as_str());
        let chained = config.derive_child(k1.as_str()).derive_child(k2.as_str());

        let mut expected: Vec<PathKey> = config.path().segments().to_vec();
        expected.push(PathKey::name(k1));
        expected.push(PathKey::name(k2));
        prop_assert_eq!(chained.path().segments(), expected.as_slice());
    }

    #[test]
    fn depth_never_shrinks(keys in proptest::collection::vec("[a-z]{1,6}", 0..16)) {
        let mut config = Config::new("root");
        let mut depth = config.path().depth();
        for key in keys {
            config = config.derive_child(key.as_str());
            let next = config.path().depth();
            prop_assert!(next == depth || next == depth + 1);
            depth = next;
        }
    }
}
