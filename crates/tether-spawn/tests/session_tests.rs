//! Whole-session flows: config + integrations + spawn + tasks together
//!
//! Provider slots are process-wide; tests here take the file-level lock.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use tether_core::{ambient, Config, Envelope, SessionDescriptor};
use tether_integrations::{clear_pubsub_provider, clear_sandbox_provider, pubsub, sandbox};
use tether_spawn::{run_async, start_unit, ProcessUnit};
use tether_test_utils::{install_in_memory_pubsub, install_recording_sandbox};

static GUARD: Mutex<()> = Mutex::new(());

struct Reporter;

#[async_trait]
impl ProcessUnit for Reporter {
    type Input = mpsc::UnboundedSender<Config>;

    fn unit_kind() -> &'static str {
        "Reporter"
    }

    async fn init(input: Self::Input) -> anyhow::Result<Self> {
        input.send(ambient::current())?;
        Ok(Self)
    }

    async fn run(self) {}
}

#[tokio::test]
async fn a_full_session_authorizes_every_spawned_unit() {
    let _guard = GUARD.lock();
    let sandbox_log = install_recording_sandbox();
    let pubsub_log = install_in_memory_pubsub();

    let session = SessionDescriptor::new("session_tests", "full_session");
    let root = Config::for_session(&session)
        .with_callback(sandbox::allowance("test_repo", "session_tests").unwrap());
    let root = pubsub::setup(&root, Some("session_bus")).unwrap();

    // setup itself replayed the callback list once (the pubsub_name put)
    assert_eq!(sandbox_log.calls().len(), 1);
    assert_eq!(pubsub_log.instances(), vec!["session_bus"]);

    // a spawned unit is authorized under its derived identity
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = start_unit::<Reporter>(Envelope::new(root.clone(), tx))
        .await
        .unwrap();
    let seen = rx.recv().await.unwrap();
    assert_eq!(
        seen.display_name(),
        "session_tests:full_session/Reporter"
    );
    assert_eq!(
        seen.get(pubsub::PUBSUB_NAME_KEY).unwrap().into_context(),
        Some(serde_json::json!("session_bus"))
    );

    let calls = sandbox_log.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].unit, "session_tests:full_session/Reporter");

    // a task spawned from the session carries the same config
    let task_config = ambient::scope(root, async { run_async(|| async { ambient::current() }) })
        .await
        .join()
        .await
        .unwrap();
    assert_eq!(
        task_config.get(pubsub::PUBSUB_NAME_KEY).unwrap().into_context(),
        Some(serde_json::json!("session_bus"))
    );
    // the task replayed the sandbox callback for itself
    assert_eq!(sandbox_log.calls().len(), 3);

    handle.terminate().await.unwrap();
    clear_sandbox_provider();
    clear_pubsub_provider();
}

#[tokio::test]
async fn missing_collaborators_fail_before_anything_spawns() {
    let _guard = GUARD.lock();
    clear_sandbox_provider();
    clear_pubsub_provider();

    let root = Config::new("t_missing");
    assert!(sandbox::allowance("test_repo", "t_missing").is_err());
    assert!(pubsub::setup(&root, None).is_err());
}
