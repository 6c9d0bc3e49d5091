//! End-to-end registry lifecycle tests against file-backed snapshots.
//!
//! Simulates process restarts by constructing a fresh service over the
//! same snapshot file and reconciling.

use serde_json::json;
use std::sync::Arc;
use tiller::host::{FileConfigStore, InMemoryEventBus, InMemoryHandlerRegistry};
use tiller::reconcile::Reconciler;
use tiller::service::{RegisterOutcome, RegistrationService};

struct TestHost {
    service: Arc<RegistrationService>,
    handlers: Arc<InMemoryHandlerRegistry>,
    bus: Arc<InMemoryEventBus>,
    config: Arc<FileConfigStore>,
}

/// Build a fresh service over the given snapshot file and reconcile,
/// the way a process start does.
fn start_host(snapshot_path: &std::path::Path) -> TestHost {
    let handlers = Arc::new(InMemoryHandlerRegistry::new());
    let bus = Arc::new(InMemoryEventBus::new());
    let config = Arc::new(FileConfigStore::new(snapshot_path));
    let service = Arc::new(RegistrationService::new(
        handlers.clone(),
        bus.clone(),
        config.clone(),
    ));

    use tiller::host::ConfigStore;
    let snapshot = config.load().unwrap();
    Reconciler::new(service.clone()).run(snapshot).unwrap();

    TestHost {
        service,
        handlers,
        bus,
        config,
    }
}

#[test]
fn test_registrations_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    let first = start_host(&path);
    first.service.register("capture").unwrap();
    first.service.register("anchor").unwrap();
    first.service.shutdown();

    let second = start_host(&path);
    let mut addresses: Vec<String> = second
        .service
        .list()
        .into_iter()
        .map(|r| r.address)
        .collect();
    addresses.sort();
    assert_eq!(addresses, vec!["commands.anchor", "commands.capture"]);

    // Restored commands get handlers installed and initial false values.
    assert_eq!(second.handlers.installed_paths().len(), 2);
    for (_, value) in second.bus.published_values() {
        assert_eq!(value, json!(false));
    }
}

#[test]
fn test_unregistered_command_is_not_restored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    let first = start_host(&path);
    first.service.register("capture").unwrap();
    first.service.register("anchor").unwrap();
    first.service.unregister("capture").unwrap();

    let second = start_host(&path);
    let entries = second.service.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].address, "commands.anchor");
    assert_eq!(second.handlers.installed_paths(), vec!["commands.anchor"]);
}

#[test]
fn test_externally_edited_snapshot_prunes_on_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    let first = start_host(&path);
    first.service.register("a").unwrap();
    first.service.register("b").unwrap();

    // Administrator edits the snapshot by hand, dropping "a".
    std::fs::write(
        &path,
        r#"{"registeredCommands":[{"command":"b"}]}"#,
    )
    .unwrap();

    let second = start_host(&path);
    let entries = second.service.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].address, "commands.b");
}

#[test]
fn test_pending_command_in_snapshot_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    std::fs::write(&path, r#"{"newCommand":"weather"}"#).unwrap();

    let host = start_host(&path);
    assert_eq!(host.service.list()[0].address, "commands.weather");

    // Snapshot on disk was rewritten: pending name consumed, command kept.
    let rewritten = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&rewritten).unwrap();
    assert!(parsed.get("newCommand").is_none());
    assert_eq!(parsed["registeredCommands"][0]["command"], "weather");

    // A second start must not double-register it.
    let again = start_host(&path);
    assert_eq!(again.service.list().len(), 1);
}

#[test]
fn test_put_write_round_trips_through_handler() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    let host = start_host(&path);
    host.service.register("capture").unwrap();

    let response = host
        .handlers
        .invoke("commands.capture", json!(true))
        .unwrap();
    assert_eq!(response.status_code, 200);

    let published = host.bus.published_values();
    let last = published.last().unwrap();
    assert_eq!(last.0, "commands.capture");
    assert_eq!(last.1, json!(true));
}

#[test]
fn test_register_after_restart_is_idempotent_across_lifetimes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");

    let first = start_host(&path);
    first.service.register("capture").unwrap();

    let second = start_host(&path);
    let outcome = second.service.register("capture").unwrap();
    assert!(matches!(outcome, RegisterOutcome::AlreadyRegistered { .. }));
    assert_eq!(second.service.list().len(), 1);

    // Snapshot still lists exactly one entry.
    use tiller::host::ConfigStore;
    let snapshot = second.config.load().unwrap().unwrap();
    assert_eq!(snapshot.registered_commands.len(), 1);
}
