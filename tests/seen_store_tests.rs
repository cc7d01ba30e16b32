/// Seen-store persistence tests
///
/// The delta sweep only works across process restarts if seen records are
/// durable; these tests drive the engine over a `FileSeenStore` that is
/// dropped and reopened between runs.
/// Run with: cargo test --test seen_store_tests
use chrono::{DateTime, TimeZone, Utc};
use rostersync::{
    FileSeenStore, InMemoryDirectory, MemoryAuditSink, SeenStore, SyncConfig, SyncEngine,
};
use tempfile::TempDir;

fn person(key: &str) -> Vec<String> {
    let fields: [&str; 6] = [
        key,
        "Last",
        "First",
        &format!("{}@x.com", key),
        "pw",
        "staff",
    ];
    fields.iter().map(|v| v.to_string()).collect()
}

fn stamp(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, day, 3, 0, 0).unwrap()
}

#[test]
fn sweep_uses_records_persisted_by_an_earlier_process() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("seen.log");

    // First run in its own "process": bob and al exist.
    let mut directory = InMemoryDirectory::new();
    {
        let store = FileSeenStore::open(&log_path).unwrap();
        let mut engine = SyncEngine::new(
            SyncConfig::new(),
            directory,
            store,
            MemoryAuditSink::new(),
        )
        .unwrap();
        engine.run_at(vec![person("bob"), person("al")], stamp(1));
        let (d, _, _) = engine.into_parts();
        directory = d;
    }

    // Second run after a restart: only bob reappears.
    let store = FileSeenStore::open(&log_path).unwrap();
    assert_eq!(store.len(), 2);

    let mut engine =
        SyncEngine::new(SyncConfig::new(), directory, store, MemoryAuditSink::new()).unwrap();
    let counters = engine.run_at(vec![person("bob")], stamp(2));

    assert_eq!(counters.updates, 1);
    assert_eq!(counters.deletes, 1);
    assert_eq!(engine.directory().get_by_key("al").unwrap().person_type, "suspended");
    assert_eq!(engine.directory().get_by_key("bob").unwrap().person_type, "staff");
}

#[test]
fn reaffirmed_records_carry_the_new_stamp_in_the_log() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("seen.log");

    {
        let store = FileSeenStore::open(&log_path).unwrap();
        let mut engine = SyncEngine::new(
            SyncConfig::new(),
            InMemoryDirectory::new(),
            store,
            MemoryAuditSink::new(),
        )
        .unwrap();
        engine.run_at(vec![person("bob")], stamp(1));
        engine.run_at(vec![person("bob")], stamp(2));
    }

    let store = FileSeenStore::open(&log_path).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("bob").unwrap().stamp, stamp(2));
    assert!(store.find_stale(stamp(2), 0, 10).unwrap().is_empty());
}

#[test]
fn failed_rows_leave_the_log_untouched() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("seen.log");

    let store = FileSeenStore::open(&log_path).unwrap();
    let mut engine = SyncEngine::new(
        SyncConfig::new(),
        InMemoryDirectory::new(),
        store,
        MemoryAuditSink::new(),
    )
    .unwrap();

    let counters = engine.run_at(vec![vec!["short".to_string()]], stamp(1));
    assert_eq!(counters.errors, 1);
    assert!(engine.seen_store().is_empty());
}
