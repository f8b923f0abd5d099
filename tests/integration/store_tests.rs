//! Integration tests for the archive and DuckDB baseline stores

use crate::common::sample_data::{self, record, snapshot};
use crate::common::TestFixture;
use scout::archive::ArchiveManager;
use scout::config::StoreKind;
use scout::hash::HashComputer;
use scout::store::{ArchiveStore, BaselineStore, DuckDbStore};
use scout::sync::SnapshotStore;
use scout::ScoutError;
use uuid::Uuid;

const KEY: &str = "data.example.org";

fn stores(fixture: &TestFixture) -> Vec<(&'static str, BaselineStore)> {
    vec![
        ("archive", BaselineStore::open(StoreKind::Archive, &fixture.workspace)),
        ("duckdb", BaselineStore::open(StoreKind::DuckDb, &fixture.workspace)),
    ]
}

#[test]
fn test_missing_baseline_is_not_found() {
    let fixture = TestFixture::new().unwrap();

    for (name, store) in stores(&fixture) {
        let err = store.load(KEY).unwrap_err();
        assert!(err.is_not_found(), "{} store gave {:?}", name, err);
        assert!(store.try_metadata(KEY).unwrap().is_none());
    }
}

#[test]
fn test_baseline_round_trip_preserves_records() {
    let fixture = TestFixture::new().unwrap();
    let catalog = sample_data::catalog();

    for (name, store) in stores(&fixture) {
        store.save(KEY, &catalog, None).unwrap();
        let loaded = store.load(KEY).unwrap();
        assert_eq!(loaded, catalog, "{} store changed the snapshot", name);
    }
}

#[test]
fn test_save_replaces_previous_baseline() {
    let fixture = TestFixture::new().unwrap();
    let second = snapshot(vec![record("only-one1", "Only One", 9)]);

    for (name, store) in stores(&fixture) {
        store.save(KEY, &sample_data::catalog(), None).unwrap();
        store.save(KEY, &second, None).unwrap();
        assert_eq!(store.load(KEY).unwrap(), second, "{} store kept stale records", name);
    }
}

#[test]
fn test_metadata_describes_saved_baseline() {
    let fixture = TestFixture::new().unwrap();
    let catalog = sample_data::catalog();
    let cycle_id = Uuid::new_v4();

    for (name, store) in stores(&fixture) {
        store.save(KEY, &catalog, Some(cycle_id)).unwrap();
        let metadata = store.metadata(KEY).unwrap();

        assert_eq!(metadata.target, KEY, "{}", name);
        assert_eq!(metadata.record_count, 3);
        assert_eq!(metadata.total_rows, catalog.total_rows());
        assert_eq!(metadata.fingerprint, HashComputer::hash_snapshot(&catalog));
        assert_eq!(metadata.cycle_id, Some(cycle_id));
    }
}

#[test]
fn test_targets_do_not_share_baselines() {
    let fixture = TestFixture::new().unwrap();
    let other = snapshot(vec![record("x", "X", 1)]);

    for (_, store) in stores(&fixture) {
        store.save(KEY, &sample_data::catalog(), None).unwrap();
        store.save("data.other.org", &other, None).unwrap();

        assert_eq!(store.load(KEY).unwrap(), sample_data::catalog());
        assert_eq!(store.load("data.other.org").unwrap(), other);
    }
}

#[test]
fn test_archive_layout_on_disk() {
    let fixture = TestFixture::new().unwrap();
    let store = ArchiveStore::new(fixture.workspace.clone());
    store.save(KEY, &sample_data::catalog(), None).unwrap();

    let path = fixture.workspace.archive_path(KEY);
    assert!(path.exists());
    assert!(!path.with_file_name("data.example.org.scout.tmp").exists());
    assert!(ArchiveManager::extract_file(&path, "metadata.json").unwrap().is_some());
    assert!(ArchiveManager::extract_file(&path, "records.json").unwrap().is_some());

    let stats = store.archive_stats(KEY).unwrap();
    assert_eq!(stats.file_count, 2);
}

#[test]
fn test_corrupt_archive_is_an_error_not_a_missing_baseline() {
    let fixture = TestFixture::new().unwrap();
    std::fs::write(fixture.workspace.archive_path(KEY), b"not a zstd stream").unwrap();

    let store = ArchiveStore::new(fixture.workspace.clone());
    let err = store.load(KEY).unwrap_err();
    assert!(!err.is_not_found());
}

#[test]
fn test_duckdb_file_without_table_is_not_found() {
    let fixture = TestFixture::new().unwrap();
    let path = fixture.workspace.duckdb_path(KEY);
    duckdb::Connection::open(&path).unwrap();

    let store = DuckDbStore::new(fixture.workspace.clone());
    assert!(matches!(store.load(KEY), Err(ScoutError::NotFound { .. })));
}

#[test]
fn test_empty_snapshot_round_trip() {
    let fixture = TestFixture::new().unwrap();

    for (name, store) in stores(&fixture) {
        store.save(KEY, &scout::Snapshot::empty(), None).unwrap();
        assert!(store.load(KEY).unwrap().is_empty(), "{}", name);
    }
}
