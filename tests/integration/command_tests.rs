//! Integration tests for scout commands

use crate::common::sample_data::{self, record, snapshot};
use crate::common::{assertions, CliTestRunner};
use scout::config::StoreKind;
use scout::store::BaselineStore;
use scout::sync::SnapshotStore;
use scout::{ScoutError, Snapshot};

const DOMAIN: &str = "data.example.org";

fn add_example_target(runner: &CliTestRunner) {
    runner.expect_success(&[
        "add-target",
        "--name",
        "Example Data",
        "--domain",
        DOMAIN,
        "--link",
        "https://data.example.org/browse",
    ]);
}

fn seed_baseline(runner: &CliTestRunner, snapshot: &Snapshot) {
    let workspace = &runner.fixture().workspace;
    let config = workspace.load_config().unwrap();
    BaselineStore::open(config.store, workspace)
        .save(DOMAIN, snapshot, None)
        .unwrap();
}

#[test]
fn test_init_creates_workspace() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);

    let workspace = &runner.fixture().workspace;
    assertions::assert_dir_exists(&workspace.scout_dir);
    assertions::assert_dir_exists(&workspace.snapshots_dir);
    assertions::assert_file_exists_and_not_empty(&workspace.config_path());
    assert_eq!(workspace.load_config().unwrap().store, StoreKind::Archive);
}

#[test]
fn test_init_keeps_config_unless_forced() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);
    add_example_target(&runner);

    runner.expect_success(&["init", "--store", "duckdb"]);
    let config = runner.fixture().workspace.load_config().unwrap();
    assert_eq!(config.targets.len(), 1);
    assert_eq!(config.store, StoreKind::Archive);

    runner.expect_success(&["init", "--force", "--store", "duckdb"]);
    let config = runner.fixture().workspace.load_config().unwrap();
    assert!(config.targets.is_empty());
    assert_eq!(config.store, StoreKind::DuckDb);
}

#[test]
fn test_init_rejects_unknown_store() {
    let runner = CliTestRunner::new().unwrap();
    let err = runner.expect_failure(&["init", "--store", "sqlite"]);
    assert!(matches!(err, ScoutError::InvalidInput { .. }));
}

#[test]
fn test_add_target_persists_and_rejects_duplicates() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);
    add_example_target(&runner);

    let config = runner.fixture().workspace.load_config().unwrap();
    assert_eq!(config.targets[0].domain, DOMAIN);
    assert!(config.targets[0].slack_url.is_none());

    let err = runner.expect_failure(&[
        "add-target",
        "--name",
        "Same Host",
        "--domain",
        DOMAIN,
        "--link",
        "https://data.example.org",
    ]);
    assert!(matches!(err, ScoutError::Config { .. }));
}

#[test]
fn test_add_target_rejects_url_as_domain() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);

    let err = runner.expect_failure(&[
        "add-target",
        "--name",
        "Bad",
        "--domain",
        "https://data.example.org/",
        "--link",
        "https://data.example.org",
    ]);
    assert!(matches!(err, ScoutError::Config { .. }));
}

#[test]
fn test_run_without_targets_fails() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);

    let err = runner.expect_failure(&["run"]);
    assert!(matches!(err, ScoutError::Config { .. }));
}

#[test]
fn test_run_unknown_target_fails() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);
    add_example_target(&runner);

    let err = runner.expect_failure(&["run", "--target", "data.nowhere.org"]);
    assert!(matches!(err, ScoutError::InvalidInput { .. }));
}

#[test]
fn test_diff_two_snapshot_files() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let old = fixture
        .create_snapshot_file("old.json", &snapshot(vec![record("a", "A", 10)]))
        .unwrap();
    let new = fixture
        .create_snapshot_file("new.json", &snapshot(vec![record("a", "A", 15), record("b", "B", 3)]))
        .unwrap();

    runner.expect_success(&[
        "diff",
        old.to_str().unwrap(),
        new.to_str().unwrap(),
        "--domain",
        DOMAIN,
        "--seed",
        "1",
    ]);
}

#[test]
fn test_diff_rejects_malformed_file() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let good = fixture.create_snapshot_file("good.json", &sample_data::catalog()).unwrap();
    let bad = fixture.create_raw("bad.json", r#"[{"id": "a"}]"#).unwrap();

    let err = runner.expect_failure(&["diff", good.to_str().unwrap(), bad.to_str().unwrap()]);
    assert!(matches!(err, ScoutError::InvalidSnapshot { .. }));
}

#[test]
fn test_diff_rejects_duplicate_ids() {
    let runner = CliTestRunner::new().unwrap();
    let fixture = runner.fixture();
    let good = fixture.create_snapshot_file("good.json", &sample_data::catalog()).unwrap();
    let record = serde_json::to_value(record("dup1-0000", "Dup", 1)).unwrap();
    let dup = fixture
        .create_raw("dup.json", &serde_json::to_string(&vec![record.clone(), record]).unwrap())
        .unwrap();

    let err = runner.expect_failure(&["diff", good.to_str().unwrap(), dup.to_str().unwrap()]);
    assert!(matches!(err, ScoutError::InvalidRecord { .. }));
}

#[test]
fn test_export_writes_baseline_json() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);
    add_example_target(&runner);
    seed_baseline(&runner, &sample_data::catalog());

    runner.expect_success(&["export", "Example Data", "--output", "exports/baseline.json"]);

    let path = runner.fixture().root().join("exports").join("baseline.json");
    assertions::assert_file_exists_and_not_empty(&path);
    assert_eq!(Snapshot::load_json_file(&path).unwrap(), sample_data::catalog());
}

#[test]
fn test_export_without_baseline_fails() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);
    add_example_target(&runner);

    let err = runner.expect_failure(&["export", DOMAIN]);
    assert!(err.is_not_found());
}

#[test]
fn test_show_baseline_in_both_formats() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);
    add_example_target(&runner);
    seed_baseline(&runner, &sample_data::catalog());

    runner.expect_success(&["show", DOMAIN]);
    runner.expect_success(&["show", "Example Data", "--format", "json"]);

    let err = runner.expect_failure(&["show", DOMAIN, "--format", "yaml"]);
    assert!(matches!(err, ScoutError::InvalidInput { .. }));
}

#[test]
fn test_show_with_duckdb_store() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init", "--store", "duckdb"]);
    add_example_target(&runner);
    seed_baseline(&runner, &sample_data::catalog());

    runner.expect_success(&["show", DOMAIN]);
    assert!(runner.fixture().workspace.duckdb_path(DOMAIN).exists());
}

#[test]
fn test_list_targets() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["init"]);
    runner.expect_success(&["list"]);

    add_example_target(&runner);
    seed_baseline(&runner, &sample_data::catalog());
    runner.expect_success(&["list"]);
    runner.expect_success(&["list", "--format", "json"]);
}

#[test]
fn test_commands_require_workspace() {
    let runner = CliTestRunner::new().unwrap();
    std::fs::create_dir(runner.fixture().root().join(".git")).unwrap();

    let err = runner.expect_failure(&["list"]);
    assert!(matches!(err, ScoutError::Workspace(_)));
}
