mod common;

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;

use common::{MAPPINGS, SUPPLIER, TARGET, TestWorkspace, fixture_path};

fn command(workspace: &TestWorkspace, mappings: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("supplier-reconcile").expect("binary exists");
    cmd.args([
        "--supplier",
        fixture_path(SUPPLIER).to_str().unwrap(),
        "--target",
        fixture_path(TARGET).to_str().unwrap(),
        "--mappings",
        mappings.to_str().unwrap(),
        "--output-dir",
        workspace.path().to_str().unwrap(),
    ]);
    cmd
}

#[test]
fn run_writes_timestamped_snapshot_directory() {
    let workspace = TestWorkspace::new();
    command(&workspace, &fixture_path(MAPPINGS))
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(contains("'grün'"))
        .stderr(contains("'Tesla'"));

    let dirs = workspace.subdirectories();
    assert_eq!(dirs.len(), 1);
    let name = dirs[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("complete_task_"), "{name}");
    for file in ["STEP_1_tidy.csv", "STEP_2_normalized.csv", "STEP_3_final.csv"] {
        assert!(dirs[0].join(file).exists(), "missing {file}");
    }
    let normalized = fs::read_to_string(dirs[0].join("STEP_2_normalized.csv")).unwrap();
    assert!(normalized.contains("\"Tesla_SUP\""));
}

#[test]
fn dry_run_prints_plan_and_preview_without_writing() {
    let workspace = TestWorkspace::new();
    command(&workspace, &fixture_path(MAPPINGS))
        .args(["--dry-run", "--preview", "2"])
        .assert()
        .success()
        .stdout(contains("manufacture_year"))
        .stdout(contains("synthesize"))
        .stdout(contains("rename"));
    assert!(workspace.subdirectories().is_empty());
}

#[test]
fn inconsistent_mapping_fails_without_output() {
    let workspace = TestWorkspace::new();
    let yaml = fs::read_to_string(fixture_path(MAPPINGS))
        .unwrap()
        .replace("  price_on_request: null\n", "");
    let mappings = workspace.write("broken.yaml", &yaml);
    command(&workspace, &mappings)
        .assert()
        .failure()
        .stderr(contains("correspondence mapping is inconsistent"));
    assert!(workspace.subdirectories().is_empty());
}

#[test]
fn non_numeric_year_fails_coercion() {
    let workspace = TestWorkspace::new();
    let yaml = fs::read_to_string(fixture_path(MAPPINGS))
        .unwrap()
        .replace("manufacture_year: FirstRegYear", "manufacture_year: City");
    let yaml = yaml.replace("  city: City\n", "  city: null\n");
    let mappings = workspace.write("swapped.yaml", &yaml);
    command(&workspace, &mappings)
        .assert()
        .failure()
        .stderr(contains("cannot coerce"))
        .stderr(contains("manufacture_year"));
    assert!(workspace.subdirectories().is_empty());
}

#[test]
fn missing_mapping_store_is_a_startup_error() {
    let workspace = TestWorkspace::new();
    let missing = workspace.path().join("nope.yaml");
    command(&workspace, &missing)
        .assert()
        .failure()
        .stderr(contains("Loading mapping store"));
}
