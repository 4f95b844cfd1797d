//! End-to-end CLI tests: exit codes and report output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn apigate() -> Command {
    Command::cargo_bin("apigate").unwrap()
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn compare_reports_no_changes_for_identical_trees() {
    let old = tempfile::tempdir().unwrap();
    let new = tempfile::tempdir().unwrap();
    let code = "def fetch(url: str) -> str:\n    return \"ok\"\n";
    write(old.path(), "api.py", code);
    write(new.path(), "api.py", code);

    apigate()
        .args(["compare"])
        .arg(old.path())
        .arg(new.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No public API changes detected."));
}

#[test]
fn gate_blocks_a_breaking_change_declared_as_patch() {
    let old = tempfile::tempdir().unwrap();
    let new = tempfile::tempdir().unwrap();
    write(old.path(), "api.py", "def hello(name: str) -> str:\n    return name\n");
    write(new.path(), "api.py", "def hello() -> str:\n    return 'hi'\n");

    apigate()
        .args(["gate"])
        .arg(old.path())
        .arg(new.path())
        .args(["--declared", "patch"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("RELEASE BLOCKED"));
}

#[test]
fn gate_passes_when_the_declared_bump_covers_the_change() {
    let old = tempfile::tempdir().unwrap();
    let new = tempfile::tempdir().unwrap();
    write(old.path(), "api.py", "def hello(name: str) -> str:\n    return name\n");
    write(new.path(), "api.py", "def hello() -> str:\n    return 'hi'\n");

    apigate()
        .args(["gate"])
        .arg(old.path())
        .arg(new.path())
        .args(["--declared", "major"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gate passed"));
}

#[test]
fn gate_rejects_an_invalid_declared_bump() {
    let old = tempfile::tempdir().unwrap();
    let new = tempfile::tempdir().unwrap();
    write(old.path(), "api.py", "def f(): pass\n");
    write(new.path(), "api.py", "def f(): pass\n");

    apigate()
        .args(["gate"])
        .arg(old.path())
        .arg(new.path())
        .args(["--declared", "breaking"])
        .assert()
        .code(2);
}

#[test]
fn compare_emits_machine_readable_json() {
    let old = tempfile::tempdir().unwrap();
    let new = tempfile::tempdir().unwrap();
    write(old.path(), "api.py", "def fetch(url: str) -> str: ...\n");
    write(
        new.path(),
        "api.py",
        "def fetch(url: str, timeout: int = 30) -> str: ...\n",
    );

    let output = apigate()
        .args(["compare"])
        .arg(old.path())
        .arg(new.path())
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["severity"], "minor");
    assert_eq!(value["changes"][0]["kind"], "optional_parameter_added");
    assert_eq!(value["changes"][0]["path"], "api.fetch.timeout");
}

#[test]
fn unreadable_root_is_a_fatal_error() {
    let new = tempfile::tempdir().unwrap();
    write(new.path(), "api.py", "def f(): pass\n");

    apigate()
        .args(["compare", "/nonexistent/old"])
        .arg(new.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn parse_failures_are_counted_on_stderr() {
    let old = tempfile::tempdir().unwrap();
    let new = tempfile::tempdir().unwrap();
    write(old.path(), "api.py", "def f(): pass\n");
    write(new.path(), "api.py", "def f(): pass\n");
    write(new.path(), "broken.py", "def broken(:\n");

    apigate()
        .args(["compare"])
        .arg(old.path())
        .arg(new.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 file(s) failed to parse"));
}

#[test]
fn snapshot_can_stand_in_for_a_source_tree() {
    let tree = tempfile::tempdir().unwrap();
    write(tree.path(), "api.py", "def fetch(url: str) -> str: ...\n");

    let baseline = tempfile::tempdir().unwrap();
    let snapshot_path = baseline.path().join("baseline.json");

    apigate()
        .args(["snapshot", "--save"])
        .arg(&snapshot_path)
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot saved to:"));

    // The tree changed since the baseline: a parameter was renamed.
    write(tree.path(), "api.py", "def fetch(path: str) -> str: ...\n");

    apigate()
        .args(["gate"])
        .arg(&snapshot_path)
        .arg(tree.path())
        .args(["--declared", "patch"])
        .assert()
        .code(1);
}

#[test]
fn init_writes_a_starter_config_once() {
    let dir = tempfile::tempdir().unwrap();

    apigate()
        .args(["init"])
        .arg(dir.path())
        .assert()
        .success();
    assert!(dir.path().join(".apigate.toml").exists());

    apigate()
        .args(["init"])
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}
