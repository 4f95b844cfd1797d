//! Integration tests for the apigate library API.

use apigate::{
    Bump, ChangeKind, ExtractError, ExtractOptions, Severity, build_surface, compare_surfaces,
    evaluate,
};
use std::fs;
use std::path::Path;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn end_to_end_removed_parameter_blocks_a_patch_release() {
    let old_dir = tempfile::tempdir().unwrap();
    let new_dir = tempfile::tempdir().unwrap();
    write(old_dir.path(), "api.py", "def f(a: int) -> int:\n    return a\n");
    write(new_dir.path(), "api.py", "def f() -> int:\n    return 0\n");

    let old = build_surface(old_dir.path(), &ExtractOptions::default()).unwrap();
    let new = build_surface(new_dir.path(), &ExtractOptions::default()).unwrap();

    let (changes, severity) = compare_surfaces(&old.surface, &new.surface);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, ChangeKind::ParameterRemoved);
    assert_eq!(severity, Severity::Major);

    assert!(!evaluate(severity, Bump::Patch).pass);
    assert!(evaluate(severity, Bump::Major).pass);
}

#[test]
fn identical_trees_pass_every_declared_bump() {
    let old_dir = tempfile::tempdir().unwrap();
    let new_dir = tempfile::tempdir().unwrap();
    let code = "class Config:\n    timeout: int = 1\n\ndef load(path: str) -> Config: ...\n";
    write(old_dir.path(), "api.py", code);
    write(new_dir.path(), "api.py", code);

    let old = build_surface(old_dir.path(), &ExtractOptions::default()).unwrap();
    let new = build_surface(new_dir.path(), &ExtractOptions::default()).unwrap();

    let (changes, severity) = compare_surfaces(&old.surface, &new.surface);
    assert!(changes.is_empty());
    assert_eq!(severity, Severity::None);
    for declared in [Bump::Patch, Bump::Minor, Bump::Major] {
        assert!(evaluate(severity, declared).pass);
    }
}

#[test]
fn diff_of_a_snapshot_with_itself_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pkg/__init__.py",
        "__all__ = [\"fetch\"]\nfrom .client import fetch\n",
    );
    write(
        dir.path(),
        "pkg/client.py",
        "def fetch(url: str, *, retries: int = 3) -> bytes: ...\n",
    );

    let extraction = build_surface(dir.path(), &ExtractOptions::default()).unwrap();
    let (changes, severity) = compare_surfaces(&extraction.surface, &extraction.surface);
    assert!(changes.is_empty());
    assert_eq!(severity, Severity::None);
}

#[test]
fn invalid_root_reports_a_fatal_error() {
    let result = build_surface(Path::new("/nonexistent/path"), &ExtractOptions::default());
    match result {
        Err(ExtractError::Root { .. }) => {}
        Err(e) => panic!("Expected Root error, got: {:?}", e),
        Ok(_) => panic!("Expected error for invalid root"),
    }
}

#[test]
fn parse_failures_surface_in_the_extraction_result() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "ok.py", "def fine(): pass\n");
    write(dir.path(), "broken.py", "def broken(:\n");

    let extraction = build_surface(dir.path(), &ExtractOptions::default()).unwrap();
    assert_eq!(extraction.errors.len(), 1);
    assert!(extraction.errors[0].path.ends_with("broken.py"));

    // The parsable part of the tree is still diffable.
    let (changes, _) = compare_surfaces(&extraction.surface, &extraction.surface);
    assert!(changes.is_empty());
}
