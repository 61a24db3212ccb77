//! Tests for `stash purge` and `stash clean`.

use crate::support::*;

#[test]
fn test_purge_last_file_removes_catalog() {
    let t = Test::with_synced(&[(".env", "A=1\n")], "parameter-store");

    let output = t.run(&["purge"]);
    assert_success(&output);
    assert_stderr_contains(&output, "purged .env");
    assert!(!t.exists("stash.yml"));
    assert!(t.exists(".env"));

    assert_failure(&t.run(&["get"]));
}

#[test]
fn test_purge_one_of_two() {
    let t = Test::with_synced(&[("a/.env", "A=1\n"), ("b/.env", "B=1\n")], "secrets-manager");

    assert_success(&t.run(&["purge", "a/.env"]));

    let catalog = t.catalog();
    assert!(!catalog.contains("path: a/.env"));
    assert!(catalog.contains("path: b/.env"));

    let output = t.get("original", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "B=1");
}

#[test]
fn test_purge_warn_needs_confirmation() {
    let t = Test::with_synced(&[(".env", "A=1\n")], "parameter-store");

    let output = t.run(&["purge", "--warn"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "confirming a purge requires a terminal");
    assert!(t.exists("stash.yml"));
    assert_stdout_contains(&t.get("original", &[]), "A=1");
}

#[test]
fn test_clean_removes_local_copies() {
    let t = Test::with_synced(&[("a/.env", "A=1\n"), ("b/.env", "B=1\n")], "parameter-store");

    let output = t.run(&["clean", "-t", "a"]);
    assert_success(&output);
    assert_stderr_contains(&output, "1 file(s) cleaned");
    assert!(!t.exists("a/.env"));
    assert!(t.exists("b/.env"));
}
