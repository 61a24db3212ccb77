//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    let output = t.run(&["--help"]);
    assert_success(&output);
    let out = stdout(&output);
    for command in ["sync", "get", "inject", "purge", "clean", "list", "tag"] {
        assert!(out.contains(command), "help missing {}", command);
    }
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    t.cmd()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown-command"));
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    t.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("stash "));
}

#[test]
fn test_completions_bash_outputs_script() {
    let t = Test::new();

    let output = t.run(&["completions", "bash"]);
    assert_success(&output);
    assert_stdout_contains(&output, "stash");
}

#[test]
fn test_get_without_catalog_suggests_sync() {
    let t = Test::new();

    t.cmd()
        .arg("get")
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("catalog not found").and(predicate::str::contains("stash sync")),
        );
}

#[test]
fn test_unknown_output_rejected() {
    let t = Test::new();

    t.cmd()
        .args(["get", "-o", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let t = Test::with_synced(&[(".env", "A=1\n")], "parameter-store");

    t.cmd()
        .args(["--verbose", "get"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A=1").and(predicate::str::contains("DEBUG").not()));
}
