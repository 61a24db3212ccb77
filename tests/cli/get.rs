//! Tests for `stash get`.

use crate::support::*;

#[test]
fn test_get_original() {
    let t = Test::with_synced(&[(".env", "NAME=app\nPORT=8080\n")], "secrets-manager");

    let output = t.get("original", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "NAME=\"app\"");
    assert_stdout_contains(&output, "PORT=8080");
}

#[test]
fn test_download_alias() {
    let t = Test::with_synced(&[(".env", "A=1\n")], "parameter-store");

    let output = t.run(&["download"]);
    assert_success(&output);
    assert_stdout_contains(&output, "A=1");
}

#[test]
fn test_get_json() {
    let t = Test::with_synced(&[(".env", "NAME=app\nPORT=8080\nDEBUG=true\n")], "parameter-store");

    let output = t.get("json", &[]);
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["NAME"], "app");
    assert_eq!(value["PORT"], 8080);
    assert_eq!(value["DEBUG"], true);
}

#[test]
fn test_get_terminal_export() {
    let t = Test::with_synced(&[(".env", "NAME=app\n")], "parameter-store");

    let output = t.get("terminal-export", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "export NAME=\"app\"");

    let output = t.get("terminal-export-literal", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "export NAME='app'");
}

#[test]
fn test_get_task_definition_outputs() {
    let t = Test::with_synced(&[(".env", "NAME=app\n")], "parameter-store");

    let output = t.get("ecs-task-env", &[]);
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value[0]["name"], "NAME");
    assert_eq!(value[0]["value"], "app");

    let output = t.get("ecs-task-inject-env", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "NAME=arn:aws:ssm:");
}

#[test]
fn test_get_file_restores() {
    let t = Test::with_synced(&[("config/.env", "A=1\n")], "parameter-store");
    std::fs::remove_file(t.path("config/.env")).unwrap();

    let output = t.get("file", &[]);
    assert_success(&output);
    assert_stderr_contains(&output, "restored config/.env");
    assert!(t.read("config/.env").contains("A=1"));
}

#[test]
fn test_get_by_tag() {
    let t = Test::with_synced(
        &[("dev/.env", "ENV=dev\n"), ("prod/.env", "ENV=prod\n")],
        "parameter-store",
    );

    let output = t.run(&["get", "-t", "prod"]);
    assert_success(&output);
    assert_stdout_contains(&output, "ENV=\"prod\"");
    assert!(!stdout(&output).contains("dev"));
}

#[test]
fn test_get_no_match() {
    let t = Test::with_synced(&[(".env", "A=1\n")], "parameter-store");

    let output = t.run(&["get", "-t", "missing"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no files matched");
    assert_stderr_contains(&output, "stash list");
}

#[test]
fn test_get_s3_blob() {
    let t = Test::with_synced(&[("certs/server.pem", "-----BEGIN-----\n")], "s3");

    let output = t.get("original", &["certs/server.pem"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "-----BEGIN-----\n");
}
