//! Tests for `stash inject`.

use crate::support::*;

fn seeded() -> Test {
    Test::with_synced(
        &[(".env", "URL=postgres://db\nPORT=5432\n")],
        "secrets-manager",
    )
}

#[test]
fn test_inject_stdin() {
    let t = seeded();

    let output = t.run_with_stdin(
        &["inject", "-s", "secrets-manager"],
        "url: ${app/.env::URL}\nport: ${app/.env::PORT}\n",
    );
    assert_success(&output);
    assert_eq!(stdout(&output), "url: postgres://db\nport: 5432\n");
}

#[test]
fn test_inject_whole_value() {
    let t = seeded();

    let output = t.run_with_stdin(&["inject", "-s", "secrets-manager"], "${app/.env}");
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(value["URL"], "postgres://db");
}

#[test]
fn test_inject_missing_field_fails_but_prints() {
    let t = seeded();

    let output = t.run_with_stdin(&["inject", "-s", "secrets-manager"], "x=${app/.env::NOPE}\n");
    assert_failure(&output);
    assert_stdout_contains(&output, "x=${app/.env::NOPE}");
    assert_stderr_contains(&output, "field 'NOPE' not found in 'app/.env'");
}

#[test]
fn test_inject_file_in_place() {
    let t = seeded();
    t.write("deploy/app.env", "DATABASE=${app/.env::URL}\n");

    let output = t.run(&["inject", "deploy/app.env", "-s", "secrets-manager", "-o", "file"]);
    assert_success(&output);
    assert_eq!(t.read("deploy/app.env"), "DATABASE=postgres://db\n");
}

#[test]
fn test_inject_with_export_transform() {
    let t = seeded();
    t.write("tpl.env", "DATABASE=${app/.env::URL}\n");

    let output = t.run(&["inject", "tpl.env", "-s", "secrets-manager", "-o", "terminal-export"]);
    assert_success(&output);
    assert_stdout_contains(&output, "export DATABASE=\"postgres://db\"");
}

#[test]
fn test_inject_without_tokens_warns() {
    let t = seeded();

    let output = t.run_with_stdin(&["inject", "-s", "secrets-manager"], "plain\n");
    assert_success(&output);
    assert_eq!(stdout(&output), "plain\n");
    assert_stderr_contains(&output, "tokens not found");
}

#[test]
fn test_inject_requires_service() {
    let t = seeded();
    assert_failure(&t.run_with_stdin(&["inject"], "${a}"));
}

#[test]
fn test_inject_needs_no_catalog() {
    let t = seeded();
    std::fs::remove_file(t.path("stash.yml")).unwrap();

    let output = t.run_with_stdin(&["inject", "-s", "secrets-manager"], "${app/.env::PORT}");
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "5432");
}
