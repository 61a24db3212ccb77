//! Tests for `stash sync`.

use crate::support::*;

#[test]
fn test_sync_creates_catalog() {
    let t = Test::new();
    t.write("config/dev/.env", "DB_HOST=localhost\nDB_PORT=5432\n");

    let output = t.run(&[
        "sync",
        "config/dev/.env",
        "--context",
        "app",
        "--no-clean",
        "-s",
        "parameter-store",
    ]);
    assert_success(&output);
    assert_stderr_contains(&output, "synced config/dev/.env");

    let catalog = t.catalog();
    assert!(catalog.starts_with("## Stash Catalog ##"));
    assert!(catalog.contains("context: app"));
    assert!(catalog.contains("service: parameter-store"));
    assert!(catalog.contains("/app/config/dev/.env/DB_HOST"));
    assert!(t.exists("config/dev/.env"));
}

#[test]
fn test_sync_cleans_by_default() {
    let t = Test::new();
    t.write(".env", "A=1\n");

    let output = t.run(&["sync", ".env", "--context", "app", "-s", "secrets-manager"]);
    assert_success(&output);
    assert!(!t.exists(".env"));
    assert!(t.catalog().contains("clean: true"));
}

#[test]
fn test_sync_prompts_fall_back_to_defaults() {
    let t = Test::new();
    t.write(".env", "A=1\n");

    // No terminal: the context defaults to the directory name and the
    // service to the most secure compatible one.
    let output = t.run(&["sync", ".env", "--no-clean"]);
    assert_success(&output);
    assert!(t.catalog().contains("service: secrets-manager"));
}

#[test]
fn test_sync_s3_requires_bucket() {
    let t = Test::new();
    t.write("notes.txt", "hello");

    let output = t
        .cmd()
        .env_remove("STASH_S3_BUCKET")
        .args(["sync", "notes.txt", "--context", "app", "--no-clean", "-s", "s3"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "option s3_bucket is required");
    assert_stderr_contains(&output, "STASH_S3_BUCKET");
}

#[test]
fn test_sync_s3_with_bucket_from_env() {
    let t = Test::new();
    t.write("notes.txt", "hello");

    let output = t.run(&["sync", "notes.txt", "--context", "app", "--no-clean", "-s", "s3"]);
    assert_success(&output);
    assert!(t.catalog().contains("s3_bucket: test-bucket"));
}

#[test]
fn test_sync_incompatible_service() {
    let t = Test::new();
    t.write("app.json", "{\"a\": \"b\"}");

    let output = t.run(&[
        "sync",
        "app.json",
        "--context",
        "app",
        "--no-clean",
        "-s",
        "parameter-store",
    ]);
    assert_failure(&output);
    assert_stderr_contains(&output, "does not support json files");
}

#[test]
fn test_sync_invalid_context() {
    let t = Test::new();
    t.write(".env", "A=1\n");

    let output = t.run(&["sync", ".env", "--context", "My_App", "-s", "s3"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid context");
}

#[test]
fn test_resync_updates_remote() {
    let t = Test::with_synced(&[(".env", "A=1\n")], "parameter-store");
    t.write(".env", "A=2\nB=3\n");

    assert_success(&t.run(&["sync"]));

    let output = t.get("original", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "A=2");
    assert_stdout_contains(&output, "B=3");
}

#[test]
fn test_sync_by_pattern_needs_selection() {
    let t = Test::with_synced(&[(".env", "A=1\n")], "parameter-store");
    t.write("config/prod.env", "A=1\n");

    // Pattern matches need an interactive selection.
    let output = t.run(&["sync", "prod"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "selection requires a terminal");
}

#[test]
fn test_sync_pattern_without_matches() {
    let t = Test::with_synced(&[(".env", "A=1\n")], "parameter-store");

    let output = t.run(&["sync", "nothing-here"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no files matched nothing-here");
}

#[test]
fn test_sync_missing_local_file_reports_failure() {
    let t = Test::with_synced(&[("a/.env", "A=1\n"), ("b/.env", "B=1\n")], "parameter-store");
    std::fs::remove_file(t.path("a/.env")).unwrap();

    let output = t.run(&["sync"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "synced b/.env");
    assert_stderr_contains(&output, "1 of 2 file(s) failed to sync");
}
