//! Tests for `stash list`.

use crate::support::*;

#[test]
fn test_list_groups_by_service() {
    let t = Test::with_synced(&[("config/.env", "A=1\n")], "parameter-store");
    t.write("app.json", "{\"name\": \"app\"}");
    assert_success(&t.run(&["sync", "app.json", "--no-clean", "-s", "secrets-manager"]));

    let output = t.list();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("Parameter Store"));
    assert!(out.contains("Secrets Manager"));
    assert!(out.contains("config/.env [config]"));
    assert!(out.contains("/app/config/.env/A"));
    assert!(out.contains("app/app.json"));
}

#[test]
fn test_list_filtered_by_service() {
    let t = Test::with_synced(&[("a/.env", "A=1\n")], "parameter-store");
    t.write("b.txt", "b");
    assert_success(&t.run(&["sync", "b.txt", "--no-clean", "-s", "s3"]));

    let output = t.run(&["list", "-s", "s3"]);
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("b.txt"));
    assert!(!out.contains("a/.env"));
}
