//! Tests for `stash tag`.

use crate::support::*;

#[test]
fn test_tag_add_then_select() {
    let t = Test::with_synced(&[("a/.env", "A=1\n"), ("b/.env", "B=1\n")], "parameter-store");

    let output = t.run(&["tag", "a/.env", "-a", "prod"]);
    assert_success(&output);
    assert_stderr_contains(&output, "tagged a/.env [a, prod]");

    let output = t.run(&["get", "-t", "prod"]);
    assert_success(&output);
    assert_stdout_contains(&output, "A=1");
    assert!(!stdout(&output).contains("B=1"));
}

#[test]
fn test_tag_replace() {
    let t = Test::with_synced(&[("a/.env", "A=1\n")], "parameter-store");

    assert_success(&t.run(&["tag", "a/.env", "-t", "x,y"]));
    let output = t.run(&["list"]);
    assert_stdout_contains(&output, "a/.env [x, y]");
}

#[test]
fn test_tag_delete_by_tag() {
    let t = Test::with_synced(&[("a/.env", "A=1\n")], "parameter-store");

    assert_success(&t.run(&["tag", "-t", "a", "-d", "a"]));
    let output = t.run(&["list"]);
    assert!(!stdout(&output).contains("[a]"));
}

#[test]
fn test_tag_unknown_file() {
    let t = Test::with_synced(&[("a/.env", "A=1\n")], "parameter-store");

    let output = t.run(&["tag", "z/.env", "-a", "prod"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no files matched");
}
