//! Hardening tests for edge cases and malformed input.
//!
//! These tests verify stash rejects broken catalogs and odd files with a
//! clear error instead of a panic or a half-written catalog.

mod support;

use std::collections::BTreeMap;

use stash::core::catalog::{group_by_service, Entry, Filter, Matches};
use stash::core::{dotenv, token};
use support::*;

// ============================================================================
// Malformed Input Tests
// ============================================================================

#[test]
fn test_malformed_catalog_is_reported() {
    let t = Test::new();
    t.write("stash.yml", "files: [not, a, map\n");

    let output = t.list();
    assert_failure(&output);
    assert_stderr_contains(&output, "stash.yml");
}

#[test]
fn test_comment_only_catalog_is_empty() {
    let t = Test::new();
    t.write("stash.yml", "# nothing tracked yet\n\n");

    let output = t.list();
    assert_failure(&output);
    assert_stderr_contains(&output, "no files");
}

#[test]
fn test_invalid_env_line_fails_sync() {
    let t = Test::new();
    t.write(".env", "GOOD=1\nthis is not an assignment\n");

    let output = t.run(&["sync", "--context", "app", "--no-clean", "-s", "parameter-store", ".env"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "line 2");
    assert!(t.exists(".env"));
}

#[test]
fn test_unicode_values_survive_sync() {
    let t = Test::with_synced(&[(".env", "GREETING=\"héllo wörld ✓\"\n")], "secrets-manager");

    let output = t.get("json", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "héllo wörld ✓");
}

#[test]
fn test_bom_prefixed_env() {
    let t = Test::with_synced(&[(".env", "\u{feff}A=1\n")], "parameter-store");

    let output = t.get("terminal-export", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "export A=\"1\"");
}

#[test]
fn test_unterminated_token_left_alone() {
    let t = Test::with_synced(&[(".env", "A=1\n")], "secrets-manager");

    let output = t.run_with_stdin(&["inject", "-s", "secrets-manager"], "value: ${unterminated\n");
    assert_success(&output);
    assert_eq!(stdout(&output), "value: ${unterminated\n");
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    const SERVICES: [&str; 3] = ["s3", "parameter-store", "secrets-manager"];

    fn entry_strategy() -> impl Strategy<Value = Entry> {
        (
            "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
            0..SERVICES.len(),
            prop::collection::vec("[a-c]", 0..3),
        )
            .prop_map(|(path, service, tags)| Entry {
                path,
                service: SERVICES[service].to_string(),
                tags,
                ..Entry::default()
            })
    }

    fn matches_strategy() -> impl Strategy<Value = Matches> {
        prop::collection::vec(entry_strategy(), 0..12).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, e)| (format!("k{}", i), e))
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn empty_filter_matches_everything(entry in entry_strategy()) {
            prop_assert!(Filter::default().matches(&entry));
        }

        #[test]
        fn grouping_partitions_matches(matches in matches_strategy()) {
            let total = matches.len();
            let grouped = group_by_service(matches.clone());

            prop_assert_eq!(grouped.values().map(BTreeMap::len).sum::<usize>(), total);
            for (service, group) in &grouped {
                prop_assert!(!group.is_empty());
                for (key, entry) in group {
                    prop_assert_eq!(&entry.service, service);
                    prop_assert_eq!(matches.get(key), Some(entry));
                }
            }
        }

        #[test]
        fn tag_filter_requires_every_tag(entry in entry_strategy(), tags in prop::collection::vec("[a-c]", 0..3)) {
            let filter = Filter::read(vec![], tags.clone(), "");
            let expected = tags.iter().all(|t| entry.tags.contains(t));
            prop_assert_eq!(filter.matches(&entry), expected);
        }

        #[test]
        fn write_filter_ignores_tags_with_files(entry in entry_strategy(), tags in prop::collection::vec("[x-z]", 1..3)) {
            let filter = Filter::write(vec![entry.path.clone()], tags, "unknown");
            prop_assert!(filter.matches(&entry));
        }

        #[test]
        fn dotenv_reads_plain_assignments(pairs in prop::collection::btree_map("[A-Z][A-Z0-9_]{0,10}", "[a-zA-Z0-9_./:-]{0,20}", 0..8)) {
            let text: String = pairs.iter().map(|(k, v)| format!("{}={}\n", k, v)).collect();
            let parsed = dotenv::parse(&text).unwrap();
            prop_assert_eq!(parsed, pairs);
        }

        #[test]
        fn dotenv_never_panics(text in "\\PC{0,200}") {
            let _ = dotenv::parse(&text);
        }

        #[test]
        fn replace_without_values_is_identity(text in "\\PC{0,120}") {
            let tokens = token::find(&text).unwrap();
            prop_assert_eq!(token::replace(&text, &BTreeMap::new()).unwrap(), text.clone());
            for placeholder in tokens.keys() {
                prop_assert!(text.contains(placeholder.as_str()));
            }
        }
    }
}
