//! Frontmatter round-trip and section extraction cases.
//!
//! Each `#[case]` is isolated.

use cfs_core::frontmatter::{self, Frontmatter, FrontmatterValue, LINK_KEY};
use cfs_core::sections;
use rstest::rstest;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn link_only() -> Frontmatter {
    [(LINK_KEY, FrontmatterValue::Integer(42))].into_iter().collect()
}

fn mixed() -> Frontmatter {
    [
        ("github_issue", FrontmatterValue::Integer(7)),
        ("owner", FrontmatterValue::from("alice")),
        ("priority", FrontmatterValue::Integer(-1)),
        ("draft", FrontmatterValue::Boolean(false)),
        ("note", FrontmatterValue::from("needs: review")),
    ]
    .into_iter()
    .collect()
}

fn awkward_strings() -> Frontmatter {
    [
        ("numeric", FrontmatterValue::from("0042")),
        ("boolish", FrontmatterValue::from("yes")),
        ("spaced", FrontmatterValue::from("  padded  ")),
        ("hash", FrontmatterValue::from("# not a comment")),
        ("unicode", FrontmatterValue::from("プロジェクト")),
    ]
    .into_iter()
    .collect()
}

// ---------------------------------------------------------------------------
// 1. Round-trip
// ---------------------------------------------------------------------------

#[rstest]
#[case::link_only(link_only(), "# Title\n\nBody.\n")]
#[case::mixed(mixed(), "")]
#[case::awkward(awkward_strings(), "---\nbody that looks like a delimiter\n")]
#[case::crlf_body(link_only(), "line one\r\nline two\r\n")]
fn parse_inverts_serialize(#[case] fm: Frontmatter, #[case] body: &str) {
    let text = frontmatter::serialize(&fm, body);
    let (parsed, rest) = frontmatter::parse(&text);
    assert_eq!(parsed, fm);
    assert_eq!(rest, body);
}

#[rstest]
#[case("")]
#[case("# Title\n")]
#[case("---\nnot: closed\n")]
fn empty_map_serializes_to_body(#[case] body: &str) {
    assert_eq!(frontmatter::serialize(&Frontmatter::new(), body), body);
}

#[test]
fn set_then_remove_restores_plain_text() {
    let original = "# Title\n\n## Contents\n\nSome content.\n";
    let linked = frontmatter::set_key(original, LINK_KEY, 42i64);
    assert_eq!(frontmatter::parse(&linked).0.github_issue(), Some(42));
    let unlinked = frontmatter::remove_key(&linked, LINK_KEY);
    assert_eq!(unlinked, original);
}

#[test]
fn remove_keeps_other_keys_in_order() {
    let text = frontmatter::serialize(&mixed(), "x");
    let out = frontmatter::remove_key(&text, LINK_KEY);
    let (fm, body) = frontmatter::parse(&out);
    let keys: Vec<&str> = fm.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["owner", "priority", "draft", "note"]);
    assert_eq!(body, "x");
}

// ---------------------------------------------------------------------------
// 2. Sections after frontmatter
// ---------------------------------------------------------------------------

#[test]
fn sections_of_linked_document() {
    let text = "---\ngithub_issue: 42\n---\n# Test Feature\n\n## Contents\n\nSome content.\n";
    let body = frontmatter::strip(text);
    let s = sections::extract(body);
    assert_eq!(s.title, "Test Feature");
    assert_eq!(s.contents, "Some content.");
    assert!(s.acceptance_criteria.is_empty());
    assert!(s.working_directory.is_empty());
}

#[rstest]
#[case("## Contents\n\nA\n\n## Acceptance Criteria\n\nB\n", "A", "B")]
#[case("## contents\nA\n### Sub\nA2\n## ACCEPTANCE CRITERIA\nB\n", "A\n### Sub\nA2", "B")]
#[case("### Contents\nA\n## Acceptance Criteria\nB\n", "A", "B")]
#[case("no headings at all\n", "", "")]
fn contents_and_criteria(#[case] body: &str, #[case] contents: &str, #[case] criteria: &str) {
    let s = sections::extract(body);
    assert_eq!(s.contents, contents);
    assert_eq!(s.acceptance_criteria, criteria);
}
