//! Canonical body forms used to compare documents with issues.
//!
//! Both sides are reduced to `contents [+ "## Acceptance Criteria" + criteria]`
//! with line endings, trailing whitespace and heading case normalised, so
//! formatting noise never reads as a conflict.

use cfs_core::frontmatter;
use cfs_core::sections::{self, is_fence, parse_heading, ACCEPTANCE_CRITERIA, CONTENTS};

/// `\n` line endings, right-trimmed lines, no leading or trailing blank lines.
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = unified.lines().map(str::trim_end).collect();
    let start = lines.iter().position(|l| !l.is_empty());
    let end = lines.iter().rposition(|l| !l.is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e].join("\n"),
        _ => String::new(),
    }
}

fn is_acceptance_heading(line: &str) -> bool {
    matches!(parse_heading(line), Some((level, text))
        if level >= 2 && text.eq_ignore_ascii_case(ACCEPTANCE_CRITERIA))
}

/// Split an issue body at its first `## Acceptance Criteria` heading.
///
/// Returns `(contents, acceptance_criteria)`; the heading line itself is
/// dropped. A body without the heading is all contents.
pub fn split_remote_body(body: &str) -> (String, String) {
    let mut contents: Vec<&str> = Vec::new();
    let mut criteria: Vec<&str> = Vec::new();
    let mut in_fence = false;
    let mut found = false;
    for line in body.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
        }
        if !found && !in_fence && is_acceptance_heading(line) {
            found = true;
            continue;
        }
        if found {
            criteria.push(line);
        } else {
            contents.push(line);
        }
    }
    (
        sections::trim_blank_lines(&contents.join("\n")),
        sections::trim_blank_lines(&criteria.join("\n")),
    )
}

/// `contents`, then the criteria heading and criteria when non-empty, blank-line
/// separated.
pub fn join_body(contents: &str, criteria: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !contents.is_empty() {
        parts.push(contents.to_string());
    }
    if !criteria.is_empty() {
        parts.push(format!("## {ACCEPTANCE_CRITERIA}"));
        parts.push(criteria.to_string());
    }
    parts.join("\n\n")
}

fn has_known_section(body: &str) -> bool {
    let mut in_fence = false;
    for line in body.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some((level, text)) = parse_heading(line) {
            if level >= 2
                && (text.eq_ignore_ascii_case(CONTENTS)
                    || text.eq_ignore_ascii_case(ACCEPTANCE_CRITERIA))
            {
                return true;
            }
        }
    }
    false
}

/// `(contents, acceptance_criteria)` of a document body.
///
/// A body with neither section contributes everything below its title as
/// contents.
pub fn local_parts(body: &str) -> (String, String) {
    if !has_known_section(body) {
        return (sections::body_without_title(body), String::new());
    }
    let s = sections::extract(body);
    (s.contents, s.acceptance_criteria)
}

/// Issue body to publish for a document, in its exact (un-normalised) form.
pub fn remote_body_from_document(text: &str) -> String {
    let (contents, criteria) = local_parts(frontmatter::strip(text));
    join_body(&contents, &criteria)
}

/// Comparison form of a document. Accepts text with or without frontmatter.
pub fn canonical_local_body(text: &str) -> String {
    let (contents, criteria) = local_parts(frontmatter::strip(text));
    normalize(&join_body(&normalize(&contents), &normalize(&criteria)))
}

/// Comparison form of an issue body.
pub fn canonical_remote_body(body: &str) -> String {
    let (contents, criteria) = split_remote_body(body);
    normalize(&join_body(&normalize(&contents), &normalize(&criteria)))
}

/// Title conflict test. An empty local title never conflicts.
pub fn titles_differ(local: &str, remote: &str) -> bool {
    let local = local.trim();
    !local.is_empty() && local != remote.trim()
}

/// Document body (no frontmatter) built from an issue.
///
/// `working_directory` carries over a section the issue body has no place for.
pub fn document_from_issue(title: &str, body: &str, working_directory: &str) -> String {
    let (contents, criteria) = split_remote_body(body);
    let mut out = format!("# {}\n", title.trim());
    if !working_directory.is_empty() {
        out.push_str(&format!("\n## Working Directory\n\n{working_directory}\n"));
    }
    out.push_str(&format!("\n## {CONTENTS}\n"));
    if !contents.is_empty() {
        out.push_str(&format!("\n{contents}\n"));
    }
    if !criteria.is_empty() {
        out.push_str(&format!("\n## {ACCEPTANCE_CRITERIA}\n\n{criteria}\n"));
    }
    out
}
