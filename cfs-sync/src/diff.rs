//! Unified diff of a content conflict, for status and prompt display.

use similar::TextDiff;

use crate::plan::Conflict;

/// Title line pair (when titles differ) followed by a unified diff of the
/// canonical bodies. Empty when neither side differs.
pub fn render_conflict(conflict: &Conflict) -> String {
    let mut out = String::new();
    if conflict.title_differs {
        out.push_str(&format!("- title: {}\n", conflict.local_title));
        out.push_str(&format!("+ title: {}\n", conflict.issue.title.trim()));
    }
    if conflict.body_differs {
        out.push_str(&unified(&conflict.local_body, &conflict.remote_body));
    }
    out
}

/// `a/local` → `b/remote` diff with three lines of context.
pub fn unified(local: &str, remote: &str) -> String {
    let local = with_newline(local);
    let remote = with_newline(remote);
    TextDiff::from_lines(&local, &remote)
        .unified_diff()
        .header("a/local", "b/remote")
        .context_radius(3)
        .to_string()
}

fn with_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use cfs_core::{Category, DocumentId, DocumentRef};
    use cfs_tracker::{Issue, IssueState};

    use super::*;

    fn conflict(local_title: &str, local: &str, remote_title: &str, remote: &str) -> Conflict {
        Conflict {
            document: DocumentRef {
                category: Category::Features,
                id: DocumentId(1),
                path: PathBuf::from("1-x.md"),
            },
            issue: Issue {
                number: 4,
                title: remote_title.to_string(),
                body: remote.to_string(),
                state: IssueState::Open,
                labels: vec![],
                url: String::new(),
            },
            local_title: local_title.to_string(),
            local_body: local.to_string(),
            remote_body: remote.to_string(),
            title_differs: local_title != remote_title,
            body_differs: local != remote,
        }
    }

    #[test]
    fn body_diff_has_headers_and_hunks() {
        let out = render_conflict(&conflict("T", "Some content.", "T", "Different content."));
        assert!(out.contains("--- a/local"));
        assert!(out.contains("+++ b/remote"));
        assert!(out.contains("@@"));
        assert!(out.contains("-Some content."));
        assert!(out.contains("+Different content."));
        assert!(!out.contains("title:"));
    }

    #[test]
    fn title_only_conflict() {
        let out = render_conflict(&conflict("Old", "same", "New", "same"));
        assert_eq!(out, "- title: Old\n+ title: New\n");
    }
}
