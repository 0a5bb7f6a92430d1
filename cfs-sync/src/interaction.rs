//! Decision points the executor hands to the user.

use cfs_core::Category;

use crate::plan::Conflict;

/// How to settle a content conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Push the local document to the issue.
    Local,
    /// Rewrite the local document from the issue.
    Remote,
    Skip,
}

/// Injected prompt provider. The terminal adapter lives in the binary; tests
/// script their answers.
pub trait Interaction {
    /// Whether conflicts can be put to a user at all.
    fn is_interactive(&self) -> bool;

    /// Pick a category for an unlabelled issue. `None` skips the issue.
    fn select_category(&mut self, title: &str, candidates: &[Category]) -> Option<Category>;

    /// Settle a conflict. `None` aborts the whole run.
    fn resolve_conflict(&mut self, conflict: &Conflict) -> Option<Resolution>;
}

/// Answers nothing: unlabelled issues are skipped, conflicts count as errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl Interaction for NonInteractive {
    fn is_interactive(&self) -> bool {
        false
    }

    fn select_category(&mut self, _title: &str, _candidates: &[Category]) -> Option<Category> {
        None
    }

    fn resolve_conflict(&mut self, _conflict: &Conflict) -> Option<Resolution> {
        Some(Resolution::Skip)
    }
}
