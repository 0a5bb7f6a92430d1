//! Remote issue representation and the tracker contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Open/closed state of a remote issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// Case-insensitive parse of tracker output (`OPEN`, `closed`, …).
    pub fn parse(s: &str) -> Option<IssueState> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Some(IssueState::Open),
            "closed" => Some(IssueState::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueState::Open => f.write_str("open"),
            IssueState::Closed => f.write_str("closed"),
        }
    }
}

/// State filter for [`IssueTracker::list_issues`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    Open,
    Closed,
    All,
}

impl StateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::Open => "open",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }

    pub fn matches(&self, state: IssueState) -> bool {
        match self {
            StateFilter::Open => state == IssueState::Open,
            StateFilter::Closed => state == IssueState::Closed,
            StateFilter::All => true,
        }
    }
}

/// A remote issue. `number` is its immutable identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: IssueState,
    pub labels: Vec<String>,
    pub url: String,
}

impl Issue {
    pub fn is_closed(&self) -> bool {
        self.state == IssueState::Closed
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }
}

/// Operations the reconciliation engine needs from an issue tracker.
///
/// Calls are synchronous and never retried by callers. Implementations report
/// missing tooling and missing credentials through the dedicated
/// [`crate::TrackerError`] variants so callers can stop early.
pub trait IssueTracker {
    /// Verify the tracker is reachable with valid credentials.
    fn check_auth(&self) -> Result<()>;

    fn list_issues(
        &self,
        state: StateFilter,
        label: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Issue>>;

    fn get_issue(&self, number: u64) -> Result<Issue>;

    fn create_issue(&self, title: &str, body: &str, labels: &[String]) -> Result<Issue>;

    /// Update title and/or body; `None` leaves the field untouched.
    fn update_issue(&self, number: u64, title: Option<&str>, body: Option<&str>)
        -> Result<Issue>;

    fn close_issue(&self, number: u64) -> Result<Issue>;

    fn reopen_issue(&self, number: u64) -> Result<Issue>;

    fn delete_issue(&self, number: u64) -> Result<()>;

    fn add_labels(&self, number: u64, labels: &[String]) -> Result<()>;

    fn remove_labels(&self, number: u64, labels: &[String]) -> Result<()>;

    /// Create the label with `color` unless it already exists.
    fn ensure_label_exists(&self, name: &str, color: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("OPEN", Some(IssueState::Open))]
    #[case("closed", Some(IssueState::Closed))]
    #[case(" Closed ", Some(IssueState::Closed))]
    #[case("MERGED", None)]
    fn parses_state_case_insensitively(#[case] raw: &str, #[case] expected: Option<IssueState>) {
        assert_eq!(IssueState::parse(raw), expected);
    }

    #[test]
    fn filter_all_matches_both_states() {
        assert!(StateFilter::All.matches(IssueState::Open));
        assert!(StateFilter::All.matches(IssueState::Closed));
        assert!(!StateFilter::Open.matches(IssueState::Closed));
    }
}
