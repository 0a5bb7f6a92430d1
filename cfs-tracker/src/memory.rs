//! In-memory [`IssueTracker`] for tests.
//!
//! Holds issues in insertion order, assigns numbers sequentially, records
//! every mutating call, and can be told to fail specific operations.

use std::cell::RefCell;
use std::collections::BTreeSet;

use crate::error::{Result, TrackerError};
use crate::issue::{Issue, IssueState, IssueTracker, StateFilter};

#[derive(Debug, Default)]
struct State {
    issues: Vec<Issue>,
    labels: BTreeSet<String>,
    next_number: u64,
    unauthenticated: bool,
    failures: Vec<(String, Option<u64>)>,
    calls: Vec<String>,
}

/// Deterministic tracker double.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    state: RefCell<State>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an issue. Later numbers assigned by `create_issue` start above it.
    pub fn insert(&self, issue: Issue) {
        let mut s = self.state.borrow_mut();
        s.next_number = s.next_number.max(issue.number);
        s.issues.retain(|i| i.number != issue.number);
        s.issues.push(issue);
    }

    /// Seed an issue from its parts.
    pub fn with_issue(
        self,
        number: u64,
        title: &str,
        body: &str,
        state: IssueState,
        labels: &[&str],
    ) -> Self {
        self.insert(Issue {
            number,
            title: title.to_string(),
            body: body.to_string(),
            state,
            labels: labels.iter().map(|l| l.to_string()).collect(),
            url: format!("https://github.com/test/repo/issues/{number}"),
        });
        self
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.state.borrow_mut().unauthenticated = !authenticated;
    }

    /// Make `operation` (e.g. `"close_issue"`) fail, for one issue number or all.
    pub fn fail_on(&self, operation: &str, number: Option<u64>) {
        self.state
            .borrow_mut()
            .failures
            .push((operation.to_string(), number));
    }

    pub fn issue(&self, number: u64) -> Option<Issue> {
        self.state
            .borrow()
            .issues
            .iter()
            .find(|i| i.number == number)
            .cloned()
    }

    pub fn issues(&self) -> Vec<Issue> {
        self.state.borrow().issues.clone()
    }

    pub fn labels(&self) -> BTreeSet<String> {
        self.state.borrow().labels.clone()
    }

    /// Mutating calls so far, as `"operation"` or `"operation #n"`.
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    fn enter(&self, operation: &str, number: Option<u64>) -> Result<()> {
        let mut s = self.state.borrow_mut();
        if s.unauthenticated {
            return Err(TrackerError::NotAuthenticated);
        }
        let fails = s
            .failures
            .iter()
            .any(|(op, n)| op == operation && (n.is_none() || *n == number));
        if fails {
            return Err(TrackerError::Api {
                operation: operation.to_string(),
                stderr: "injected failure".to_string(),
            });
        }
        if operation != "list_issues" && operation != "get_issue" {
            s.calls.push(match number {
                Some(n) => format!("{operation} #{n}"),
                None => operation.to_string(),
            });
        }
        Ok(())
    }

    fn modify<T>(&self, number: u64, f: impl FnOnce(&mut Issue) -> T) -> Result<T> {
        let mut s = self.state.borrow_mut();
        let issue = s
            .issues
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or(TrackerError::IssueNotFound { number })?;
        Ok(f(issue))
    }
}

impl IssueTracker for MemoryTracker {
    fn check_auth(&self) -> Result<()> {
        if self.state.borrow().unauthenticated {
            Err(TrackerError::NotAuthenticated)
        } else {
            Ok(())
        }
    }

    fn list_issues(
        &self,
        state: StateFilter,
        label: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Issue>> {
        self.enter("list_issues", None)?;
        Ok(self
            .state
            .borrow()
            .issues
            .iter()
            .filter(|i| state.matches(i.state))
            .filter(|i| label.map_or(true, |l| i.has_label(l)))
            .take(limit)
            .cloned()
            .collect())
    }

    fn get_issue(&self, number: u64) -> Result<Issue> {
        self.enter("get_issue", Some(number))?;
        self.issue(number)
            .ok_or(TrackerError::IssueNotFound { number })
    }

    fn create_issue(&self, title: &str, body: &str, labels: &[String]) -> Result<Issue> {
        self.enter("create_issue", None)?;
        let mut s = self.state.borrow_mut();
        s.next_number += 1;
        let number = s.next_number;
        let issue = Issue {
            number,
            title: title.to_string(),
            body: body.to_string(),
            state: IssueState::Open,
            labels: labels.to_vec(),
            url: format!("https://github.com/test/repo/issues/{number}"),
        };
        s.issues.push(issue.clone());
        Ok(issue)
    }

    fn update_issue(
        &self,
        number: u64,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<Issue> {
        self.enter("update_issue", Some(number))?;
        self.modify(number, |i| {
            if let Some(title) = title {
                i.title = title.to_string();
            }
            if let Some(body) = body {
                i.body = body.to_string();
            }
            i.clone()
        })
    }

    fn close_issue(&self, number: u64) -> Result<Issue> {
        self.enter("close_issue", Some(number))?;
        self.modify(number, |i| {
            i.state = IssueState::Closed;
            i.clone()
        })
    }

    fn reopen_issue(&self, number: u64) -> Result<Issue> {
        self.enter("reopen_issue", Some(number))?;
        self.modify(number, |i| {
            i.state = IssueState::Open;
            i.clone()
        })
    }

    fn delete_issue(&self, number: u64) -> Result<()> {
        self.enter("delete_issue", Some(number))?;
        let mut s = self.state.borrow_mut();
        let before = s.issues.len();
        s.issues.retain(|i| i.number != number);
        if s.issues.len() == before {
            return Err(TrackerError::IssueNotFound { number });
        }
        Ok(())
    }

    fn add_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        self.enter("add_labels", Some(number))?;
        self.modify(number, |i| {
            for label in labels {
                if !i.has_label(label) {
                    i.labels.push(label.clone());
                }
            }
        })
    }

    fn remove_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        self.enter("remove_labels", Some(number))?;
        self.modify(number, |i| i.labels.retain(|l| !labels.contains(l)))
    }

    fn ensure_label_exists(&self, name: &str, _color: &str) -> Result<()> {
        self.enter("ensure_label_exists", None)?;
        self.state.borrow_mut().labels.insert(name.to_string());
        Ok(())
    }
}
