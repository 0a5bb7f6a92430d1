//! Shared fixtures for cfs-sync integration tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, VecDeque};

use cfs_core::{frontmatter, Category, DocumentRef, Store, LINK_KEY};
use cfs_sync::{Conflict, Interaction, Resolution};
use cfs_tracker::{IssueState, MemoryTracker};
use tempfile::TempDir;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn store() -> (TempDir, Store) {
    init_logging();
    let dir = TempDir::new().expect("tempdir");
    let store = Store::init(dir.path()).expect("init");
    (dir, store)
}

pub fn default_categories() -> BTreeSet<Category> {
    cfs_core::sync_categories(&BTreeSet::new(), &BTreeSet::new())
}

/// Create a document, optionally linked to `issue`.
pub fn doc(store: &Store, category: Category, title: &str, body: &str, issue: Option<u64>) -> DocumentRef {
    let text = match issue {
        Some(n) => frontmatter::set_key(body, LINK_KEY, n),
        None => body.to_string(),
    };
    store.create(category, title, &text).expect("create")
}

pub fn open(tracker: MemoryTracker, number: u64, title: &str, body: &str, labels: &[&str]) -> MemoryTracker {
    tracker.with_issue(number, title, body, IssueState::Open, labels)
}

pub fn closed(tracker: MemoryTracker, number: u64, title: &str, body: &str, labels: &[&str]) -> MemoryTracker {
    tracker.with_issue(number, title, body, IssueState::Closed, labels)
}

/// Interaction that replays scripted answers and records what it was asked.
#[derive(Default)]
pub struct Scripted {
    pub interactive: bool,
    pub categories: VecDeque<Option<Category>>,
    pub resolutions: VecDeque<Option<Resolution>>,
    pub asked_categories: Vec<(String, Vec<Category>)>,
    pub asked_conflicts: Vec<u64>,
}

impl Scripted {
    pub fn interactive() -> Self {
        Self {
            interactive: true,
            ..Self::default()
        }
    }

    pub fn choose(mut self, category: Option<Category>) -> Self {
        self.categories.push_back(category);
        self
    }

    pub fn resolve(mut self, resolution: Option<Resolution>) -> Self {
        self.resolutions.push_back(resolution);
        self
    }
}

impl Interaction for Scripted {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn select_category(&mut self, title: &str, candidates: &[Category]) -> Option<Category> {
        self.asked_categories
            .push((title.to_string(), candidates.to_vec()));
        self.categories.pop_front().flatten()
    }

    fn resolve_conflict(&mut self, conflict: &Conflict) -> Option<Resolution> {
        self.asked_conflicts.push(conflict.issue.number);
        self.resolutions.pop_front().unwrap_or(Some(Resolution::Skip))
    }
}
