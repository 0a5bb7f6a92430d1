//! Shared reconciliation entrypoint used by `cfs status` and `cfs sync`.

use std::collections::BTreeSet;

use cfs_core::{Category, Store};
use cfs_tracker::{IssueTracker, StateFilter};

use crate::error::SyncError;
use crate::execute::{execute, ExecuteOptions, SyncReport};
use crate::interaction::Interaction;
use crate::plan::{build_plan, SyncPlan};

/// Check credentials, fetch issues, and build the plan.
///
/// Authentication and installation problems surface here, before any plan
/// work starts.
pub fn prepare(
    store: &Store,
    tracker: &dyn IssueTracker,
    categories: &BTreeSet<Category>,
    issue_limit: usize,
) -> Result<SyncPlan, SyncError> {
    tracker.check_auth()?;
    let issues = tracker.list_issues(StateFilter::All, None, issue_limit)?;
    tracing::debug!(
        "fetched {} issues; reconciling {} categories",
        issues.len(),
        categories.len()
    );
    Ok(build_plan(store, &issues, categories))
}

/// [`prepare`] then [`execute`].
pub fn run(
    store: &Store,
    tracker: &dyn IssueTracker,
    interaction: &mut dyn Interaction,
    categories: &BTreeSet<Category>,
    issue_limit: usize,
    options: &ExecuteOptions,
) -> Result<(SyncPlan, SyncReport), SyncError> {
    let plan = prepare(store, tracker, categories, issue_limit)?;
    let report = execute(&plan, store, tracker, interaction, options);
    Ok((plan, report))
}

#[cfg(test)]
mod tests {
    use cfs_tracker::{MemoryTracker, TrackerError};
    use tempfile::TempDir;

    use crate::interaction::NonInteractive;

    use super::*;

    #[test]
    fn auth_failure_stops_before_planning() {
        let dir = TempDir::new().expect("tempdir");
        let store = Store::init(dir.path()).expect("init");
        store.create(Category::Features, "A", "# A\n").unwrap();
        let tracker = MemoryTracker::new();
        tracker.set_authenticated(false);

        let err = run(
            &store,
            &tracker,
            &mut NonInteractive,
            &cfs_core::sync_categories(&BTreeSet::new(), &BTreeSet::new()),
            100,
            &ExecuteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::Tracker(TrackerError::NotAuthenticated)));
        assert!(err.is_fatal());
        assert!(tracker.calls().is_empty());
    }

    #[test]
    fn empty_everything_is_a_no_op() {
        let dir = TempDir::new().expect("tempdir");
        let store = Store::init(dir.path()).expect("init");
        let tracker = MemoryTracker::new();
        let (plan, report) = run(
            &store,
            &tracker,
            &mut NonInteractive,
            &cfs_core::sync_categories(&BTreeSet::new(), &BTreeSet::new()),
            100,
            &ExecuteOptions::default(),
        )
        .expect("run");
        assert_eq!(plan.actionable_count(), 0);
        assert_eq!(report.counts.applied(), 0);
        assert!(report.results.is_empty());
    }
}
