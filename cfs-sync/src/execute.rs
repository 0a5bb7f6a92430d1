//! Plan execution.
//!
//! Items run in plan order, one at a time. Each item succeeds, fails, or is
//! skipped on its own; a failure is logged and counted and the loop moves on.
//! Only an abort answer at a conflict prompt stops early, keeping whatever was
//! already applied.

use serde::Serialize;

use cfs_core::{frontmatter, sections, Category, Store, LINK_KEY};
use cfs_tracker::{Issue, IssueTracker};

use crate::canonical;
use crate::error::SyncError;
use crate::interaction::{Interaction, Resolution};
use crate::plan::{ActionKind, Conflict, LocalDocument, SyncItem, SyncPlan};

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Report what would happen without touching the store or the tracker.
    pub dry_run: bool,
    /// Colour for `cfs:<category>` labels created on the way.
    pub label_color: String,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            label_color: "0e8a16".to_string(),
        }
    }
}

/// What happened to one plan item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    /// Dry run: the item would have been applied.
    WouldApply,
    Skipped { reason: String },
    Failed { message: String },
    /// Dry run: the item needs a prompt, so nothing more can be said.
    Previewed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub action: ActionKind,
    pub target: String,
    pub title: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Execution counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncCounts {
    pub created_local: usize,
    pub created_remote: usize,
    pub closed_remote: usize,
    pub completed_local: usize,
    pub resolved_conflicts: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl SyncCounts {
    /// Counted effects, excluding skips and errors.
    pub fn applied(&self) -> usize {
        self.created_local
            + self.created_remote
            + self.closed_remote
            + self.completed_local
            + self.resolved_conflicts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub counts: SyncCounts,
    pub results: Vec<ItemResult>,
    /// The user aborted at a conflict prompt.
    pub aborted: bool,
    pub dry_run: bool,
}

/// Per-item result before it is folded into the counters.
enum Step {
    Done(Counter),
    Would(Counter),
    Skipped(String),
    Previewed,
    Abort,
}

#[derive(Clone, Copy)]
enum Counter {
    CreatedLocal,
    CreatedRemote,
    ClosedRemote,
    CompletedLocal,
    Resolved,
}

impl SyncCounts {
    fn bump(&mut self, counter: Counter) {
        match counter {
            Counter::CreatedLocal => self.created_local += 1,
            Counter::CreatedRemote => self.created_remote += 1,
            Counter::ClosedRemote => self.closed_remote += 1,
            Counter::CompletedLocal => self.completed_local += 1,
            Counter::Resolved => self.resolved_conflicts += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

/// Apply every actionable item of `plan`.
pub fn execute(
    plan: &SyncPlan,
    store: &Store,
    tracker: &dyn IssueTracker,
    interaction: &mut dyn Interaction,
    options: &ExecuteOptions,
) -> SyncReport {
    let mut report = SyncReport {
        dry_run: options.dry_run,
        ..SyncReport::default()
    };
    let mut executor = Executor {
        plan,
        store,
        tracker,
        interaction,
        options,
    };

    for item in plan.actionable() {
        let outcome = match executor.apply(item) {
            Ok(Step::Done(counter)) => {
                report.counts.bump(counter);
                Outcome::Applied
            }
            Ok(Step::Would(counter)) => {
                report.counts.bump(counter);
                Outcome::WouldApply
            }
            Ok(Step::Skipped(reason)) => {
                report.counts.skipped += 1;
                Outcome::Skipped { reason }
            }
            Ok(Step::Previewed) => Outcome::Previewed,
            Ok(Step::Abort) => {
                tracing::info!("sync aborted at {}", item.describe());
                report.aborted = true;
                break;
            }
            Err(e) => {
                tracing::warn!("{} {} failed: {e}", item.kind(), item.describe());
                report.counts.errors += 1;
                Outcome::Failed {
                    message: e.to_string(),
                }
            }
        };
        report.results.push(ItemResult {
            action: item.kind(),
            target: item.describe(),
            title: item.title().to_string(),
            outcome,
        });
    }

    report
}

struct Executor<'a> {
    plan: &'a SyncPlan,
    store: &'a Store,
    tracker: &'a dyn IssueTracker,
    interaction: &'a mut dyn Interaction,
    options: &'a ExecuteOptions,
}

impl Executor<'_> {
    fn apply(&mut self, item: &SyncItem) -> Result<Step, SyncError> {
        match item {
            SyncItem::CreateCfs { category, issue } => self.create_cfs(*category, issue),
            SyncItem::CreateGithub(local) => self.create_github(local),
            SyncItem::CloseRemote { document, issue } => {
                if self.options.dry_run {
                    return Ok(Step::Would(Counter::ClosedRemote));
                }
                self.tracker.close_issue(issue.number)?;
                tracing::info!("closed #{} ({document} is done)", issue.number);
                Ok(Step::Done(Counter::ClosedRemote))
            }
            SyncItem::CompleteLocal { document, issue } => {
                if self.options.dry_run {
                    return Ok(Step::Would(Counter::CompletedLocal));
                }
                let done = self.store.mark_complete(document.category, document.id)?;
                tracing::info!("completed {done} (#{} is closed)", issue.number);
                Ok(Step::Done(Counter::CompletedLocal))
            }
            SyncItem::ContentConflict(conflict) => self.resolve(conflict),
            SyncItem::NoAction { .. } => Ok(Step::Skipped("nothing to do".to_string())),
        }
    }

    fn create_cfs(&mut self, category: Option<Category>, issue: &Issue) -> Result<Step, SyncError> {
        let category = match category {
            Some(c) => c,
            None if self.options.dry_run => return Ok(Step::Previewed),
            None => {
                let candidates: Vec<Category> = self.plan.categories.iter().copied().collect();
                match self.interaction.select_category(&issue.title, &candidates) {
                    Some(c) => c,
                    None => return Ok(Step::Skipped("no category chosen".to_string())),
                }
            }
        };
        if self.plan.has_duplicates(category) {
            return Ok(Step::Skipped(format!("{category} has duplicate ids")));
        }
        if let Some(doc) = self.plan.unlinked_namesake(category, &issue.title) {
            tracing::warn!(
                "#{} matches unlinked {doc}; link them with `cfs link`",
                issue.number
            );
            return Ok(Step::Skipped(format!("matches unlinked {doc}")));
        }
        if self.options.dry_run {
            return Ok(Step::Would(Counter::CreatedLocal));
        }

        let body = canonical::document_from_issue(&issue.title, &issue.body, "");
        let text = frontmatter::set_key(&body, LINK_KEY, issue.number);
        let doc = self.store.create(category, &issue.title, &text)?;
        tracing::info!("created {doc} from #{}", issue.number);

        let label = category.label();
        self.tracker
            .ensure_label_exists(&label, &self.options.label_color)?;
        if !issue.has_label(&label) {
            self.tracker.add_labels(issue.number, &[label])?;
        }
        Ok(Step::Done(Counter::CreatedLocal))
    }

    fn create_github(&mut self, local: &LocalDocument) -> Result<Step, SyncError> {
        if self.options.dry_run {
            return Ok(Step::Would(Counter::CreatedRemote));
        }
        // Read first: once the issue exists the link must be written.
        let current = self.store.read(&local.document)?;
        let label = local.document.category.label();
        let body = canonical::remote_body_from_document(&local.content);
        self.tracker
            .ensure_label_exists(&label, &self.options.label_color)?;
        let issue = self
            .tracker
            .create_issue(&local.title, &body, &[label])?;
        tracing::info!("created #{} from {}", issue.number, local.document);

        let stamped = frontmatter::set_key(&current, LINK_KEY, issue.number);
        self.store.write(&local.document, &stamped)?;
        Ok(Step::Done(Counter::CreatedRemote))
    }

    fn resolve(&mut self, conflict: &Conflict) -> Result<Step, SyncError> {
        if self.options.dry_run {
            return Ok(Step::Skipped("dry run".to_string()));
        }
        if !self.interaction.is_interactive() {
            return Err(SyncError::NonInteractive {
                category: conflict.document.category,
                id: conflict.document.id,
                number: conflict.issue.number,
            });
        }
        let Some(resolution) = self.interaction.resolve_conflict(conflict) else {
            return Ok(Step::Abort);
        };

        match resolution {
            Resolution::Skip => Ok(Step::Skipped("skipped by user".to_string())),
            Resolution::Local => {
                let title = conflict
                    .title_differs
                    .then_some(conflict.local_title.as_str());
                let current = self.store.read(&conflict.document)?;
                let body = canonical::remote_body_from_document(&current);
                self.tracker
                    .update_issue(conflict.issue.number, title, Some(body.as_str()))?;
                tracing::info!(
                    "pushed {} to #{}",
                    conflict.document,
                    conflict.issue.number
                );
                Ok(Step::Done(Counter::Resolved))
            }
            Resolution::Remote => {
                let current = self.store.read(&conflict.document)?;
                let (mut fm, body) = frontmatter::parse(&current);
                let working_directory = sections::extract(&body).working_directory;
                let rebuilt = canonical::document_from_issue(
                    &conflict.issue.title,
                    &conflict.issue.body,
                    &working_directory,
                );
                fm.insert(LINK_KEY, conflict.issue.number);
                self.store
                    .write(&conflict.document, &frontmatter::serialize(&fm, &rebuilt))?;
                tracing::info!(
                    "rewrote {} from #{}",
                    conflict.document,
                    conflict.issue.number
                );
                Ok(Step::Done(Counter::Resolved))
            }
        }
    }
}
