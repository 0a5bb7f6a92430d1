//! Sync plan construction.
//!
//! ## Build order
//!
//! 1. Flag categories with duplicate ids or titles.
//! 2. Scan every document; collect `github_issue` links (first claim wins).
//! 3. Classify each linked pair whose issue was fetched.
//! 4. Unlinked, unfinished documents → `CreateGithub`.
//! 5. Unlinked open issues → `CreateCfs`, unless gated.
//!
//! Items come out bucketed in that order: linked pairs by issue number,
//! unlinked documents by category then id, unlinked issues in input order.
//! Nothing here mutates the store or the tracker.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

use cfs_core::{frontmatter, sections, Category, DocumentEntry, DocumentRef, Store};
use cfs_tracker::Issue;

use crate::canonical;

// ---------------------------------------------------------------------------
// Plan items
// ---------------------------------------------------------------------------

/// Action tag of a [`SyncItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    CreateCfs,
    CreateGithub,
    CloseRemote,
    CompleteLocal,
    ContentConflict,
    NoAction,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CreateCfs => "CREATE_CFS",
            ActionKind::CreateGithub => "CREATE_GITHUB",
            ActionKind::CloseRemote => "CLOSE_REMOTE",
            ActionKind::CompleteLocal => "COMPLETE_LOCAL",
            ActionKind::ContentConflict => "CONTENT_CONFLICT",
            ActionKind::NoAction => "NO_ACTION",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A local document scheduled for issue creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDocument {
    pub document: DocumentRef,
    pub title: String,
    /// Raw file text at plan time.
    pub content: String,
}

/// Both sides of a diverged linked pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub document: DocumentRef,
    pub issue: Issue,
    pub local_title: String,
    pub local_body: String,
    pub remote_body: String,
    pub title_differs: bool,
    pub body_differs: bool,
}

/// One classified pairing. NoAction items are never executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncItem {
    /// Create a document from an open issue. `category` is `None` when the
    /// issue carries no `cfs:` label and must be chosen at execution time.
    CreateCfs {
        category: Option<Category>,
        issue: Issue,
    },
    CreateGithub(LocalDocument),
    CloseRemote {
        document: DocumentRef,
        issue: Issue,
    },
    CompleteLocal {
        document: DocumentRef,
        issue: Issue,
    },
    ContentConflict(Box<Conflict>),
    NoAction {
        document: DocumentRef,
        number: u64,
    },
}

impl SyncItem {
    pub fn kind(&self) -> ActionKind {
        match self {
            SyncItem::CreateCfs { .. } => ActionKind::CreateCfs,
            SyncItem::CreateGithub(_) => ActionKind::CreateGithub,
            SyncItem::CloseRemote { .. } => ActionKind::CloseRemote,
            SyncItem::CompleteLocal { .. } => ActionKind::CompleteLocal,
            SyncItem::ContentConflict(_) => ActionKind::ContentConflict,
            SyncItem::NoAction { .. } => ActionKind::NoAction,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.kind() != ActionKind::NoAction
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            SyncItem::CreateCfs { category, .. } => *category,
            SyncItem::CreateGithub(local) => Some(local.document.category),
            SyncItem::CloseRemote { document, .. }
            | SyncItem::CompleteLocal { document, .. }
            | SyncItem::NoAction { document, .. } => Some(document.category),
            SyncItem::ContentConflict(c) => Some(c.document.category),
        }
    }

    pub fn document(&self) -> Option<&DocumentRef> {
        match self {
            SyncItem::CreateCfs { .. } => None,
            SyncItem::CreateGithub(local) => Some(&local.document),
            SyncItem::CloseRemote { document, .. }
            | SyncItem::CompleteLocal { document, .. }
            | SyncItem::NoAction { document, .. } => Some(document),
            SyncItem::ContentConflict(c) => Some(&c.document),
        }
    }

    pub fn issue_number(&self) -> Option<u64> {
        match self {
            SyncItem::CreateGithub(_) => None,
            SyncItem::CreateCfs { issue, .. }
            | SyncItem::CloseRemote { issue, .. }
            | SyncItem::CompleteLocal { issue, .. } => Some(issue.number),
            SyncItem::ContentConflict(c) => Some(c.issue.number),
            SyncItem::NoAction { number, .. } => Some(*number),
        }
    }

    /// Human-facing title of the item.
    pub fn title(&self) -> &str {
        match self {
            SyncItem::CreateCfs { issue, .. }
            | SyncItem::CloseRemote { issue, .. }
            | SyncItem::CompleteLocal { issue, .. } => &issue.title,
            SyncItem::CreateGithub(local) => &local.title,
            SyncItem::ContentConflict(c) => &c.issue.title,
            SyncItem::NoAction { .. } => "",
        }
    }

    /// `features/3 ↔ #12` style label.
    pub fn describe(&self) -> String {
        match (self.document(), self.issue_number()) {
            (Some(doc), Some(n)) => format!("{doc} ↔ #{n}"),
            (Some(doc), None) => format!("{doc} → new issue"),
            (None, Some(n)) => match self.category() {
                Some(cat) => format!("#{n} → new {cat} document"),
                None => format!("#{n} → new document"),
            },
            (None, None) => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Classified actions plus summary counters. Rebuilt on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub items: Vec<SyncItem>,
    pub linked_count: usize,
    pub unlinked_cfs_count: usize,
    pub unlinked_github_count: usize,
    /// Categories with duplicate ids or titles, with the store's descriptions.
    pub duplicate_categories: BTreeMap<Category, Vec<String>>,
    pub categories: BTreeSet<Category>,
    /// Unlinked documents at plan time by category and slug, first id wins.
    pub unlinked_slugs: BTreeMap<(Category, String), DocumentRef>,
}

impl SyncPlan {
    pub fn actionable(&self) -> impl Iterator<Item = &SyncItem> {
        self.items.iter().filter(|i| i.is_actionable())
    }

    pub fn actionable_count(&self) -> usize {
        self.actionable().count()
    }

    pub fn count(&self, kind: ActionKind) -> usize {
        self.items.iter().filter(|i| i.kind() == kind).count()
    }

    pub fn has_duplicates(&self, category: Category) -> bool {
        self.duplicate_categories.contains_key(&category)
    }

    /// Unlinked document in `category` whose slug matches `title`.
    pub fn unlinked_namesake(&self, category: Category, title: &str) -> Option<&DocumentRef> {
        self.unlinked_slugs
            .get(&(category, cfs_core::kebab_case(title)))
    }
}

struct Scanned {
    entry: DocumentEntry,
    text: String,
    link: Option<u64>,
}

/// Classify every document in `categories` against `issues`.
///
/// Unreadable categories and documents are logged and left out; plan
/// construction itself never fails.
pub fn build_plan(store: &Store, issues: &[Issue], categories: &BTreeSet<Category>) -> SyncPlan {
    let mut plan = SyncPlan {
        categories: categories.clone(),
        ..SyncPlan::default()
    };

    // Step 1: duplicate gate.
    for &category in categories {
        match store.detect_duplicates(category) {
            Ok(found) if !found.is_empty() => {
                for msg in &found {
                    tracing::warn!("{msg}");
                }
                plan.duplicate_categories.insert(category, found);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("skipping duplicate check for {category}: {e}"),
        }
    }

    // Step 2: scan and collect links.
    let docs = scan(store, categories);
    let mut linked: BTreeMap<u64, usize> = BTreeMap::new();
    let mut shadowed: BTreeSet<usize> = BTreeSet::new();
    for (idx, doc) in docs.iter().enumerate() {
        let Some(number) = doc.link else { continue };
        if let Some(&first) = linked.get(&number) {
            tracing::warn!(
                "{} also links issue #{number}, already claimed by {}; ignoring it",
                doc.entry.to_ref(),
                docs[first].entry.to_ref()
            );
            shadowed.insert(idx);
            continue;
        }
        linked.insert(number, idx);
    }
    plan.linked_count = linked.len();
    for doc in docs.iter().filter(|d| d.link.is_none()) {
        plan.unlinked_slugs
            .entry((doc.entry.category, doc.entry.slug.clone()))
            .or_insert_with(|| doc.entry.to_ref());
    }

    // Step 3: linked pairs.
    let by_number: HashMap<u64, &Issue> = issues.iter().map(|i| (i.number, i)).collect();
    for (number, &idx) in &linked {
        let doc = &docs[idx];
        match by_number.get(number) {
            Some(issue) => plan.items.push(classify_linked(doc, issue)),
            None => tracing::debug!(
                "issue #{number} linked from {} was not fetched; ignoring pair",
                doc.entry.to_ref()
            ),
        }
    }

    // Step 4: unlinked documents.
    for (idx, doc) in docs.iter().enumerate() {
        if doc.link.is_some() || shadowed.contains(&idx) || doc.entry.is_done() {
            continue;
        }
        tracing::debug!("{} is unlinked → CREATE_GITHUB", doc.entry.to_ref());
        plan.items.push(SyncItem::CreateGithub(LocalDocument {
            document: doc.entry.to_ref(),
            title: document_title(doc),
            content: doc.text.clone(),
        }));
        plan.unlinked_cfs_count += 1;
    }

    // Step 5: unlinked open issues.
    for issue in issues {
        if linked.contains_key(&issue.number) || issue.is_closed() {
            continue;
        }
        let category = match target_category(issue, categories) {
            Target::Category(c) => Some(c),
            Target::Unlabelled => None,
            Target::Excluded => {
                tracing::debug!("#{} only targets excluded categories", issue.number);
                continue;
            }
        };
        if let Some(category) = category {
            if plan.has_duplicates(category) {
                tracing::warn!(
                    "not creating a document for #{}: {category} has duplicate ids",
                    issue.number
                );
                continue;
            }
            if let Some(doc) = plan.unlinked_namesake(category, &issue.title) {
                tracing::warn!(
                    "#{} matches unlinked {doc}; link them with `cfs link`",
                    issue.number
                );
                continue;
            }
        }
        tracing::debug!("#{} is unlinked → CREATE_CFS", issue.number);
        plan.items.push(SyncItem::CreateCfs {
            category,
            issue: issue.clone(),
        });
        plan.unlinked_github_count += 1;
    }

    plan
}

fn scan(store: &Store, categories: &BTreeSet<Category>) -> Vec<Scanned> {
    let mut docs = Vec::new();
    for &category in categories {
        let entries = match store.list(category) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("skipping category {category}: {e}");
                continue;
            }
        };
        for entry in entries {
            if !entry.conforms_to_naming {
                tracing::debug!("skipping non-conforming {}", entry.path.display());
                continue;
            }
            let text = match store.read(&entry.to_ref()) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("skipping unreadable document: {e}");
                    continue;
                }
            };
            let (fm, _) = frontmatter::parse(&text);
            docs.push(Scanned {
                link: fm.github_issue(),
                entry,
                text,
            });
        }
    }
    docs
}

/// `# Heading` when present, otherwise the filename-derived title.
fn document_title(doc: &Scanned) -> String {
    let heading = sections::extract(frontmatter::strip(&doc.text)).title;
    if heading.trim().is_empty() {
        doc.entry.title.clone()
    } else {
        heading.trim().to_string()
    }
}

fn classify_linked(doc: &Scanned, issue: &Issue) -> SyncItem {
    let document = doc.entry.to_ref();
    let local_done = doc.entry.is_done();
    let remote_closed = issue.is_closed();

    match (local_done, remote_closed) {
        (true, false) => SyncItem::CloseRemote {
            document,
            issue: issue.clone(),
        },
        (false, true) => SyncItem::CompleteLocal {
            document,
            issue: issue.clone(),
        },
        (true, true) => SyncItem::NoAction {
            document,
            number: issue.number,
        },
        (false, false) => {
            let local_title = sections::extract(frontmatter::strip(&doc.text)).title;
            let local_body = canonical::canonical_local_body(&doc.text);
            let remote_body = canonical::canonical_remote_body(&issue.body);
            let title_differs = canonical::titles_differ(&local_title, &issue.title);
            let body_differs = local_body != remote_body;
            if !title_differs && !body_differs {
                return SyncItem::NoAction {
                    document,
                    number: issue.number,
                };
            }
            tracing::debug!("{document} ↔ #{} diverged", issue.number);
            SyncItem::ContentConflict(Box::new(Conflict {
                document,
                issue: issue.clone(),
                local_title: local_title.trim().to_string(),
                local_body,
                remote_body,
                title_differs,
                body_differs,
            }))
        }
    }
}

enum Target {
    Category(Category),
    /// No `cfs:` label at all.
    Unlabelled,
    /// Only `cfs:` labels naming categories outside the sync set.
    Excluded,
}

fn target_category(issue: &Issue, categories: &BTreeSet<Category>) -> Target {
    let mut labelled = false;
    for label in &issue.labels {
        if let Some(category) = Category::from_label(label) {
            labelled = true;
            if categories.contains(&category) {
                return Target::Category(category);
            }
        }
    }
    if labelled {
        Target::Excluded
    } else {
        Target::Unlabelled
    }
}
