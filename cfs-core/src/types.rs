//! Domain types for the CFS document store.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Prefix of tracker labels that route an issue into a category.
pub const CATEGORY_LABEL_PREFIX: &str = "cfs:";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Numeric document identifier, unique within a category.
///
/// Id `0` is never issued; it marks files whose names do not follow the
/// `<id>-<slug>.md` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub u32);

impl DocumentId {
    pub const UNASSIGNED: DocumentId = DocumentId(0);
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for DocumentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl FromStr for DocumentId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u32>() {
            Ok(0) | Err(_) => Err(StoreError::InvalidId {
                value: s.to_string(),
            }),
            Ok(v) => Ok(Self(v)),
        }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Closed set of document categories; each is a directory under `.cfs/`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Rules,
    Docs,
    Features,
    Research,
    Fixes,
    Progress,
    Qa,
    Tmp,
    Issues,
    Plans,
    Security,
    Ideas,
}

impl Category {
    /// Every category, in directory listing order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Rules,
            Category::Docs,
            Category::Features,
            Category::Research,
            Category::Fixes,
            Category::Progress,
            Category::Qa,
            Category::Tmp,
            Category::Issues,
            Category::Plans,
            Category::Security,
            Category::Ideas,
        ]
    }

    /// Categories left out of reconciliation unless explicitly included.
    pub fn default_excluded() -> &'static [Category] {
        &[
            Category::Rules,
            Category::Docs,
            Category::Research,
            Category::Progress,
            Category::Qa,
            Category::Tmp,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Rules => "rules",
            Category::Docs => "docs",
            Category::Features => "features",
            Category::Research => "research",
            Category::Fixes => "fixes",
            Category::Progress => "progress",
            Category::Qa => "qa",
            Category::Tmp => "tmp",
            Category::Issues => "issues",
            Category::Plans => "plans",
            Category::Security => "security",
            Category::Ideas => "ideas",
        }
    }

    /// Tracker label routing issues into this category, e.g. `cfs:features`.
    pub fn label(&self) -> String {
        format!("{CATEGORY_LABEL_PREFIX}{}", self.as_str())
    }

    /// Inverse of [`Category::label`]. Returns `None` for foreign labels.
    pub fn from_label(label: &str) -> Option<Category> {
        label
            .trim()
            .strip_prefix(CATEGORY_LABEL_PREFIX)
            .and_then(|name| name.parse().ok())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Category::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| StoreError::InvalidCategory {
                name: s.to_string(),
            })
    }
}

/// Categories taking part in reconciliation:
/// `ALL − ((default_excluded − include) ∪ exclude)`.
pub fn sync_categories(
    include: &BTreeSet<Category>,
    exclude: &BTreeSet<Category>,
) -> BTreeSet<Category> {
    let excluded: BTreeSet<Category> = Category::default_excluded()
        .iter()
        .copied()
        .filter(|c| !include.contains(c))
        .chain(exclude.iter().copied())
        .collect();
    Category::all()
        .iter()
        .copied()
        .filter(|c| !excluded.contains(c))
        .collect()
}

// ---------------------------------------------------------------------------
// Document references
// ---------------------------------------------------------------------------

/// Completion flag embedded in a filename right after the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionMarker {
    Done,
    Closed,
}

impl CompletionMarker {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionMarker::Done => "DONE",
            CompletionMarker::Closed => "CLOSED",
        }
    }
}

/// Handle to one document file in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub category: Category,
    pub id: DocumentId,
    pub path: PathBuf,
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.id)
    }
}

/// One row of a category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub category: Category,
    pub id: DocumentId,
    /// Title derived from the filename slug (`fix-login-bug` → `Fix login bug`).
    pub title: String,
    /// Slug portion of the filename, without id or completion marker.
    pub slug: String,
    pub path: PathBuf,
    pub completion: Option<CompletionMarker>,
    /// `true` iff the filename matched `<id>-<slug>.md`.
    pub conforms_to_naming: bool,
}

impl DocumentEntry {
    pub fn is_done(&self) -> bool {
        self.completion.is_some()
    }

    pub fn to_ref(&self) -> DocumentRef {
        DocumentRef {
            category: self.category,
            id: self.id,
            path: self.path.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Title helpers
// ---------------------------------------------------------------------------

/// Filename slug for a title: lowercase ASCII alphanumerics joined by `-`.
pub fn kebab_case(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        "untitled".to_string()
    } else {
        out
    }
}

/// Readable title from a slug: `fix-login-bug` → `Fix login bug`.
pub fn humanize_slug(slug: &str) -> String {
    let words = slug.replace(['-', '_'], " ");
    let mut chars = words.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[Category]) -> BTreeSet<Category> {
        items.iter().copied().collect()
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!("Features".parse::<Category>().unwrap(), Category::Features);
        assert!(matches!(
            "nope".parse::<Category>(),
            Err(StoreError::InvalidCategory { .. })
        ));
    }

    #[test]
    fn category_label_roundtrip() {
        for c in Category::all() {
            assert_eq!(Category::from_label(&c.label()), Some(*c));
        }
        assert_eq!(Category::from_label("bug"), None);
        assert_eq!(Category::from_label("cfs:unknown"), None);
    }

    #[test]
    fn default_partition_drops_default_excluded() {
        let synced = sync_categories(&BTreeSet::new(), &BTreeSet::new());
        assert!(synced.contains(&Category::Features));
        assert!(!synced.contains(&Category::Docs));
        assert!(!synced.contains(&Category::Tmp));
    }

    #[test]
    fn include_reinstates_and_exclude_wins() {
        let synced = sync_categories(
            &set(&[Category::Docs, Category::Qa]),
            &set(&[Category::Qa, Category::Fixes]),
        );
        assert!(synced.contains(&Category::Docs));
        assert!(!synced.contains(&Category::Qa));
        assert!(!synced.contains(&Category::Fixes));
    }

    #[test]
    fn default_partition_keeps_tracked_work() {
        let synced = sync_categories(&BTreeSet::new(), &BTreeSet::new());
        assert_eq!(synced.len(), Category::all().len() - Category::default_excluded().len());
        for c in Category::default_excluded() {
            assert!(!synced.contains(c));
        }
    }

    #[test]
    fn kebab_case_collapses_punctuation() {
        assert_eq!(kebab_case("Test Feature"), "test-feature");
        assert_eq!(kebab_case("  Fix: login -- bug! "), "fix-login-bug");
        assert_eq!(kebab_case("???"), "untitled");
    }

    #[test]
    fn humanize_slug_capitalises_first_word() {
        assert_eq!(humanize_slug("fix-login-bug"), "Fix login bug");
        assert_eq!(humanize_slug(""), "");
    }

    #[test]
    fn document_id_rejects_zero_and_garbage() {
        assert_eq!("7".parse::<DocumentId>().unwrap(), DocumentId(7));
        assert!("0".parse::<DocumentId>().is_err());
        assert!("x1".parse::<DocumentId>().is_err());
    }
}
