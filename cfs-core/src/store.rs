//! Folder-based document store.
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   .cfs/
//!     config.yaml               (optional)
//!     features/
//!       1-login-page.md
//!       2-DONE-signup-flow.md   (completion marker after the id)
//!     fixes/
//!       ...
//! ```
//!
//! Ids are per category: `next_id` is the highest existing id plus one. The
//! store holds no lock; it assumes a single writer process.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{io_err, StoreError};
use crate::types::{
    humanize_slug, kebab_case, Category, CompletionMarker, DocumentEntry, DocumentId, DocumentRef,
};

/// Name of the store directory under the project root.
pub const CFS_DIR: &str = ".cfs";

/// Handle to a document store rooted at a project directory.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    // -----------------------------------------------------------------------
    // 1. Opening
    // -----------------------------------------------------------------------

    /// Open the store at `root`. Fails with `NotInitialized` if `root/.cfs`
    /// does not exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let dir = root.join(CFS_DIR);
        if !dir.is_dir() {
            return Err(StoreError::NotInitialized { path: root });
        }
        Ok(Self { root })
    }

    /// Create `.cfs/` and every category directory. Idempotent.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let store = Self { root };
        for category in Category::all() {
            let dir = store.category_dir(*category);
            std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        }
        Ok(store)
    }

    /// Walk up from `start` to the nearest directory containing `.cfs/`.
    pub fn discover(start: &Path) -> Result<Self, StoreError> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            if current.join(CFS_DIR).is_dir() {
                return Ok(Self {
                    root: current.to_path_buf(),
                });
            }
            dir = current.parent();
        }
        Err(StoreError::NotInitialized {
            path: start.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/.cfs`
    pub fn cfs_dir(&self) -> PathBuf {
        self.root.join(CFS_DIR)
    }

    /// `<root>/.cfs/<category>`. No I/O.
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.cfs_dir().join(category.as_str())
    }

    // -----------------------------------------------------------------------
    // 2. Listing and lookup
    // -----------------------------------------------------------------------

    /// All markdown documents in `category`, sorted by id then filename.
    ///
    /// A missing category directory lists as empty.
    pub fn list(&self, category: Category) -> Result<Vec<DocumentEntry>, StoreError> {
        let dir = self.category_dir(category);
        let read_dir = match std::fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(io_err(&dir, err)),
        };

        let mut entries = Vec::new();
        for item in read_dir {
            let item = item.map_err(|e| io_err(&dir, e))?;
            let path = item.path();
            if !path.is_file() {
                continue;
            }
            let file_name = item.file_name().to_string_lossy().into_owned();
            if file_name.starts_with('.') || !file_name.ends_with(".md") {
                continue;
            }
            entries.push(entry_from_filename(category, path, &file_name));
        }
        entries.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.path.cmp(&b.path)));
        Ok(entries)
    }

    /// The entry with `id` in `category`, if any. Id 0 never matches.
    pub fn get(
        &self,
        category: Category,
        id: DocumentId,
    ) -> Result<Option<DocumentEntry>, StoreError> {
        if id == DocumentId::UNASSIGNED {
            return Ok(None);
        }
        Ok(self
            .list(category)?
            .into_iter()
            .find(|e| e.conforms_to_naming && e.id == id))
    }

    /// Like [`Store::get`] but a missing document is an error.
    pub fn find_by_id(
        &self,
        category: Category,
        id: DocumentId,
    ) -> Result<DocumentRef, StoreError> {
        self.get(category, id)?
            .map(|e| e.to_ref())
            .ok_or(StoreError::DocumentNotFound { category, id })
    }

    /// Highest id in `category` plus one, or 1 for an empty category.
    pub fn next_id(&self, category: Category) -> Result<DocumentId, StoreError> {
        let max = self
            .list(category)?
            .iter()
            .filter(|e| e.conforms_to_naming)
            .map(|e| e.id.0)
            .max()
            .unwrap_or(0);
        max.checked_add(1)
            .map(DocumentId)
            .ok_or_else(|| StoreError::InvalidId {
                value: (u64::from(max) + 1).to_string(),
            })
    }

    /// Human-readable descriptions of id or title collisions in `category`.
    ///
    /// Empty when the category is healthy.
    pub fn detect_duplicates(&self, category: Category) -> Result<Vec<String>, StoreError> {
        let entries = self.list(category)?;
        let mut by_id: BTreeMap<DocumentId, Vec<String>> = BTreeMap::new();
        let mut by_slug: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in entries.iter().filter(|e| e.conforms_to_naming) {
            let name = file_name(&entry.path);
            by_id.entry(entry.id).or_default().push(name.clone());
            by_slug.entry(entry.slug.clone()).or_default().push(name);
        }

        let mut issues = Vec::new();
        for (id, names) in by_id.into_iter().filter(|(_, n)| n.len() > 1) {
            issues.push(format!(
                "duplicate id {id} in {category}: {}",
                names.join(", ")
            ));
        }
        for (slug, names) in by_slug.into_iter().filter(|(_, n)| n.len() > 1) {
            issues.push(format!(
                "duplicate title '{slug}' in {category}: {}",
                names.join(", ")
            ));
        }
        Ok(issues)
    }

    // -----------------------------------------------------------------------
    // 3. Content
    // -----------------------------------------------------------------------

    pub fn read(&self, doc: &DocumentRef) -> Result<String, StoreError> {
        std::fs::read_to_string(&doc.path).map_err(|e| io_err(&doc.path, e))
    }

    /// Atomically replace the document's content.
    ///
    /// Write flow: `<name>.tmp` sibling → `rename`.
    pub fn write(&self, doc: &DocumentRef, text: &str) -> Result<(), StoreError> {
        let tmp = doc
            .path
            .with_file_name(format!("{}.tmp", file_name(&doc.path)));
        std::fs::write(&tmp, text).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &doc.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&doc.path, e));
        }
        Ok(())
    }

    pub fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        std::fs::remove_file(&doc.path).map_err(|e| io_err(&doc.path, e))
    }

    /// Last modification time of the document file.
    pub fn modified(&self, doc: &DocumentRef) -> Result<DateTime<Utc>, StoreError> {
        let meta = std::fs::metadata(&doc.path).map_err(|e| io_err(&doc.path, e))?;
        let mtime = meta.modified().map_err(|e| io_err(&doc.path, e))?;
        Ok(DateTime::<Utc>::from(mtime))
    }

    // -----------------------------------------------------------------------
    // 4. Mutation
    // -----------------------------------------------------------------------

    /// Create `<next_id>-<kebab title>.md` in `category`.
    ///
    /// Never overwrites: an existing target surfaces as `AlreadyExists`.
    pub fn create(
        &self,
        category: Category,
        title: &str,
        content: &str,
    ) -> Result<DocumentRef, StoreError> {
        let dir = self.category_dir(category);
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;

        let id = self.next_id(category)?;
        let path = dir.join(format!("{id}-{}.md", kebab_case(title)));
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists { path })
            }
            Err(err) => return Err(io_err(&path, err)),
        };
        file.write_all(content.as_bytes())
            .map_err(|e| io_err(&path, e))?;

        Ok(DocumentRef { category, id, path })
    }

    /// Rename `<id>-<slug>.md` to `<id>-DONE-<slug>.md`.
    ///
    /// Already-complete documents are returned unchanged.
    pub fn mark_complete(
        &self,
        category: Category,
        id: DocumentId,
    ) -> Result<DocumentRef, StoreError> {
        let entry = self
            .get(category, id)?
            .ok_or(StoreError::DocumentNotFound { category, id })?;
        if entry.is_done() {
            return Ok(entry.to_ref());
        }

        let target = self.category_dir(category).join(format!(
            "{id}-{}-{}.md",
            CompletionMarker::Done.as_str(),
            entry.slug
        ));
        if target.exists() {
            return Err(StoreError::AlreadyExists { path: target });
        }
        std::fs::rename(&entry.path, &target).map_err(|e| io_err(&entry.path, e))?;
        Ok(DocumentRef {
            category,
            id,
            path: target,
        })
    }
}

// ---------------------------------------------------------------------------
// Filename parsing
// ---------------------------------------------------------------------------

/// Split `<id>-[DONE-|CLOSED-]<slug>.md` into its parts.
///
/// Returns `None` for names that do not follow the convention (including id 0).
pub fn parse_filename(name: &str) -> Option<(DocumentId, Option<CompletionMarker>, String)> {
    let stem = name.strip_suffix(".md")?;
    let (id_part, rest) = stem.split_once('-')?;
    if id_part.is_empty() || !id_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id: u32 = id_part.parse().ok()?;
    if id == 0 {
        return None;
    }

    let (marker, slug) = if let Some(slug) = rest.strip_prefix("DONE-") {
        (Some(CompletionMarker::Done), slug)
    } else if let Some(slug) = rest.strip_prefix("CLOSED-") {
        (Some(CompletionMarker::Closed), slug)
    } else {
        (None, rest)
    };
    if slug.is_empty() {
        return None;
    }
    Some((DocumentId(id), marker, slug.to_string()))
}

fn entry_from_filename(category: Category, path: PathBuf, name: &str) -> DocumentEntry {
    match parse_filename(name) {
        Some((id, completion, slug)) => DocumentEntry {
            category,
            id,
            title: humanize_slug(&slug),
            slug,
            path,
            completion,
            conforms_to_naming: true,
        },
        None => {
            let slug = name.trim_end_matches(".md").to_string();
            DocumentEntry {
                category,
                id: DocumentId::UNASSIGNED,
                title: humanize_slug(&slug),
                slug,
                path,
                completion: None,
                conforms_to_naming: false,
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
