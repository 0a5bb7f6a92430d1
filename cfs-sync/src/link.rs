//! Manual link management between documents and issues.

use cfs_core::{frontmatter, Category, DocumentId, DocumentRef, Store, LINK_KEY};
use cfs_tracker::IssueTracker;

use crate::error::SyncError;

/// Stamp `github_issue: <number>` onto a document after checking the issue
/// exists and no other document in `category` already claims it.
pub fn link(
    store: &Store,
    tracker: &dyn IssueTracker,
    category: Category,
    id: DocumentId,
    number: u64,
) -> Result<DocumentRef, SyncError> {
    let doc = store.find_by_id(category, id)?;
    if let Some(other) = linked_document(store, category, number)? {
        if other.id != id {
            return Err(SyncError::AlreadyLinked {
                number,
                category: other.category,
                id: other.id,
            });
        }
    }
    tracker.get_issue(number)?;

    let text = store.read(&doc)?;
    let stamped = frontmatter::set_key(&text, LINK_KEY, number);
    store.write(&doc, &stamped)?;
    tracing::info!("linked {doc} to #{number}");
    Ok(doc)
}

/// Remove the link key. Returns the issue number that was linked, if any.
pub fn unlink(store: &Store, category: Category, id: DocumentId) -> Result<Option<u64>, SyncError> {
    let doc = store.find_by_id(category, id)?;
    let text = store.read(&doc)?;
    let previous = frontmatter::parse(&text).0.github_issue();
    if previous.is_none() {
        return Ok(None);
    }
    let stripped = frontmatter::remove_key(&text, LINK_KEY);
    store.write(&doc, &stripped)?;
    tracing::info!("unlinked {doc}");
    Ok(previous)
}

/// The document in `category` linked to `number`, if any.
pub fn linked_document(
    store: &Store,
    category: Category,
    number: u64,
) -> Result<Option<DocumentRef>, SyncError> {
    for entry in store.list(category)? {
        let doc = entry.to_ref();
        let text = store.read(&doc)?;
        if frontmatter::parse(&text).0.github_issue() == Some(number) {
            return Ok(Some(doc));
        }
    }
    Ok(None)
}
