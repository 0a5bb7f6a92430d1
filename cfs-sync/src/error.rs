//! Error types for cfs-sync.

use thiserror::Error;

use cfs_core::{Category, DocumentId, StoreError};
use cfs_tracker::TrackerError;

/// All errors that can arise from reconciliation and link operations.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// A content conflict reached execution without a terminal to ask.
    #[error("conflict on {category}/{id} ↔ #{number} needs an interactive terminal")]
    NonInteractive {
        category: Category,
        id: DocumentId,
        number: u64,
    },

    /// The issue is already linked to a different document.
    #[error("issue #{number} is already linked to {category}/{id}")]
    AlreadyLinked {
        number: u64,
        category: Category,
        id: DocumentId,
    },
}

impl SyncError {
    /// `true` when no further tracker call can succeed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Tracker(e) if e.is_fatal())
    }
}
