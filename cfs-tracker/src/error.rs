//! Error types for cfs-tracker.

use thiserror::Error;

/// All errors that can arise from issue tracker calls.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The tracker CLI executable could not be spawned.
    #[error("'{program}' is not installed or not on PATH")]
    NotInstalled { program: String },

    /// The tracker CLI is installed but not logged in.
    #[error("not authenticated with GitHub; run 'gh auth login' first")]
    NotAuthenticated,

    #[error("issue #{number} not found")]
    IssueNotFound { number: u64 },

    /// The tracker rejected a call.
    #[error("{operation} failed: {stderr}")]
    Api { operation: String, stderr: String },

    /// Tracker output did not have the expected shape.
    #[error("could not parse output of {operation}: {message}")]
    Parse { operation: String, message: String },

    #[error("I/O error running {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl TrackerError {
    /// `true` for conditions that make every further call pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TrackerError::NotInstalled { .. } | TrackerError::NotAuthenticated
        )
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
