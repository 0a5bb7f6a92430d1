//! Error types for cfs-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Category, DocumentId};

/// All errors that can arise from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document with this id exists in the category.
    #[error("document {category}/{id} not found")]
    DocumentNotFound { category: Category, id: DocumentId },

    /// Category name outside the fixed set.
    #[error("invalid category '{name}'")]
    InvalidCategory { name: String },

    /// Document id that is not a positive integer.
    #[error("invalid document id '{value}'")]
    InvalidId { value: String },

    /// Creation target already exists; the store never overwrites.
    #[error("document already exists at {path}")]
    AlreadyExists { path: PathBuf },

    /// No `.cfs/` directory at or above the starting path.
    #[error("no .cfs directory found at or above {path}; run `cfs init` first")]
    NotInitialized { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A frontmatter block that [`crate::frontmatter::try_parse`] rejects.
///
/// [`crate::frontmatter::parse`] and the mutators treat such a block as body
/// text instead of failing.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("malformed frontmatter: {reason}")]
    Malformed { reason: String },
}

/// Errors loading `config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
