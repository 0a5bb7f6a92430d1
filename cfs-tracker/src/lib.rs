//! Issue tracker abstraction for CFS.
//!
//! - [`issue`]: [`Issue`] model and the [`IssueTracker`] contract
//! - [`gh`]: [`GhClient`], the GitHub CLI implementation
//! - `memory`: `MemoryTracker` test double (feature `memory`)

pub mod error;
pub mod gh;
pub mod issue;
#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub use error::{Result, TrackerError};
pub use gh::GhClient;
pub use issue::{Issue, IssueState, IssueTracker, StateFilter};
#[cfg(any(test, feature = "memory"))]
pub use memory::MemoryTracker;
