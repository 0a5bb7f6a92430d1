//! # cfs-sync
//!
//! Reconciliation of CFS documents with GitHub issues.
//!
//! Call [`pipeline::prepare`] to build a [`SyncPlan`] for display, or
//! [`pipeline::run`] to build and execute one. [`link`] and [`unlink`] manage
//! links by hand.

pub mod canonical;
pub mod diff;
pub mod error;
pub mod execute;
pub mod interaction;
pub mod link;
pub mod pipeline;
pub mod plan;

pub use error::SyncError;
pub use execute::{execute, ExecuteOptions, ItemResult, Outcome, SyncCounts, SyncReport};
pub use interaction::{Interaction, NonInteractive, Resolution};
pub use link::{link, unlink};
pub use plan::{build_plan, ActionKind, Conflict, LocalDocument, SyncItem, SyncPlan};
