//! `cfs link` / `cfs unlink`

use anyhow::{Context, Result};
use clap::Args;

use cfs_core::{Category, DocumentId};

use super::{tracker, Global};

/// Link a document to a GitHub issue.
#[derive(Args, Debug)]
pub struct LinkArgs {
    pub category: Category,
    pub id: DocumentId,
    /// Issue number.
    pub issue: u64,
}

impl LinkArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let store = global.store()?;
        let config = global.config(&store)?;
        let client = tracker(&config);
        let doc = cfs_sync::link(&store, &client, self.category, self.id, self.issue)
            .with_context(|| format!("failed to link {}/{} to #{}", self.category, self.id, self.issue))?;
        println!("✓ Linked {doc} to #{}", self.issue);
        Ok(())
    }
}

/// Remove a document's issue link.
#[derive(Args, Debug)]
pub struct UnlinkArgs {
    pub category: Category,
    pub id: DocumentId,
}

impl UnlinkArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let store = global.store()?;
        let previous = cfs_sync::unlink(&store, self.category, self.id)
            .with_context(|| format!("failed to unlink {}/{}", self.category, self.id))?;
        match previous {
            Some(n) => println!("✓ Unlinked {}/{} from #{n}", self.category, self.id),
            None => println!("{}/{} was not linked", self.category, self.id),
        }
        Ok(())
    }
}
