//! `cfs init`

use anyhow::{Context, Result};
use clap::Args;

use cfs_core::{config::project_config_path, Category, Store};

use super::Global;

/// Create `.cfs/` under the project root.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self, global: &Global) -> Result<()> {
        let root = match &global.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("cannot read current directory")?,
        };
        let store = Store::init(root.clone())
            .with_context(|| format!("failed to initialise store at '{}'", root.display()))?;

        println!("✓ Initialised {}", store.cfs_dir().display());
        println!(
            "  {} categories; optional settings go in {}",
            Category::all().len(),
            project_config_path(store.root()).display()
        );
        Ok(())
    }
}
