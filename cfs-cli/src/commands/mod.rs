//! Subcommand implementations and the helpers they share.

pub mod create;
pub mod docs;
pub mod init;
pub mod link;
pub mod status;
pub mod sync;

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use cfs_core::{Category, Config, Store};
use cfs_tracker::GhClient;

/// Flags accepted by every subcommand.
#[derive(Debug, Clone)]
pub struct Global {
    pub root: Option<PathBuf>,
}

impl Global {
    /// Open the store at `--root`, or the nearest one above the working
    /// directory.
    pub fn store(&self) -> Result<Store> {
        match &self.root {
            Some(root) => Store::open(root.clone())
                .with_context(|| format!("cannot open store at '{}'", root.display())),
            None => {
                let cwd = std::env::current_dir().context("cannot read current directory")?;
                Store::discover(&cwd).context("cannot locate a cfs store")
            }
        }
    }

    pub fn config(&self, store: &Store) -> Result<Config> {
        Config::load(store.root()).context("failed to load cfs configuration")
    }
}

/// GitHub CLI client built from `github:` settings.
pub fn tracker(config: &Config) -> GhClient {
    GhClient::new(config.github.program.clone(), config.github.repo.clone())
}

/// `--include` / `--exclude` overrides shared by `status` and `sync`.
#[derive(Args, Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Sync a default-excluded category anyway (repeatable).
    #[arg(long, value_name = "CATEGORY")]
    pub include: Vec<Category>,

    /// Leave a category out of sync (repeatable).
    #[arg(long, value_name = "CATEGORY")]
    pub exclude: Vec<Category>,
}

impl CategoryFilter {
    pub fn categories(&self, config: &Config) -> BTreeSet<Category> {
        let include: BTreeSet<Category> = self.include.iter().copied().collect();
        let exclude: BTreeSet<Category> = self.exclude.iter().copied().collect();
        config.sync_categories(&include, &exclude)
    }
}
