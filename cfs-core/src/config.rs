//! Configuration file support.
//!
//! Lookup order, first hit wins:
//! 1. `<root>/.cfs/config.yaml`
//! 2. `<dirs::config_dir()>/cfs/config.yaml`
//! 3. built-in defaults
//!
//! As with the store, every loader has an explicit `_at` form for tests.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::CFS_DIR;
use crate::types::{sync_categories, Category};

const CONFIG_FILE: &str = "config.yaml";

/// Root of `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub github: GithubConfig,
}

/// Category overrides for reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Default-excluded categories to sync anyway.
    #[serde(default)]
    pub include: BTreeSet<Category>,

    /// Additional categories to leave out.
    #[serde(default)]
    pub exclude: BTreeSet<Category>,
}

/// Issue tracker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubConfig {
    /// `owner/repo`; when unset the GitHub CLI infers it from the git remote.
    #[serde(default)]
    pub repo: Option<String>,

    /// GitHub CLI executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// Colour for auto-created `cfs:<category>` labels (hex, no `#`).
    #[serde(default = "default_label_color")]
    pub label_color: String,

    /// Maximum number of issues fetched per reconciliation pass.
    #[serde(default = "default_issue_limit")]
    pub issue_limit: usize,
}

fn default_program() -> String {
    "gh".to_string()
}

fn default_label_color() -> String {
    "0e8a16".to_string()
}

fn default_issue_limit() -> usize {
    500
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            repo: None,
            program: default_program(),
            label_color: default_label_color(),
            issue_limit: default_issue_limit(),
        }
    }
}

impl Config {
    /// Load for a store rooted at `root`, falling back to the user config dir.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let user_dir = dirs::config_dir().map(|d| d.join("cfs"));
        Self::load_at(root, user_dir.as_deref())
    }

    /// Explicit form of [`Config::load`].
    pub fn load_at(root: &Path, user_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let project = project_config_path(root);
        if project.is_file() {
            return Self::from_file(&project);
        }
        if let Some(dir) = user_dir {
            let user = dir.join(CONFIG_FILE);
            if user.is_file() {
                return Self::from_file(&user);
            }
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Categories to reconcile, with extra overrides unioned onto the config's.
    pub fn sync_categories(
        &self,
        include: &BTreeSet<Category>,
        exclude: &BTreeSet<Category>,
    ) -> BTreeSet<Category> {
        let include: BTreeSet<Category> = self.sync.include.union(include).copied().collect();
        let exclude: BTreeSet<Category> = self.sync.exclude.union(exclude).copied().collect();
        sync_categories(&include, &exclude)
    }
}

/// `<root>/.cfs/config.yaml`. No I/O.
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(CFS_DIR).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_file() {
        let root = TempDir::new().unwrap();
        let cfg = Config::load_at(root.path(), None).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.github.program, "gh");
        assert_eq!(cfg.github.issue_limit, 500);
    }

    #[test]
    fn parses_partial_config() {
        let yaml = "sync:\n  include: [docs]\ngithub:\n  repo: acme/widgets\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.sync.include.contains(&Category::Docs));
        assert!(cfg.sync.exclude.is_empty());
        assert_eq!(cfg.github.repo.as_deref(), Some("acme/widgets"));
        assert_eq!(cfg.github.label_color, "0e8a16");
    }

    #[test]
    fn project_config_wins_over_user_config() {
        let root = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join(CFS_DIR)).unwrap();
        std::fs::write(
            project_config_path(root.path()),
            "github:\n  issue_limit: 10\n",
        )
        .unwrap();
        std::fs::write(user.path().join(CONFIG_FILE), "github:\n  issue_limit: 99\n").unwrap();
        let cfg = Config::load_at(root.path(), Some(user.path())).unwrap();
        assert_eq!(cfg.github.issue_limit, 10);
    }

    #[test]
    fn user_config_used_as_fallback() {
        let root = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        std::fs::write(user.path().join(CONFIG_FILE), "sync:\n  exclude: [ideas]\n").unwrap();
        let cfg = Config::load_at(root.path(), Some(user.path())).unwrap();
        assert!(cfg.sync.exclude.contains(&Category::Ideas));
    }

    #[test]
    fn unknown_category_is_a_parse_error_with_path() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join(CFS_DIR)).unwrap();
        std::fs::write(project_config_path(root.path()), "sync:\n  include: [bogus]\n").unwrap();
        let err = Config::load_at(root.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn overrides_union_with_config() {
        let mut cfg = Config::default();
        cfg.sync.include.insert(Category::Docs);
        let extra_exclude: BTreeSet<Category> = [Category::Features].into_iter().collect();
        let synced = cfg.sync_categories(&BTreeSet::new(), &extra_exclude);
        assert!(synced.contains(&Category::Docs));
        assert!(!synced.contains(&Category::Features));
    }
}
