//! Configuration management for branch-sweeper
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (BRANCH_SWEEPER_*)
//! 3. Config file (~/.config/branch-sweeper/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::git::RemoteTarget;
use crate::sweep::SweepRequest;
use crate::{Error, Result};

/// Defaults for which branches a sweep looks at
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Directory to scan for git repositories
    pub path: PathBuf,

    /// Minimum days since last commit to mark a branch stale
    pub days: i64,

    /// Base branch name to check merges against
    pub base: String,

    /// Only consider branches already merged into the base branch
    pub merged: bool,

    /// Glob a branch must match to be considered
    pub include: Option<String>,

    /// Glob that excludes a branch from consideration
    pub exclude: Option<String>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            days: 30,
            base: "main".to_string(),
            merged: false,
            include: None,
            exclude: None,
        }
    }
}

/// Remote used when pruning with `--remote`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Name of the git remote
    pub name: String,

    /// User presented to the ssh-agent when the remote URL has none
    pub ssh_user: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            name: "origin".to_string(),
            ssh_user: "git".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub sweep: SweepConfig,
    pub remote: RemoteConfig,
}

/// Values given on the command line; `None` leaves the lower layers alone
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub path: Option<PathBuf>,
    pub days: Option<i64>,
    pub base: Option<String>,
    pub merged: Option<bool>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub remote_name: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/branch-sweeper/config.toml` on Linux
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("branch-sweeper").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - BRANCH_SWEEPER_PATH: Directory to scan
    /// - BRANCH_SWEEPER_DAYS: Stale threshold in days
    /// - BRANCH_SWEEPER_BASE: Base branch name
    /// - BRANCH_SWEEPER_REMOTE: Remote name
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = var("BRANCH_SWEEPER_PATH") {
            self.sweep.path = PathBuf::from(path);
        }

        if let Some(days) = var("BRANCH_SWEEPER_DAYS") {
            self.sweep.days = days.trim().parse().map_err(|_| {
                Error::Config(format!("BRANCH_SWEEPER_DAYS is not a number: {}", days))
            })?;
        }

        if let Some(base) = var("BRANCH_SWEEPER_BASE") {
            self.sweep.base = base;
        }

        if let Some(remote) = var("BRANCH_SWEEPER_REMOTE") {
            self.remote.name = remote;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(path) = overrides.path {
            self.sweep.path = path;
        }

        if let Some(days) = overrides.days {
            self.sweep.days = days;
        }

        if let Some(base) = overrides.base {
            self.sweep.base = base;
        }

        if let Some(merged) = overrides.merged {
            self.sweep.merged = merged;
        }

        if overrides.include.is_some() {
            self.sweep.include = overrides.include;
        }

        if overrides.exclude.is_some() {
            self.sweep.exclude = overrides.exclude;
        }

        if let Some(name) = overrides.remote_name {
            self.remote.name = name;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(overrides: Overrides) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(overrides))
    }

    /// Build the request for a list (`prune == false`) or prune sweep
    pub fn request(&self, prune: bool, delete_remote: bool) -> SweepRequest {
        let remote = (prune && delete_remote).then(|| RemoteTarget {
            name: self.remote.name.clone(),
            ssh_user: self.remote.ssh_user.clone(),
        });

        SweepRequest {
            root: self.sweep.path.clone(),
            stale_days: self.sweep.days,
            base_branch: self.sweep.base.clone(),
            merged_only: self.sweep.merged,
            prune,
            remote,
            include: self.sweep.include.clone(),
            exclude: self.sweep.exclude.clone(),
        }
    }
}
