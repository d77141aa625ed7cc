//! Sweep input record

use std::path::PathBuf;

use chrono::TimeDelta;

use super::filter::BranchFilter;
use crate::git::RemoteTarget;
use crate::{Error, Result};

/// Everything a single sweep needs to know
///
/// `prune` switches between list mode and deletion; `remote` is only used
/// when pruning.
#[derive(Debug, Clone)]
pub struct SweepRequest {
    /// Directory to scan for repositories
    pub root: PathBuf,
    /// Minimum age of a branch's last commit, in days
    pub stale_days: i64,
    /// Branch the others are compared against
    pub base_branch: String,
    /// Only report branches whose tip is reachable from the base branch
    pub merged_only: bool,
    /// Delete matching branches instead of listing them
    pub prune: bool,
    /// Also delete pruned branches on this remote
    pub remote: Option<RemoteTarget>,
    /// Only branches matching this glob are considered
    pub include: Option<String>,
    /// Branches matching this glob are never considered
    pub exclude: Option<String>,
}

impl Default for SweepRequest {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            stale_days: 30,
            base_branch: "main".to_string(),
            merged_only: false,
            prune: false,
            remote: None,
            include: None,
            exclude: None,
        }
    }
}

impl SweepRequest {
    /// Configuration-time checks; nothing here touches the filesystem
    pub fn validate(&self) -> Result<BranchFilter> {
        if self.stale_days < 0 {
            return Err(Error::InvalidThreshold(self.stale_days));
        }

        if TimeDelta::try_days(self.stale_days).is_none() {
            return Err(Error::Config(format!(
                "Stale days {} is out of range",
                self.stale_days
            )));
        }

        if self.base_branch.trim().is_empty() {
            return Err(Error::Config("Base branch name must not be empty".to_string()));
        }

        if let Some(remote) = &self.remote {
            if remote.name.trim().is_empty() {
                return Err(Error::Config("Remote name must not be empty".to_string()));
            }
        }

        BranchFilter::new(
            &self.base_branch,
            self.include.as_deref(),
            self.exclude.as_deref(),
        )
    }

    pub fn threshold(&self) -> TimeDelta {
        TimeDelta::try_days(self.stale_days.max(0)).unwrap_or(TimeDelta::MAX)
    }

    /// Remote to delete from, if this sweep prunes remotely
    pub fn remote_target(&self) -> Option<&RemoteTarget> {
        if self.prune {
            self.remote.as_ref()
        } else {
            None
        }
    }
}
