//! Capability interface over a repository's branches and history
//!
//! The sweep logic only talks to repositories through these traits, so the
//! git2 backend in [`GitRepo`](super::GitRepo) can be swapped for an
//! in-memory store in tests.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::Result;

/// Identity of a commit (hex object id for git2-backed stores)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<git2::Oid> for CommitId {
    fn from(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }
}

/// One local branch of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Short name, e.g. `feature-x`
    pub name: String,
    /// Commit the branch points at
    pub target: CommitId,
}

impl BranchRef {
    pub fn new(name: impl Into<String>, target: CommitId) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }
}

/// A single entry of a history walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: CommitId,
    /// Author timestamp
    pub time: DateTime<Utc>,
}

/// Lazy, most-recent-first commit sequence
///
/// Consumers stop early by dropping the iterator.
pub type History<'a> = Box<dyn Iterator<Item = Result<CommitInfo>> + 'a>;

/// Remote a pruned branch should also be deleted from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    /// Remote name, e.g. `origin`
    pub name: String,
    /// User offered to the ssh-agent when the remote URL has none
    pub ssh_user: String,
}

impl RemoteTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ssh_user: "git".to_string(),
        }
    }
}

/// Outcome of a successful remote deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteDeletion {
    /// The remote ref existed and was removed
    Deleted,
    /// The remote had nothing to delete
    AlreadyAbsent,
}

/// Opens repositories found by discovery
pub trait RepoOpener {
    type Repo: BranchStore;

    fn open(&self, path: &Path) -> Result<Self::Repo>;
}

/// Read/delete access to one repository's local branches
pub trait BranchStore {
    /// Repository working directory
    fn root(&self) -> &Path;

    /// Short name used in reports (last path segment)
    fn name(&self) -> &str;

    /// Enumerate local branches; may be called repeatedly
    fn branches(&self) -> Result<Vec<BranchRef>>;

    /// Walk history starting at the branch tip
    fn history(&self, branch: &BranchRef) -> Result<History<'_>>;

    /// Remove the branch's config section (if any) and its ref
    fn delete_local_branch(&self, branch: &str) -> Result<()>;

    /// Push a delete refspec for the branch to the given remote
    fn delete_remote_branch(&self, remote: &RemoteTarget, branch: &str)
        -> Result<RemoteDeletion>;
}

/// Short name derived from the last path segment
pub fn repo_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_name_last_segment() {
        assert_eq!(repo_name(Path::new("/home/me/src/api")), "api");
        assert_eq!(repo_name(Path::new("/")), "/");
    }

    #[test]
    fn test_remote_target_default_user() {
        let remote = RemoteTarget::new("upstream");
        assert_eq!(remote.name, "upstream");
        assert_eq!(remote.ssh_user, "git");
    }
}
