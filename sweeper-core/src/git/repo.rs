//! git2-backed repository access

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use git2::{BranchType, ConfigLevel, ErrorCode, Oid, Repository};

use super::access::{
    repo_name, BranchRef, BranchStore, CommitInfo, History, RemoteDeletion, RemoteTarget,
    RepoOpener,
};
use crate::{Error, Result};

/// Opens discovered directories as git2 repositories
#[derive(Debug, Default, Clone, Copy)]
pub struct GitOpener;

impl RepoOpener for GitOpener {
    type Repo = GitRepo;

    fn open(&self, path: &Path) -> Result<GitRepo> {
        GitRepo::open(path)
    }
}

/// A git repository wrapper providing the branch operations a sweep needs
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the repository root
    root: PathBuf,
    /// Name used in reports
    name: String,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the git repository rooted exactly at `path`
    ///
    /// Unlike discovery this does not search parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path)?;

        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| path.to_path_buf());
        let name = repo_name(path);

        Ok(Self { repo, root, name })
    }

    /// Get the current branch name, `None` for detached or unborn HEAD
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(None),
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(|s| s.to_string()))
        } else {
            Ok(None)
        }
    }

    /// Get access to the underlying git2 repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }

    /// Drop every `branch.<name>.*` key from the repository-local config
    fn remove_branch_config(&self, branch: &str) -> Result<()> {
        let mut config = match self.repo.config()?.open_level(ConfigLevel::Local) {
            Ok(config) => config,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let prefix = format!("branch.{}.", branch);
        let mut keys: Vec<String> = Vec::new();
        {
            let mut entries = config.entries(None)?;
            while let Some(entry) = entries.next() {
                let entry = entry?;
                if let Some(name) = entry.name() {
                    if name.starts_with(&prefix) && !keys.iter().any(|k| k == name) {
                        keys.push(name.to_string());
                    }
                }
            }
        }

        for key in keys {
            match config.remove_multivar(&key, ".*") {
                Ok(()) => {}
                Err(e) if e.code() == ErrorCode::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}

fn commit_time(seconds: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| Error::Other(format!("Commit timestamp {} out of range", seconds)))
}

impl BranchStore for GitRepo {
    fn root(&self) -> &Path {
        &self.root
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn branches(&self) -> Result<Vec<BranchRef>> {
        let mut branches = Vec::new();

        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            let Some(name) = branch.name()?.map(str::to_string) else {
                tracing::debug!(repository = %self.name, "Skipping branch with non UTF-8 name");
                continue;
            };
            let Some(target) = branch.get().target() else {
                continue;
            };
            branches.push(BranchRef::new(name, target.into()));
        }

        Ok(branches)
    }

    fn history(&self, branch: &BranchRef) -> Result<History<'_>> {
        let tip = Oid::from_str(branch.target.as_str())?;

        // Unsorted, so commits stream as they are reached; the pushed tip
        // is the only starting point and always comes out first
        let mut walk = self.repo.revwalk()?;
        walk.push(tip)?;

        let repo = &self.repo;
        Ok(Box::new(walk.map(move |oid| {
            let commit = repo.find_commit(oid?)?;
            let seconds = commit.author().when().seconds();
            Ok(CommitInfo {
                id: commit.id().into(),
                time: commit_time(seconds)?,
            })
        })))
    }

    fn delete_local_branch(&self, branch: &str) -> Result<()> {
        if self.current_branch()?.as_deref() == Some(branch) {
            return Err(Error::Other(format!(
                "branch {} is checked out in {}",
                branch,
                self.root.display()
            )));
        }

        self.remove_branch_config(branch)?;

        let mut reference = self.repo.find_reference(&format!("refs/heads/{}", branch))?;
        reference.delete()?;

        Ok(())
    }

    fn delete_remote_branch(
        &self,
        remote: &RemoteTarget,
        branch: &str,
    ) -> Result<RemoteDeletion> {
        self.push_branch_deletion(remote, branch)
    }
}
