//! Fixtures shared by the unit tests
//!
//! [`TestRepo`] builds real repositories with controlled commit dates;
//! [`ScriptedRepo`] is an in-memory store for failure paths git cannot
//! easily be coaxed into.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};
use git2::{Oid, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

use crate::git::{
    repo_name, BranchRef, BranchStore, CommitId, CommitInfo, History, RemoteDeletion,
    RemoteTarget, RepoOpener,
};
use crate::{Error, Result};

/// A real repository on disk whose default branch is `main`
pub struct TestRepo {
    repo: Repository,
    path: PathBuf,
    remotes: RefCell<Vec<TempDir>>,
    _dir: Option<TempDir>,
}

impl TestRepo {
    /// New repository at `<tempdir>/<name>` with one commit on `main`
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut fixture = Self::create_in(dir.path(), name);
        fixture._dir = Some(dir);
        fixture
    }

    /// New repository at `<parent>/<name>`; the caller owns `parent`
    pub fn create_in(parent: &Path, name: &str) -> Self {
        let path = parent.join(name);
        std::fs::create_dir_all(&path).unwrap();

        let mut options = RepositoryInitOptions::new();
        options.initial_head("main");
        let repo = Repository::init_opts(&path, &options).unwrap();

        let fixture = Self {
            repo,
            path,
            remotes: RefCell::new(Vec::new()),
            _dir: None,
        };
        fixture.commit(Some("refs/heads/main"), &[], Utc::now(), "initial");
        fixture
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn main_tip(&self) -> Oid {
        self.tip("main")
    }

    pub fn tip(&self, branch: &str) -> Oid {
        self.repo
            .refname_to_id(&format!("refs/heads/{}", branch))
            .unwrap()
    }

    pub fn has_branch(&self, branch: &str) -> bool {
        self.repo
            .find_reference(&format!("refs/heads/{}", branch))
            .is_ok()
    }

    pub fn commit(
        &self,
        refname: Option<&str>,
        parents: &[Oid],
        when: DateTime<Utc>,
        message: &str,
    ) -> Oid {
        let time = git2::Time::new(when.timestamp(), 0);
        let signature = Signature::new("Sweeper Test", "sweeper@example.com", &time).unwrap();

        let tree_id = self.repo.treebuilder(None).unwrap().write().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let parents: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|id| self.repo.find_commit(*id).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        self.repo
            .commit(refname, &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
    }

    pub fn create_branch(&self, branch: &str, target: Oid) {
        self.repo
            .reference(&format!("refs/heads/{}", branch), target, false, "test branch")
            .unwrap();
    }

    /// Branch off `main` with a single commit dated `when`
    pub fn branch_at(&self, branch: &str, when: DateTime<Utc>) -> Oid {
        let parent = self.main_tip();
        let refname = format!("refs/heads/{}", branch);
        self.commit(
            Some(refname.as_str()),
            &[parent],
            when,
            &format!("work on {}", branch),
        )
    }

    /// Branch off `main` with a single commit `days_ago` days old
    pub fn branch_with_commit(&self, branch: &str, days_ago: i64) -> Oid {
        self.branch_at(branch, Utc::now() - TimeDelta::days(days_ago))
    }

    pub fn commit_on_main(&self, message: &str, days_ago: i64) -> Oid {
        let parent = self.main_tip();
        self.commit(
            Some("refs/heads/main"),
            &[parent],
            Utc::now() - TimeDelta::days(days_ago),
            message,
        )
    }

    /// Record a merge commit of `branch` on `main`
    pub fn merge_into_main(&self, branch: &str) -> Oid {
        let parents = [self.main_tip(), self.tip(branch)];
        self.commit(
            Some("refs/heads/main"),
            &parents,
            Utc::now(),
            &format!("Merge branch '{}'", branch),
        )
    }

    /// Write tracking config for `branch` as `git push -u origin` would
    pub fn set_upstream_config(&self, branch: &str) {
        let mut config = self.repo.config().unwrap();
        config
            .set_str(&format!("branch.{}.remote", branch), "origin")
            .unwrap();
        config
            .set_str(
                &format!("branch.{}.merge", branch),
                &format!("refs/heads/{}", branch),
            )
            .unwrap();
    }

    /// Bare repository registered as remote `name`
    pub fn add_bare_remote(&self, name: &str) -> Repository {
        let dir = tempfile::tempdir().unwrap();
        let bare = Repository::init_bare(dir.path()).unwrap();

        let url = dir.path().to_str().unwrap().to_string();
        self.repo.remote(name, &url).unwrap();

        self.remotes.borrow_mut().push(dir);
        bare
    }

    pub fn push_to_remote(&self, remote: &str, branch: &str) {
        let mut remote = self.repo.find_remote(remote).unwrap();
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        remote.push(&[refspec], None).unwrap();
    }
}

/// Shorthand for a scripted history entry
pub fn commit(id: &str, time: DateTime<Utc>) -> CommitInfo {
    CommitInfo {
        id: CommitId::new(id),
        time,
    }
}

/// How a [`ScriptedRepo`] answers remote deletions
#[derive(Debug, Clone, Copy)]
pub enum RemoteBehavior {
    Deleted,
    AlreadyAbsent,
    Fails(&'static str),
}

#[derive(Debug, Default)]
struct DeletionLog {
    local: Vec<String>,
    remote: Vec<String>,
}

/// In-memory [`BranchStore`] with scripted histories and failures
#[derive(Debug, Clone)]
pub struct ScriptedRepo {
    name: String,
    root: PathBuf,
    branches: Vec<BranchRef>,
    histories: HashMap<String, Vec<CommitInfo>>,
    fail_after: HashMap<String, usize>,
    unlistable: bool,
    local_failures: HashSet<String>,
    remote: RemoteBehavior,
    log: Rc<RefCell<DeletionLog>>,
}

impl ScriptedRepo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            root: PathBuf::from(name),
            branches: Vec::new(),
            histories: HashMap::new(),
            fail_after: HashMap::new(),
            unlistable: false,
            local_failures: HashSet::new(),
            remote: RemoteBehavior::Deleted,
            log: Rc::default(),
        }
    }

    /// Add a branch whose history is `commits`, newest first
    pub fn branch(mut self, name: &str, commits: Vec<CommitInfo>) -> Self {
        let target = commits
            .first()
            .map(|c| c.id.clone())
            .unwrap_or_else(|| CommitId::new(format!("empty-{}", name)));
        self.branches.push(BranchRef::new(name, target));
        self.histories.insert(name.to_string(), commits);
        self
    }

    /// Add a branch whose history cannot be read
    pub fn broken_branch(mut self, name: &str) -> Self {
        self.branches
            .push(BranchRef::new(name, CommitId::new(format!("corrupt-{}", name))));
        self
    }

    /// Make the history walk of `name` error after `count` entries
    pub fn history_error_after(mut self, name: &str, count: usize) -> Self {
        self.fail_after.insert(name.to_string(), count);
        self
    }

    pub fn unlistable(mut self) -> Self {
        self.unlistable = true;
        self
    }

    pub fn local_delete_fails(mut self, name: &str) -> Self {
        self.local_failures.insert(name.to_string());
        self
    }

    pub fn remote(mut self, behavior: RemoteBehavior) -> Self {
        self.remote = behavior;
        self
    }

    pub fn local_deleted(&self) -> Vec<String> {
        self.log.borrow().local.clone()
    }

    pub fn remote_deleted(&self) -> Vec<String> {
        self.log.borrow().remote.clone()
    }
}

impl BranchStore for ScriptedRepo {
    fn root(&self) -> &Path {
        &self.root
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn branches(&self) -> Result<Vec<BranchRef>> {
        if self.unlistable {
            return Err(Error::Other("packed-refs is corrupt".to_string()));
        }
        Ok(self.branches.clone())
    }

    fn history(&self, branch: &BranchRef) -> Result<History<'_>> {
        let commits = self
            .histories
            .get(&branch.name)
            .ok_or_else(|| Error::Other(format!("object {} not found", branch.target)))?;

        let entries = commits.iter().cloned().map(Ok::<CommitInfo, Error>);
        match self.fail_after.get(&branch.name) {
            Some(&count) => Ok(Box::new(entries.take(count).chain(std::iter::once(Err(
                Error::Other("truncated history".to_string()),
            ))))),
            None => Ok(Box::new(entries)),
        }
    }

    fn delete_local_branch(&self, branch: &str) -> Result<()> {
        if self.local_failures.contains(branch) {
            return Err(Error::Other("reference is locked".to_string()));
        }
        self.log.borrow_mut().local.push(branch.to_string());
        Ok(())
    }

    fn delete_remote_branch(
        &self,
        _remote: &RemoteTarget,
        branch: &str,
    ) -> Result<RemoteDeletion> {
        match self.remote {
            RemoteBehavior::Deleted => {
                self.log.borrow_mut().remote.push(branch.to_string());
                Ok(RemoteDeletion::Deleted)
            }
            RemoteBehavior::AlreadyAbsent => Ok(RemoteDeletion::AlreadyAbsent),
            RemoteBehavior::Fails(message) => Err(Error::Other(message.to_string())),
        }
    }
}

/// Hands out [`ScriptedRepo`]s by directory name
#[derive(Debug, Default)]
pub struct ScriptedOpener {
    repos: HashMap<String, ScriptedRepo>,
}

impl ScriptedOpener {
    pub fn with(mut self, repo: ScriptedRepo) -> Self {
        self.repos.insert(repo.name.clone(), repo);
        self
    }
}

impl RepoOpener for ScriptedOpener {
    type Repo = ScriptedRepo;

    fn open(&self, path: &Path) -> Result<ScriptedRepo> {
        let name = repo_name(path);
        let mut repo = self
            .repos
            .get(&name)
            .cloned()
            .ok_or_else(|| Error::Other(format!("{} is not a git repository", name)))?;
        repo.root = path.to_path_buf();
        Ok(repo)
    }
}
