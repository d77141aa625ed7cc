//! Local-then-remote branch deletion

use crate::git::{BranchStore, RemoteDeletion, RemoteTarget};
use crate::Error;

/// What happened to one branch during deletion
#[derive(Debug)]
pub enum DeletionOutcome {
    /// Local ref gone; remote step skipped, succeeded, or had nothing to do
    Deleted,
    /// Local ref gone but the remote push failed; nothing is rolled back
    RemoteFailed(Error),
    /// Local ref still present; the remote was not contacted
    LocalFailed(Error),
}

impl DeletionOutcome {
    /// The local deletion is what marks a branch as swept
    pub fn is_swept(&self) -> bool {
        !matches!(self, DeletionOutcome::LocalFailed(_))
    }
}

/// Delete `branch` locally and, when `remote` is given, on that remote
pub fn delete_branch<S: BranchStore>(
    store: &S,
    branch: &str,
    remote: Option<&RemoteTarget>,
) -> DeletionOutcome {
    if let Err(e) = store.delete_local_branch(branch) {
        return DeletionOutcome::LocalFailed(Error::LocalDeleteFailed {
            repository: store.name().to_string(),
            branch: branch.to_string(),
            cause: e.to_string(),
        });
    }
    tracing::info!(repository = %store.name(), branch, "Deleted local branch");

    let Some(remote) = remote else {
        return DeletionOutcome::Deleted;
    };

    match store.delete_remote_branch(remote, branch) {
        Ok(RemoteDeletion::Deleted) => {
            tracing::info!(
                repository = %store.name(),
                remote = %remote.name,
                branch,
                "Deleted remote branch"
            );
            DeletionOutcome::Deleted
        }
        Ok(RemoteDeletion::AlreadyAbsent) => DeletionOutcome::Deleted,
        Err(e) => DeletionOutcome::RemoteFailed(Error::RemoteDeleteFailed {
            repository: store.name().to_string(),
            branch: branch.to_string(),
            cause: e.to_string(),
        }),
    }
}
