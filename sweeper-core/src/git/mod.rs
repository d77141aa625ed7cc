//! Repository access for branch sweeping
//!
//! This module defines the branch/history capability the sweep consumes and
//! its git2 implementation, including ssh-agent authenticated remote pushes.

mod access;
mod remote;
mod repo;

pub use access::{
    repo_name, BranchRef, BranchStore, CommitId, CommitInfo, History, RemoteDeletion,
    RemoteTarget, RepoOpener,
};
pub use remote::ssh_agent_callbacks;
pub use repo::{GitOpener, GitRepo};
