//! Sweeper Core - find and prune stale git branches across local repositories
//!
//! A sweep walks a directory tree, opens every repository it finds and
//! reports (or deletes) the branches that are older than a threshold and,
//! optionally, already merged into a base branch.

pub mod config;
pub mod discover;
pub mod error;
pub mod git;
pub mod sweep;

#[cfg(test)]
mod test_support;

pub use config::{Config, Overrides};
pub use discover::RepoWalker;
pub use error::{Error, Result};
pub use git::{BranchStore, GitOpener, GitRepo, RemoteTarget, RepoOpener};
pub use sweep::{
    sweep, CancelFlag, ErrorSet, SweepReport, SweepRequest, Sweeper, SweptBranch,
};
