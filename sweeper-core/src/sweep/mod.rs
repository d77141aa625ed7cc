//! Sweep orchestration
//!
//! For every repository found below the root the base branch is resolved
//! once, then each branch runs through filter, staleness, merge and
//! deletion in that order. Failures below configuration level are recorded
//! in the report's [`ErrorSet`] and never stop the sweep.

mod delete;
mod evaluate;
mod filter;
mod report;
mod request;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::discover::RepoWalker;
use crate::git::{BranchRef, BranchStore, GitOpener, RepoOpener};
use crate::{Error, Result};

pub use delete::{delete_branch, DeletionOutcome};
pub use evaluate::{is_merged, is_stale, resolve_base_branch};
pub use filter::BranchFilter;
pub use report::{ErrorSet, SweepReport, SweptBranch};
pub use request::SweepRequest;

/// Cooperative cancellation, checked between repositories and branches
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sweep `request.root` using git2-backed repositories
pub fn sweep(request: &SweepRequest) -> Result<SweepReport> {
    Sweeper::new(GitOpener).run(request)
}

/// Runs sweeps against repositories opened through `O`
#[derive(Debug)]
pub struct Sweeper<O> {
    opener: O,
    cancel: CancelFlag,
    now: Option<DateTime<Utc>>,
}

impl<O: RepoOpener> Sweeper<O> {
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            cancel: CancelFlag::new(),
            now: None,
        }
    }

    /// Share a cancellation flag with the caller
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Pin "now" instead of sampling the clock when the sweep starts
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Run one sweep
    ///
    /// Only configuration errors (bad request, unreadable root) are returned
    /// as `Err`; everything else ends up in the report.
    pub fn run(&self, request: &SweepRequest) -> Result<SweepReport> {
        let filter = request.validate()?;
        let walker = RepoWalker::new(&request.root)?;

        let pass = Pass {
            request,
            filter,
            now: self.now.unwrap_or_else(Utc::now),
        };

        tracing::debug!(
            root = %request.root.display(),
            stale_days = request.stale_days,
            base = %request.base_branch,
            merged_only = request.merged_only,
            prune = request.prune,
            "Starting sweep"
        );

        let mut report = SweepReport::default();

        for found in walker {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            match found {
                Ok(path) => self.sweep_repository(&pass, &path, &mut report),
                Err(e) => report.errors.push(e),
            }
        }

        tracing::debug!(
            swept = report.swept.len(),
            errors = report.errors.len(),
            cancelled = report.cancelled,
            "Sweep finished"
        );

        Ok(report)
    }

    fn sweep_repository(&self, pass: &Pass<'_>, path: &Path, report: &mut SweepReport) {
        let store = match self.opener.open(path) {
            Ok(store) => store,
            Err(e) => {
                report.errors.push(Error::OpenFailed {
                    path: path.to_path_buf(),
                    cause: e.to_string(),
                });
                return;
            }
        };

        tracing::debug!(
            repository = %store.name(),
            root = %store.root().display(),
            "Sweeping repository"
        );

        let base = match resolve_base_branch(&store, &pass.request.base_branch) {
            Ok(base) => base,
            Err(e) => {
                report.errors.push(e);
                return;
            }
        };

        let branches = match store.branches() {
            Ok(branches) => branches,
            Err(e) => {
                report.errors.push(Error::BranchEnumerationFailed {
                    repository: store.name().to_string(),
                    cause: e.to_string(),
                });
                return;
            }
        };

        for branch in &branches {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                return;
            }

            match pass.is_candidate(&store, &base, branch) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    report.errors.push(e);
                    continue;
                }
            }

            if pass.request.prune {
                let outcome = delete_branch(&store, &branch.name, pass.request.remote_target());
                let swept = outcome.is_swept();
                match outcome {
                    DeletionOutcome::Deleted => {}
                    DeletionOutcome::RemoteFailed(e) | DeletionOutcome::LocalFailed(e) => {
                        report.errors.push(e);
                    }
                }
                if !swept {
                    continue;
                }
            }

            report
                .swept
                .push(SweptBranch::new(store.name(), branch.name.clone()));
        }
    }
}

/// Per-run state shared by every repository
struct Pass<'a> {
    request: &'a SweepRequest,
    filter: BranchFilter,
    now: DateTime<Utc>,
}

impl Pass<'_> {
    /// Filter, then staleness, then (optionally) merge; first "no" wins
    fn is_candidate<S: BranchStore>(
        &self,
        store: &S,
        base: &BranchRef,
        branch: &BranchRef,
    ) -> Result<bool> {
        if !self.filter.admits(&branch.name) {
            return Ok(false);
        }

        if !is_stale(store, branch, self.request.threshold(), self.now)? {
            tracing::debug!(repository = %store.name(), branch = %branch.name, "Branch is fresh");
            return Ok(false);
        }

        if self.request.merged_only && !is_merged(store, base, branch)? {
            tracing::debug!(repository = %store.name(), branch = %branch.name, "Branch is not merged");
            return Ok(false);
        }

        Ok(true)
    }
}
