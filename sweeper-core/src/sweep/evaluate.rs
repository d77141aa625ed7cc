//! Base branch resolution and the per-branch staleness/merge checks

use chrono::{DateTime, TimeDelta, Utc};

use crate::git::{BranchRef, BranchStore, CommitInfo};
use crate::{Error, Result};

/// Find the branch named `base` among the repository's branches
///
/// Scans in enumeration order and stops at the first exact match.
pub fn resolve_base_branch<S: BranchStore>(store: &S, base: &str) -> Result<BranchRef> {
    let branches = store
        .branches()
        .map_err(|e| Error::BranchEnumerationFailed {
            repository: store.name().to_string(),
            cause: e.to_string(),
        })?;

    branches
        .into_iter()
        .find(|branch| branch.name == base)
        .ok_or_else(|| Error::BaseBranchNotFound {
            repository: store.name().to_string(),
            branch: base.to_string(),
        })
}

/// First entry of the branch's history walk
fn tip_commit<S: BranchStore>(store: &S, branch: &BranchRef) -> Result<CommitInfo> {
    let history_error = |cause: String| Error::HistoryUnavailable {
        repository: store.name().to_string(),
        branch: branch.name.clone(),
        cause,
    };

    let mut history = store.history(branch).map_err(|e| history_error(e.to_string()))?;

    match history.next() {
        Some(Ok(commit)) => Ok(commit),
        Some(Err(e)) => Err(history_error(e.to_string())),
        None => Err(history_error("branch has no commits".to_string())),
    }
}

/// Whether the branch's latest commit is at least `threshold` old at `now`
///
/// The boundary is inclusive, so a zero threshold marks every branch whose
/// tip is not in the future as stale.
pub fn is_stale<S: BranchStore>(
    store: &S,
    branch: &BranchRef,
    threshold: TimeDelta,
    now: DateTime<Utc>,
) -> Result<bool> {
    let tip = tip_commit(store, branch)?;
    Ok(now.signed_duration_since(tip.time) >= threshold)
}

/// Whether the candidate's tip commit is reachable from the base branch
///
/// This follows parents from the base tip; cherry-picked commits have a
/// different identity and do not count as merged.
pub fn is_merged<S: BranchStore>(store: &S, base: &BranchRef, candidate: &BranchRef) -> Result<bool> {
    let tip = tip_commit(store, candidate)?;

    let history = store.history(base).map_err(|e| Error::HistoryUnavailable {
        repository: store.name().to_string(),
        branch: base.name.clone(),
        cause: e.to_string(),
    })?;

    for commit in history {
        let commit = commit.map_err(|e| Error::HistoryUnavailable {
            repository: store.name().to_string(),
            branch: base.name.clone(),
            cause: e.to_string(),
        })?;
        if commit.id == tip.id {
            return Ok(true);
        }
    }

    Ok(false)
}
