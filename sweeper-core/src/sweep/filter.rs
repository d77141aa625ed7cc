//! Name-based branch eligibility, evaluated before any history walk

use globset::{Glob, GlobMatcher};

use crate::{Error, Result};

/// Decides which branches are candidates at all
///
/// The base branch is never a candidate. An exclude match wins over an
/// include match; with neither pattern set every other branch passes.
#[derive(Debug, Clone)]
pub struct BranchFilter {
    base_branch: String,
    include: Option<GlobMatcher>,
    exclude: Option<GlobMatcher>,
}

impl BranchFilter {
    /// Compile the filter; empty patterns disable that dimension
    pub fn new(base_branch: &str, include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            base_branch: base_branch.to_string(),
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn admits(&self, branch: &str) -> bool {
        if branch == self.base_branch {
            return false;
        }

        if let Some(exclude) = &self.exclude {
            if exclude.is_match(branch) {
                return false;
            }
        }

        match &self.include {
            Some(include) => include.is_match(branch),
            None => true,
        }
    }
}

/// Shell-style glob with `{a,b}` alternation; `*` also spans `/`
fn compile(pattern: Option<&str>) -> Result<Option<GlobMatcher>> {
    let Some(pattern) = pattern.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    let glob = Glob::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    Ok(Some(glob.compile_matcher()))
}
