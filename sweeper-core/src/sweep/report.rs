//! Sweep output: matched branches plus collected non-fatal errors

use std::fmt;

use serde::Serialize;

use crate::Error;

/// A branch that satisfied every active check (and was deleted, when pruning)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweptBranch {
    pub repository: String,
    pub branch: String,
}

impl SweptBranch {
    pub fn new(repository: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            branch: branch.into(),
        }
    }
}

/// Per-repository and per-branch errors a sweep continued past
#[derive(Debug, Default)]
pub struct ErrorSet {
    errors: Vec<Error>,
}

impl ErrorSet {
    pub fn push(&mut self, error: Error) {
        tracing::warn!("{}", error);
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.errors.iter()
    }
}

impl IntoIterator for ErrorSet {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorSet {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// Result of one sweep
///
/// `swept` and `errors` are independent: errors never invalidate entries.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Matches in visitation order
    pub swept: Vec<SweptBranch>,
    pub errors: ErrorSet,
    /// Set when the sweep stopped early on request
    pub cancelled: bool,
}

impl SweepReport {
    pub fn into_parts(self) -> (Vec<SweptBranch>, ErrorSet) {
        (self.swept, self.errors)
    }
}
