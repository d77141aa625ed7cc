//! Repository discovery below a root directory

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, Result};

/// Depth-first walk yielding every directory that directly contains `.git`
///
/// Repository roots are not descended into, and neither is any directory
/// named `.git`. Unreadable subtrees come out as [`Error::Walk`] items and
/// the walk carries on elsewhere.
pub struct RepoWalker {
    inner: walkdir::IntoIter,
}

impl RepoWalker {
    /// Start a walk at `root`; fails if the root itself cannot be listed
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();

        std::fs::read_dir(root).map_err(|e| Error::RootUnreadable {
            path: root.to_path_buf(),
            cause: e.to_string(),
        })?;

        let inner = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        Ok(Self { inner })
    }
}

fn is_repo_root(path: &Path) -> bool {
    path.join(".git").symlink_metadata().is_ok()
}

impl Iterator for RepoWalker {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    // walkdir does not descend into a directory it failed to read
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_default();
                    return Some(Err(Error::Walk {
                        path,
                        cause: e.to_string(),
                    }));
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            if entry.file_name() == ".git" {
                self.inner.skip_current_dir();
                continue;
            }

            if is_repo_root(entry.path()) {
                self.inner.skip_current_dir();
                tracing::debug!(path = %entry.path().display(), "Found repository");
                return Some(Ok(entry.into_path()));
            }
        }
    }
}
