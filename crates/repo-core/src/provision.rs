//! Directory provisioning with rollback bookkeeping.
//!
//! [`ensure`] behaves like `mkdir -p` but reports exactly which directories
//! it created, shallowest first. Removing them in reverse order always
//! targets an empty directory, because only directories created by the same
//! call are recorded.

use crate::error::{RepoError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Permissions used for directories created above a clone target.
pub const DIR_MODE: u32 = 0o755;

/// Directories created by one provisioning call, shallowest first.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProvisionRecord {
    created: Vec<PathBuf>,
}

impl ProvisionRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing was created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    /// Number of created directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.created.len()
    }

    /// Created directories, shallowest first.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.created
    }

    fn push(&mut self, path: PathBuf) {
        self.created.push(path);
    }

    /// Remove every recorded directory, deepest first.
    ///
    /// Failures are logged and skipped; rollback never produces an error.
    pub fn rollback(self) {
        for dir in self.created.into_iter().rev() {
            match fs::remove_dir(&dir) {
                Ok(()) => trace!(path = ?dir, "removed provisioned directory"),
                Err(e) => warn!(path = ?dir, error = %e, "could not remove provisioned directory"),
            }
        }
    }
}

/// Ensure `path` exists as a directory, creating missing ancestors.
///
/// On failure the directories created so far are removed again before the
/// error is returned.
///
/// # Errors
/// Returns [`RepoError::NotADirectory`] if `path` or an ancestor exists and
/// is not a directory, or [`RepoError::DirectoryCreation`] for any other
/// filesystem failure.
pub fn ensure(path: &Path, mode: u32) -> Result<ProvisionRecord> {
    let mut record = ProvisionRecord::new();
    match ensure_into(path, mode, &mut record) {
        Ok(()) => Ok(record),
        Err(e) => {
            record.rollback();
            Err(e)
        }
    }
}

/// Ensure `path` exists as a directory, appending created directories to a
/// caller-owned record.
///
/// On failure `record` holds whatever was created before the error; the
/// caller decides when to roll it back.
///
/// # Errors
/// See [`ensure`].
pub fn ensure_into(path: &Path, mode: u32, record: &mut ProvisionRecord) -> Result<()> {
    if let Ok(meta) = fs::metadata(path) {
        if meta.is_dir() {
            return Ok(());
        }
        return Err(RepoError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_into(parent, mode, record)?;
    }

    match create_dir(path, mode) {
        Ok(()) => {
            debug!(path = ?path, "created directory");
            record.push(path.to_path_buf());
            Ok(())
        }
        // Lost a race with a concurrent creator
        Err(_) if fs::symlink_metadata(path).is_ok_and(|m| m.is_dir()) => Ok(()),
        Err(source) => Err(RepoError::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(unix)]
fn create_dir(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().mode(mode).create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path, _mode: u32) -> io::Result<()> {
    fs::DirBuilder::new().create(path)
}
