//! Working-tree file operations and status
//!
//! Writes and deletes maintain the per-user working-tree entries as a side
//! effect: the entry's status is derived from whether the path is tracked in
//! the HEAD tree, not from what the caller claims. Reads take no lock.
//!
//! A caching layer keying file content by (repository, path) must invalidate
//! on `write_file` and `delete_file`, and on any operation that
//! re-materializes the working tree (checkout, merge, reset --hard, revert).

use crate::areas::repository::Repository;
use crate::artifacts::core::UserId;
use crate::artifacts::index::index_entry::{FileStatus, StagedEntry, WorkingEntry};
use crate::error::{Error, Result};
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

/// Working-tree and staging listings for one user.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub working: Vec<WorkingEntry>,
    pub staged: Vec<StagedEntry>,
}

impl Repository {
    /// Write a file into the working tree and record the divergence.
    ///
    /// The canonical `/`-joined path is the recorded key, so separator
    /// spellings of the same file never diverge into two entries.
    pub fn write_file(&self, user: UserId, path: &str, content: &[u8]) -> Result<()> {
        // validate and normalize before acquiring anything
        let path = self.workspace().canonical(path)?;
        let _guard = self.lock()?;

        let status = if self.head_tree()?.contains(&path) {
            FileStatus::Modified
        } else {
            FileStatus::New
        };
        self.workspace().write(&path, content)?;

        let mut index = self.staging()?;
        index.mark_working(user, path.clone(), status);
        index.write_updates()?;

        debug!(repo = %self.id(), %user, %path, %status, "wrote working-tree file");
        Ok(())
    }

    /// Delete a file from the working tree and record the divergence.
    ///
    /// Deleting an untracked path that also has no file is FileNotFound;
    /// deleting a freshly created file just cancels its working entry.
    pub fn delete_file(&self, user: UserId, path: &str) -> Result<()> {
        let path = self.workspace().canonical(path)?;
        let _guard = self.lock()?;

        let existed = self.workspace().delete(&path)?;
        let tracked = self.head_tree()?.contains(&path);
        if !existed && !tracked {
            return Err(Error::FileNotFound(path));
        }

        let mut index = self.staging()?;
        if tracked {
            index.mark_working(user, path.clone(), FileStatus::Deleted);
        } else {
            index.remove_working(user, &path);
        }
        index.write_updates()?;

        debug!(repo = %self.id(), %user, %path, "deleted working-tree file");
        Ok(())
    }

    /// Read a file's current working-tree content; None if absent.
    pub fn read_file(&self, path: &str) -> Result<Option<Bytes>> {
        self.workspace().read(path)
    }

    /// List all working-tree files, sorted.
    pub fn list_files(&self) -> Result<Vec<String>> {
        self.workspace().list_files()
    }

    /// Move the named working-tree entries into the user's staging set.
    pub fn stage(&self, user: UserId, paths: &[String]) -> Result<()> {
        let paths = paths
            .iter()
            .map(|path| self.workspace().canonical(path))
            .collect::<Result<Vec<String>>>()?;
        let _guard = self.lock()?;

        let mut index = self.staging()?;
        index.stage(user, &paths)?;
        index.write_updates()?;

        debug!(repo = %self.id(), %user, count = paths.len(), "staged entries");
        Ok(())
    }

    /// The user's current working-tree and staging entries.
    pub fn status(&self, user: UserId) -> Result<StatusReport> {
        let index = self.staging()?;
        Ok(StatusReport {
            working: index.working_entries(user),
            staged: index.staged_entries(user),
        })
    }
}
