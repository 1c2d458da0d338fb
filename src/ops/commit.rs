//! Commit creation
//!
//! A commit snapshots the user's staging set on top of the HEAD tree: staged
//! deletions drop paths, staged creations and modifications store the current
//! working-tree content as blobs. The ref advance is the last history-visible
//! step: objects are written before it, and only the staging clear is
//! persisted after it. A crash mid-commit leaves unreferenced objects or
//! stale staged rows, never a ref pointing at a missing commit.

use crate::areas::repository::Repository;
use crate::artifacts::core::UserId;
use crate::artifacts::index::index_entry::FileStatus;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::{Error, Result};
use chrono::Utc;
use tracing::info;

impl Repository {
    /// Commit the user's staged entries, returning the new commit's id.
    pub fn commit(&self, user: UserId, message: &str) -> Result<ObjectId> {
        let _guard = self.lock()?;

        let mut index = self.staging()?;
        let staged = index.take_staged(user);
        if staged.is_empty() {
            return Err(Error::NothingStaged);
        }

        let parent = self.refs().read_head()?;
        let mut tree = self.head_tree()?;

        for entry in &staged {
            match entry.status {
                FileStatus::Deleted => {
                    tree.remove(&entry.path);
                }
                FileStatus::New | FileStatus::Modified => {
                    let content = self
                        .workspace()
                        .read(&entry.path)?
                        .ok_or_else(|| Error::FileNotFound(entry.path.clone()))?;
                    let blob_oid = self.database().store(&Blob::new(content))?;
                    tree.insert(entry.path.clone(), blob_oid);
                }
            }
        }

        let tree_oid = self.database().store(&tree)?;
        let commit = Commit::new(
            parent,
            tree_oid,
            user,
            message.trim().to_string(),
            Utc::now(),
        );
        let commit_oid = self.database().store(&commit)?;

        self.refs().update_current(&commit_oid)?;
        index.write_updates()?;

        info!(
            repo = %self.id(),
            %user,
            commit = %commit_oid.to_short_oid(),
            files = staged.len(),
            "created commit"
        );
        Ok(commit_oid)
    }
}
