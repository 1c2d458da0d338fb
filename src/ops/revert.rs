//! Revert a commit
//!
//! Computes the paths the target commit introduced or changed relative to its
//! first parent, and creates a new commit on top of HEAD with those paths
//! removed. History is never rewritten; the revert is an ordinary commit.

use crate::areas::repository::Repository;
use crate::artifacts::core::UserId;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use crate::error::{Error, Result};
use chrono::Utc;
use tracing::info;

impl Repository {
    /// Undo a commit's changes with a new commit, returning its id.
    pub fn revert(&self, user: UserId, commit_hash: &str) -> Result<ObjectId> {
        let oid = ObjectId::try_parse(commit_hash)?;
        let _guard = self.lock()?;

        let target = self.database().load_commit(&oid)?;
        let target_tree = self.database().load_tree(target.tree_oid())?;
        let parent_tree = match target.parent() {
            Some(parent) => {
                let parent_commit = self.database().load_commit(parent)?;
                self.database().load_tree(parent_commit.tree_oid())?
            }
            None => Tree::default(),
        };

        let head = self.refs().read_head()?.ok_or(Error::NoCommits)?;
        let mut tree = self.head_tree()?;
        for (path, blob_oid) in target_tree.entries() {
            if parent_tree.get(path) != Some(blob_oid) {
                tree.remove(path);
            }
        }

        let tree_oid = self.database().store(&tree)?;
        let commit = Commit::new(
            Some(head),
            tree_oid,
            user,
            format!("Revert \"{}\"", target.short_message()),
            Utc::now(),
        );
        let commit_oid = self.database().store(&commit)?;

        self.refs().update_current(&commit_oid)?;
        self.restore_commit(&commit_oid)?;

        info!(
            repo = %self.id(),
            %user,
            reverted = %oid.to_short_oid(),
            commit = %commit_oid.to_short_oid(),
            "reverted commit"
        );
        Ok(commit_oid)
    }
}
