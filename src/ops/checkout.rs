//! Branch creation, checkout, and working-tree restore
//!
//! Checkout re-materializes the shared `files/` directory from the target
//! commit's tree and drops every user's working-tree entries, which no longer
//! describe the new baseline. Staged entries survive a checkout: they were
//! captured explicitly and still commit on top of the new HEAD.

use crate::areas::refs::BranchName;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::{Error, Result};
use bytes::Bytes;
use tracing::info;

impl Repository {
    /// Create a branch pointing at `start`, or at the current HEAD commit.
    pub fn create_branch(&self, name: &str, start: Option<&str>) -> Result<()> {
        let name = BranchName::try_parse(name)?;
        let _guard = self.lock()?;

        let start = match start {
            Some(hash) => {
                let oid = ObjectId::try_parse(hash)?;
                // verify the target exists and is a commit
                self.database().load_commit(&oid)?;
                oid
            }
            None => self.refs().read_head()?.ok_or(Error::NoCommits)?,
        };

        self.refs().create_branch(&name, &start)?;
        info!(repo = %self.id(), branch = %name, start = %start.to_short_oid(), "created branch");
        Ok(())
    }

    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        self.refs().list_branches()
    }

    /// The checked-out branch; None when HEAD is detached.
    pub fn current_branch(&self) -> Result<Option<BranchName>> {
        self.refs().current_branch()
    }

    /// Check out a branch by name, or a commit by hash (detaching HEAD).
    pub fn checkout(&self, target: &str) -> Result<()> {
        let _guard = self.lock()?;

        if let Ok(branch) = BranchName::try_parse(target) {
            if self.refs().branch_exists(&branch) {
                self.refs().set_head(target)?;
                match self.refs().resolve(&branch)? {
                    Some(oid) => self.restore_commit(&oid)?,
                    // unborn branch: empty working tree
                    None => {
                        self.workspace().clear()?;
                        let mut index = self.staging()?;
                        index.clear_working_all();
                        index.write_updates()?;
                    }
                }
                info!(repo = %self.id(), branch = %branch, "checked out branch");
                return Ok(());
            }
        }

        if let Ok(oid) = ObjectId::try_parse(target) {
            if self.database().load_commit(&oid).is_ok() {
                self.refs().set_head(target)?;
                self.restore_commit(&oid)?;
                info!(repo = %self.id(), commit = %oid.to_short_oid(), "checked out detached commit");
                return Ok(());
            }
        }

        Err(Error::BranchNotFound(target.to_string()))
    }

    /// Re-materialize the working tree from an arbitrary commit without
    /// moving any ref.
    pub fn restore(&self, oid: &ObjectId) -> Result<()> {
        let _guard = self.lock()?;
        self.restore_commit(oid)
    }

    /// Replace the working tree with a commit's snapshot. Caller holds the
    /// repository lock.
    ///
    /// Every blob is resolved before the old tree is cleared, so a missing
    /// object fails the operation without destroying the current files.
    pub(crate) fn restore_commit(&self, oid: &ObjectId) -> Result<()> {
        let commit = self.database().load_commit(oid)?;
        let tree = self.database().load_tree(commit.tree_oid())?;

        let mut files: Vec<(String, Bytes)> = Vec::with_capacity(tree.len());
        for (path, blob_oid) in tree.entries() {
            files.push((path.clone(), self.database().load_blob(blob_oid)?.into_data()));
        }

        self.workspace().clear()?;
        for (path, content) in files {
            self.workspace().write(&path, &content)?;
        }

        let mut index = self.staging()?;
        index.clear_working_all();
        index.write_updates()?;

        Ok(())
    }
}
