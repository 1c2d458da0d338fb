//! Branch merge
//!
//! Merging always produces a merge commit on the target branch, even when
//! paths conflict: conflicting files are committed with markers embedded and
//! the commit is tagged conflicted. Conflicts are returned as data, not as an
//! error, so the caller decides how to surface them.

use crate::areas::refs::BranchName;
use crate::areas::repository::Repository;
use crate::artifacts::core::UserId;
use crate::artifacts::merge::TreeMerge;
use crate::artifacts::objects::commit::{Commit, MergeStatus};
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::{Error, Result};
use chrono::Utc;
use tracing::info;

/// What a merge produced: the merge commit and the paths that conflicted.
#[derive(Debug)]
pub struct MergeOutcome {
    pub commit: ObjectId,
    pub conflicts: Vec<String>,
}

impl MergeOutcome {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

impl Repository {
    /// Merge `source` into `target`, committing the result on `target`.
    pub fn merge(&self, user: UserId, target: &str, source: &str) -> Result<MergeOutcome> {
        if target == source {
            return Err(Error::InvalidMerge(
                "cannot merge a branch into itself".to_string(),
            ));
        }

        let target_name =
            BranchName::try_parse(target).map_err(|_| Error::BranchNotFound(target.to_string()))?;
        let source_name =
            BranchName::try_parse(source).map_err(|_| Error::BranchNotFound(source.to_string()))?;

        let _guard = self.lock()?;

        if !self.refs().branch_exists(&target_name) {
            return Err(Error::BranchNotFound(target.to_string()));
        }
        if !self.refs().branch_exists(&source_name) {
            return Err(Error::BranchNotFound(source.to_string()));
        }

        let target_tip = self.refs().resolve(&target_name)?.ok_or_else(|| {
            Error::InvalidMerge(format!("branch {target} has no commits"))
        })?;
        let source_tip = self.refs().resolve(&source_name)?.ok_or_else(|| {
            Error::InvalidMerge(format!("branch {source} has no commits"))
        })?;

        let target_tree = self
            .database()
            .load_tree(self.database().load_commit(&target_tip)?.tree_oid())?;
        let source_tree = self
            .database()
            .load_tree(self.database().load_commit(&source_tip)?.tree_oid())?;

        let merged = TreeMerge::new(self.database(), target, source)
            .merge(&target_tree, &source_tree)?;
        let tree_oid = self.database().store(&merged.tree)?;

        let status = if merged.conflicts.is_empty() {
            MergeStatus::Clean
        } else {
            MergeStatus::Conflicted
        };
        let commit = Commit::new_merge(
            target_tip,
            source_tip,
            tree_oid,
            user,
            format!("Merge branch '{source}' into '{target}'"),
            Utc::now(),
            status,
        );
        let commit_oid = self.database().store(&commit)?;

        self.refs().update(&target_name, &commit_oid)?;
        if self.refs().current_branch()? == Some(target_name) {
            self.restore_commit(&commit_oid)?;
        }

        info!(
            repo = %self.id(),
            %user,
            commit = %commit_oid.to_short_oid(),
            source,
            target,
            conflicts = merged.conflicts.len(),
            "merged branch"
        );
        Ok(MergeOutcome {
            commit: commit_oid,
            conflicts: merged.conflicts,
        })
    }
}
