//! Reset to an ancestor commit
//!
//! Walks first parents only: a merge commit's second parent is never
//! followed, so `steps` counts positions along the current branch's own
//! line of development.

use crate::areas::repository::Repository;
use crate::artifacts::core::UserId;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::{Error, Result};
use tracing::info;

/// How much state a reset discards besides moving HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Move HEAD only.
    Soft,
    /// Move HEAD and clear the user's staging set.
    Mixed,
    /// Move HEAD, clear the user's staging set, and re-materialize the
    /// working tree.
    Hard,
}

impl Repository {
    /// Move the current branch back `steps` commits, returning the commit
    /// HEAD lands on.
    pub fn reset(&self, user: UserId, mode: ResetMode, steps: usize) -> Result<ObjectId> {
        let _guard = self.lock()?;

        let head = self.refs().read_head()?.ok_or(Error::InsufficientHistory {
            requested: steps,
            available: 0,
        })?;

        let mut current = head;
        for walked in 0..steps {
            let commit = self.database().load_commit(&current)?;
            current = match commit.parent() {
                Some(parent) => parent.clone(),
                None => {
                    return Err(Error::InsufficientHistory {
                        requested: steps,
                        available: walked,
                    });
                }
            };
        }

        self.refs().update_current(&current)?;

        match mode {
            ResetMode::Soft => {}
            ResetMode::Mixed => {
                let mut index = self.staging()?;
                index.clear_staged(user);
                index.write_updates()?;
            }
            ResetMode::Hard => {
                let mut index = self.staging()?;
                index.clear_staged(user);
                index.write_updates()?;
                self.restore_commit(&current)?;
            }
        }

        info!(
            repo = %self.id(),
            %user,
            target = %current.to_short_oid(),
            steps,
            ?mode,
            "reset branch"
        );
        Ok(current)
    }
}
