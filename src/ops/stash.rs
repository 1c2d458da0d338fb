//! Stash save, apply, and listing
//!
//! A stash shelves the user's entire staging set as one slot on their stack.
//! Apply consumes the slot and merges its entries back into staging; on a
//! path collision the stashed entry wins. The staging file is written before
//! the stash file, so a crash between the two duplicates entries instead of
//! losing them.

use crate::areas::repository::Repository;
use crate::areas::stash::StashSummary;
use crate::artifacts::core::UserId;
use crate::error::{Error, Result};
use tracing::info;

impl Repository {
    /// Shelve the user's staging set, returning the slot's index in their
    /// stack.
    pub fn stash_save(&self, user: UserId) -> Result<usize> {
        let _guard = self.lock()?;

        let mut index = self.staging()?;
        let entries = index.take_staged(user);
        if entries.is_empty() {
            return Err(Error::NothingToStash);
        }
        let count = entries.len();

        let mut stash = self.stash()?;
        let slot = stash.push(user, entries);

        index.write_updates()?;
        stash.write_updates()?;

        info!(repo = %self.id(), %user, slot, entries = count, "stashed staging set");
        Ok(slot)
    }

    /// Re-stage a shelved slot, consuming it.
    pub fn stash_apply(&self, user: UserId, slot: usize) -> Result<()> {
        let _guard = self.lock()?;

        let mut stash = self.stash()?;
        let entries = stash.take(user, slot)?;

        let mut index = self.staging()?;
        index.restore_staged(user, entries);

        index.write_updates()?;
        stash.write_updates()?;

        info!(repo = %self.id(), %user, slot, "applied stash");
        Ok(())
    }

    /// The user's stash stack, oldest first.
    pub fn stash_list(&self, user: UserId) -> Result<Vec<StashSummary>> {
        Ok(self.stash()?.list(user))
    }
}
