//! Stash stack
//!
//! Shelved staging sets, one stack per user, persisted in a `stash` JSON
//! file next to the index. Slots are addressed by position within the user's
//! stack (0 = oldest) and consumed on apply.

use crate::artifacts::core::UserId;
use crate::artifacts::index::index_entry::StagedEntry;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use fake::rand;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StashSlot {
    pub user: UserId,
    pub saved_at: DateTime<Utc>,
    pub entries: Vec<StagedEntry>,
}

/// One row of a stash listing.
#[derive(Debug, Clone, Serialize)]
pub struct StashSummary {
    pub index: usize,
    pub saved_at: DateTime<Utc>,
    pub entry_count: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StashState {
    slots: Vec<StashSlot>,
}

#[derive(Debug)]
pub struct Stash {
    path: Box<Path>,
    state: StashState,
}

impl Stash {
    /// Load the stash file; a missing file is an empty stack.
    pub fn load(path: Box<Path>) -> Result<Self> {
        let state = match std::fs::read(&path) {
            Ok(content) => serde_json::from_slice(&content)
                .map_err(|err| Error::Corrupt(format!("stash file does not parse: {err}")))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StashState::default(),
            Err(err) => return Err(err.into()),
        };

        Ok(Stash { path, state })
    }

    pub fn write_updates(&self) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Corrupt(format!("invalid stash path {}", self.path.display())))?;

        let temp_path = parent.join(format!("tmp-stash-{}", rand::random::<u32>()));
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        file.write_all(&serde_json::to_vec(&self.state)?)?;

        std::fs::rename(&temp_path, self.path.as_ref())?;

        Ok(())
    }

    /// Push a shelved staging set, returning its index in the user's stack.
    pub fn push(&mut self, user: UserId, entries: Vec<StagedEntry>) -> usize {
        self.state.slots.push(StashSlot {
            user,
            saved_at: Utc::now(),
            entries,
        });
        self.user_slots(user).len() - 1
    }

    /// Remove and return the slot at `index` within the user's stack.
    pub fn take(&mut self, user: UserId, index: usize) -> Result<Vec<StagedEntry>> {
        let position = self
            .state
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.user == user)
            .map(|(position, _)| position)
            .nth(index)
            .ok_or(Error::NoSuchStash(index))?;

        Ok(self.state.slots.remove(position).entries)
    }

    pub fn list(&self, user: UserId) -> Vec<StashSummary> {
        self.user_slots(user)
            .into_iter()
            .enumerate()
            .map(|(index, slot)| StashSummary {
                index,
                saved_at: slot.saved_at,
                entry_count: slot.entries.len(),
            })
            .collect()
    }

    fn user_slots(&self, user: UserId) -> Vec<&StashSlot> {
        self.state
            .slots
            .iter()
            .filter(|slot| slot.user == user)
            .collect()
    }
}
