//! Working-tree and staging index
//!
//! One `index` file per repository holds the working-tree and staging rows
//! for every user, as JSON. The file is loaded at the start of an operation
//! and written back atomically (temp file + rename); mutating operations
//! already hold the repository lock, so load-modify-write cannot interleave.
//!
//! A path can only be staged if a working-tree entry recorded it first;
//! staging consumes that entry and preserves its status.

use crate::artifacts::core::UserId;
use crate::artifacts::index::index_entry::{FileStatus, StagedEntry, WorkingEntry};
use crate::error::{Error, Result};
use chrono::Utc;
use fake::rand;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexState {
    working: Vec<WorkingEntry>,
    staged: Vec<StagedEntry>,
}

#[derive(Debug)]
pub struct Index {
    path: Box<Path>,
    state: IndexState,
}

impl Index {
    /// Load the index file; a missing file is an empty index.
    pub fn load(path: Box<Path>) -> Result<Self> {
        let state = match std::fs::read(&path) {
            Ok(content) => serde_json::from_slice(&content)
                .map_err(|err| Error::Corrupt(format!("index file does not parse: {err}")))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => IndexState::default(),
            Err(err) => return Err(err.into()),
        };

        Ok(Index { path, state })
    }

    /// Persist the index atomically.
    pub fn write_updates(&self) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Corrupt(format!("invalid index path {}", self.path.display())))?;

        let temp_path = parent.join(format!("tmp-index-{}", rand::random::<u32>()));
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        file.write_all(&serde_json::to_vec(&self.state)?)?;

        std::fs::rename(&temp_path, self.path.as_ref())?;

        Ok(())
    }

    /// Record or update the working-tree entry for (user, path).
    pub fn mark_working(&mut self, user: UserId, path: String, status: FileStatus) {
        self.state
            .working
            .retain(|entry| !(entry.user == user && entry.path == path));
        self.state.working.push(WorkingEntry {
            user,
            path,
            status,
            modified_at: Utc::now(),
        });
    }

    /// Drop the working-tree entry for (user, path), if any. Used when a
    /// freshly created file is deleted again: the divergence cancels out.
    pub fn remove_working(&mut self, user: UserId, path: &str) {
        self.state
            .working
            .retain(|entry| !(entry.user == user && entry.path == path));
    }

    pub fn working_entries(&self, user: UserId) -> Vec<WorkingEntry> {
        let mut entries: Vec<WorkingEntry> = self
            .state
            .working
            .iter()
            .filter(|entry| entry.user == user)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    pub fn staged_entries(&self, user: UserId) -> Vec<StagedEntry> {
        let mut entries: Vec<StagedEntry> = self
            .state
            .staged
            .iter()
            .filter(|entry| entry.user == user)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    /// Move the named working-tree entries into staging.
    ///
    /// Every path is checked before anything moves, so a NothingToStage
    /// failure leaves both sides untouched.
    pub fn stage(&mut self, user: UserId, paths: &[String]) -> Result<()> {
        for path in paths {
            let known = self
                .state
                .working
                .iter()
                .any(|entry| entry.user == user && &entry.path == path);
            if !known {
                return Err(Error::NothingToStage(path.clone()));
            }
        }

        let staged_at = Utc::now();
        for path in paths {
            let position = self
                .state
                .working
                .iter()
                .position(|entry| entry.user == user && &entry.path == path)
                .expect("presence checked above");
            let entry = self.state.working.remove(position);

            self.state
                .staged
                .retain(|staged| !(staged.user == user && &staged.path == path));
            self.state
                .staged
                .push(StagedEntry::from_working(entry, staged_at));
        }

        Ok(())
    }

    pub fn clear_staged(&mut self, user: UserId) {
        self.state.staged.retain(|entry| entry.user != user);
    }

    /// Remove and return the user's staging set (stash save, commit).
    pub fn take_staged(&mut self, user: UserId) -> Vec<StagedEntry> {
        let taken = self.staged_entries(user);
        self.clear_staged(user);
        taken
    }

    /// Merge entries back into staging; incoming entries win on path
    /// collision (stash apply).
    pub fn restore_staged(&mut self, user: UserId, entries: Vec<StagedEntry>) {
        for entry in entries {
            self.state
                .staged
                .retain(|staged| !(staged.user == user && staged.path == entry.path));
            self.state.staged.push(entry);
        }
    }

    /// Drop every working-tree entry, all users. Used when the working tree
    /// is re-materialized (checkout, hard reset, revert) and recorded
    /// divergence no longer describes anything.
    pub fn clear_working_all(&mut self) {
        self.state.working.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn index() -> Index {
        Index {
            path: PathBuf::from("/repo/index").into_boxed_path(),
            state: IndexState::default(),
        }
    }

    #[test]
    fn staging_consumes_the_working_entry_and_preserves_status() {
        let user = UserId::new(1);
        let mut index = index();
        index.mark_working(user, "a.txt".into(), FileStatus::Modified);

        index.stage(user, &["a.txt".into()]).unwrap();

        assert!(index.working_entries(user).is_empty());
        let staged = index.staged_entries(user);
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].status, FileStatus::Modified);
    }

    #[test]
    fn staging_an_unknown_path_fails_without_moving_anything() {
        let user = UserId::new(1);
        let mut index = index();
        index.mark_working(user, "a.txt".into(), FileStatus::New);

        let err = index
            .stage(user, &["a.txt".into(), "missing.txt".into()])
            .unwrap_err();
        assert!(matches!(err, Error::NothingToStage(path) if path == "missing.txt"));

        assert_eq!(index.working_entries(user).len(), 1);
        assert!(index.staged_entries(user).is_empty());
    }

    #[test]
    fn entries_are_partitioned_by_user() {
        let alice = UserId::new(1);
        let bob = UserId::new(2);
        let mut index = index();
        index.mark_working(alice, "a.txt".into(), FileStatus::New);
        index.mark_working(bob, "b.txt".into(), FileStatus::New);

        index.stage(alice, &["a.txt".into()]).unwrap();

        assert!(index.working_entries(alice).is_empty());
        assert_eq!(index.working_entries(bob).len(), 1);
        assert!(index.staged_entries(bob).is_empty());
    }

    #[test]
    fn restore_staged_overwrites_colliding_paths() {
        let user = UserId::new(1);
        let mut index = index();
        index.mark_working(user, "a.txt".into(), FileStatus::New);
        index.stage(user, &["a.txt".into()]).unwrap();

        let stashed = vec![StagedEntry {
            user,
            path: "a.txt".into(),
            status: FileStatus::Deleted,
            staged_at: Utc::now(),
        }];
        index.restore_staged(user, stashed);

        let staged = index.staged_entries(user);
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].status, FileStatus::Deleted);
    }
}
