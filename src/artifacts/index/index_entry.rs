//! Working-tree and staging entries
//!
//! Entries are rows keyed by (user, path): the working-tree side records how
//! the user-visible files diverge from the last commit, the staging side the
//! subset selected for the next commit. Staging preserves the status the
//! working-tree entry carried.

use crate::artifacts::core::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Divergence of a path from the last commit's tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    New,
    Modified,
    Deleted,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            FileStatus::New => "new",
            FileStatus::Modified => "modified",
            FileStatus::Deleted => "deleted",
        };
        write!(f, "{status}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingEntry {
    pub user: UserId,
    pub path: String,
    pub status: FileStatus,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedEntry {
    pub user: UserId,
    pub path: String,
    pub status: FileStatus,
    pub staged_at: DateTime<Utc>,
}

impl StagedEntry {
    /// Staging moves a working-tree entry over verbatim, stamping the time.
    pub fn from_working(entry: WorkingEntry, staged_at: DateTime<Utc>) -> Self {
        StagedEntry {
            user: entry.user,
            path: entry.path,
            status: entry.status,
            staged_at,
        }
    }
}
