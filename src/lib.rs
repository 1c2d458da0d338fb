//! Strata: an embeddable version-control engine for server-managed
//! repositories.
//!
//! Each repository is a directory owned by the host application, identified
//! by a numeric [`RepoId`] and operated on by numeric [`UserId`]s. The engine
//! provides a content-addressed object store (blobs, trees, commits hashed
//! with SHA-1), branches and a symbolic HEAD, a materialized working tree,
//! per-user staging, commits, whole-file union merges with conflict markers,
//! reset, revert, and a per-user stash, all serialized through a per-repo
//! exclusive file lock.
//!
//! Entry point is [`RepositoryStore`]: `init` or `open` a repository, then
//! call the operations on the returned [`Repository`] handle.
//!
//! ```no_run
//! use strata::{RepoId, RepositoryStore, UserId};
//!
//! # fn demo() -> strata::Result<()> {
//! let store = RepositoryStore::new("/var/lib/strata");
//! let repo = store.init(RepoId::new(1))?;
//! let user = UserId::new(42);
//!
//! repo.write_file(user, "README.md", b"hello")?;
//! repo.stage(user, &["README.md".to_string()])?;
//! let commit = repo.commit(user, "add readme")?;
//! println!("committed {commit}");
//! # Ok(())
//! # }
//! ```

pub mod areas;
pub mod artifacts;
pub mod error;
pub mod ops;

pub use areas::refs::BranchName;
pub use areas::repository::{Repository, RepositoryStore, StoreConfig};
pub use areas::stash::StashSummary;
pub use artifacts::core::{RepoId, UserId};
pub use artifacts::index::index_entry::{FileStatus, StagedEntry, WorkingEntry};
pub use artifacts::log::rev_list::{CommitGraph, CommitSummary};
pub use artifacts::objects::commit::MergeStatus;
pub use artifacts::objects::object_id::ObjectId;
pub use error::{Error, ErrorKind, Result};
pub use ops::files::StatusReport;
pub use ops::merge::MergeOutcome;
pub use ops::reset::ResetMode;
