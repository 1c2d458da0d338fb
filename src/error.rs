//! Engine error taxonomy
//!
//! Every engine-level failure maps to a distinct variant so the request layer
//! can pick the right HTTP status without parsing messages. `Error::kind()`
//! collapses the variants into the coarse [`ErrorKind`] classes.
//!
//! Merge conflicts are *not* errors: they are returned as data alongside the
//! merge commit (see [`crate::ops::merge::MergeOutcome`]).

use crate::artifacts::core::RepoId;
use crate::artifacts::objects::object_id::ObjectId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of engine failures, one per HTTP-status family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidPath,
    Conflict,
    PreconditionFailed,
    Busy,
    Corrupt,
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("branch {0} not found")]
    BranchNotFound(String),

    #[error("file {0} not found")]
    FileNotFound(String),

    #[error("repository {0} not found")]
    RepositoryNotFound(RepoId),

    #[error("no stash entry at index {0}")]
    NoSuchStash(usize),

    #[error("malformed object id {0:?}")]
    MalformedObjectId(String),

    #[error("invalid file path {0:?}: directory traversal detected")]
    InvalidPath(String),

    #[error("ref {0} already exists")]
    RefExists(String),

    #[error("repository {0} already exists")]
    RepositoryExists(RepoId),

    #[error("repository has no commits yet")]
    NoCommits,

    #[error("nothing staged for commit")]
    NothingStaged,

    #[error("path {0:?} has no working-tree entry to stage")]
    NothingToStage(String),

    #[error("nothing staged to stash")]
    NothingToStash,

    #[error("cannot walk back {requested} commit(s): only {available} available")]
    InsufficientHistory { requested: usize, available: usize },

    #[error("invalid merge: {0}")]
    InvalidMerge(String),

    #[error("repository {0} is busy: lock not acquired within the configured wait")]
    Busy(RepoId),

    #[error("corrupt object store entry: {0}")]
    Corrupt(String),

    #[error("invalid branch name {0:?}")]
    InvalidBranchName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ObjectNotFound(_)
            | Error::BranchNotFound(_)
            | Error::FileNotFound(_)
            | Error::RepositoryNotFound(_)
            | Error::NoSuchStash(_)
            | Error::MalformedObjectId(_) => ErrorKind::NotFound,
            Error::InvalidPath(_) => ErrorKind::InvalidPath,
            Error::RefExists(_) | Error::RepositoryExists(_) => ErrorKind::Conflict,
            Error::NoCommits
            | Error::NothingStaged
            | Error::NothingToStage(_)
            | Error::NothingToStash
            | Error::InsufficientHistory { .. }
            | Error::InvalidMerge(_)
            | Error::InvalidBranchName(_) => ErrorKind::PreconditionFailed,
            Error::Busy(_) => ErrorKind::Busy,
            Error::Corrupt(_) => ErrorKind::Corrupt,
            Error::Io(_) | Error::Json(_) => ErrorKind::Internal,
        }
    }
}
