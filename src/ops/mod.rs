//! Engine operations, implemented as `impl Repository` blocks.
//!
//! Mutating operations (file writes, stage, commit, checkout, merge, reset,
//! revert, stash save/apply) acquire the repository's exclusive lock first
//! and hold it to completion; the guard drops on every exit path. Reads
//! (file content, listings, status, history) run unlocked and rely on refs
//! being replaced atomically.

pub mod checkout;
pub mod commit;
pub mod files;
pub mod merge;
pub mod reset;
pub mod revert;
pub mod stash;
