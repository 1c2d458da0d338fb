//! Repository store and per-repository handle
//!
//! The [`RepositoryStore`] is an explicit registry keyed by [`RepoId`] and
//! injected wherever the engine is used — there is no process-global table of
//! repositories. Each repository is a directory under the store root:
//!
//! ```text
//! <root>/<repo-id>/
//!   objects/<xx>/<38-hex>   content-addressed store
//!   refs/heads/<branch>     one file per branch
//!   refs/tags/
//!   HEAD                    "ref: refs/heads/<name>" or a raw hash
//!   files/                  materialized working tree
//!   index                   working-tree + staging rows (JSON)
//!   stash                   shelved staging sets (JSON)
//!   config                  repository settings (JSON)
//!   .vcs.lock               concurrency guard
//! ```

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::lock::{LockGuard, RepositoryLock};
use crate::areas::refs::{BranchName, Refs};
use crate::areas::stash::Stash;
use crate::areas::workspace::Workspace;
use crate::artifacts::core::RepoId;
use crate::artifacts::log::rev_list::{CommitGraph, CommitSummary, RevList};
use crate::artifacts::objects::tree::Tree;
use crate::error::{Error, Result};
use std::path::Path;
use std::time::Duration;
use tracing::info;

const LOCK_FILE: &str = ".vcs.lock";

/// Store-wide settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Bound on waiting for a repository lock before failing with Busy.
    pub lock_wait: Duration,
    /// Branch HEAD points at after init.
    pub default_branch: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            lock_wait: Duration::from_secs(5),
            default_branch: "master".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct RepositoryStore {
    root: Box<Path>,
    config: StoreConfig,
}

impl RepositoryStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_config(root, StoreConfig::default())
    }

    pub fn with_config(root: impl AsRef<Path>, config: StoreConfig) -> Self {
        RepositoryStore {
            root: root.as_ref().to_path_buf().into_boxed_path(),
            config,
        }
    }

    /// Initialize a new repository. Refuses to touch an existing one.
    pub fn init(&self, repo: RepoId) -> Result<Repository> {
        let path = self.repo_path(repo);
        if path.exists() {
            return Err(Error::RepositoryExists(repo));
        }

        let default_branch = BranchName::try_parse(self.config.default_branch.clone())?;

        std::fs::create_dir_all(path.join("objects"))?;
        std::fs::create_dir_all(path.join("files"))?;

        let refs = Refs::new(path.clone().into_boxed_path());
        refs.init(&default_branch)?;

        std::fs::write(path.join("config"), b"{}")?;
        std::fs::write(path.join(LOCK_FILE), b"")?;

        info!(%repo, path = %path.display(), "initialized repository");
        self.open(repo)
    }

    /// Open an existing repository.
    pub fn open(&self, repo: RepoId) -> Result<Repository> {
        let path = self.repo_path(repo);
        if !path.exists() {
            return Err(Error::RepositoryNotFound(repo));
        }

        Ok(Repository::new(repo, path.into_boxed_path(), &self.config))
    }

    pub fn exists(&self, repo: RepoId) -> bool {
        self.repo_path(repo).exists()
    }

    fn repo_path(&self, repo: RepoId) -> std::path::PathBuf {
        self.root.join(repo.to_string())
    }
}

/// Handle over one repository's on-disk state.
///
/// Cheap to construct; the index and stash are re-read from disk inside each
/// operation because sibling processes mutate them under the same lock.
#[derive(Debug)]
pub struct Repository {
    id: RepoId,
    path: Box<Path>,
    database: Database,
    refs: Refs,
    workspace: Workspace,
    lock: RepositoryLock,
}

impl Repository {
    fn new(id: RepoId, path: Box<Path>, config: &StoreConfig) -> Self {
        let database = Database::new(path.join("objects").into_boxed_path());
        let refs = Refs::new(path.clone());
        let workspace = Workspace::new(path.join("files").into_boxed_path());
        let lock = RepositoryLock::new(path.join(LOCK_FILE).into_boxed_path(), id, config.lock_wait);

        Repository {
            id,
            path,
            database,
            refs,
            workspace,
            lock,
        }
    }

    pub fn id(&self) -> RepoId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Acquire the repository's exclusive lock (or Busy after the bound).
    pub fn lock(&self) -> Result<LockGuard> {
        self.lock.acquire()
    }

    /// Load the working/staging index from disk.
    pub fn staging(&self) -> Result<Index> {
        Index::load(self.path.join("index").into_boxed_path())
    }

    /// Load the stash stack from disk.
    pub fn stash(&self) -> Result<Stash> {
        Stash::load(self.path.join("stash").into_boxed_path())
    }

    /// The tree of the commit HEAD resolves to; empty on an unborn branch.
    pub fn head_tree(&self) -> Result<Tree> {
        match self.refs.read_head()? {
            Some(oid) => {
                let commit = self.database.load_commit(&oid)?;
                self.database.load_tree(commit.tree_oid())
            }
            None => Ok(Tree::default()),
        }
    }

    /// Every commit reachable from HEAD, oldest first. Corrupt entries are
    /// skipped with a warning rather than failing the listing.
    pub fn list_commits(&self) -> Result<Vec<CommitSummary>> {
        RevList::new(&self.database, self.refs.read_head()?).collect()
    }

    /// Commit graph (nodes + parent→child edges) for rendering.
    pub fn commit_graph(&self) -> Result<CommitGraph> {
        RevList::new(&self.database, self.refs.read_head()?).graph()
    }
}
