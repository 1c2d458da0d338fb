//! References (branches, HEAD, tags)
//!
//! A ref is a file holding a 40-hex commit hash: branches under
//! `refs/heads/`, tags under `refs/tags/`. `HEAD` is symbolic — it holds
//! `ref: refs/heads/<name>` while attached to a branch, or a raw hash when
//! detached.
//!
//! Ref updates are write-new-file-then-rename, never truncate-in-place, so a
//! reader that races an update always observes one complete value. Mutating
//! operations additionally serialize through the repository lock; plain reads
//! do not need it.

use crate::artifacts::objects::object_id::ObjectId;
use crate::error::{Error, Result};
use derive_new::new;
use fake::rand;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

const HEADS_PREFIX: &str = "refs/heads/";

/// Validated branch (or tag) name.
///
/// Rejects anything that could escape the refs directory or collide with the
/// lock/temp file conventions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        let invalid = name.is_empty()
            || name.starts_with('.')
            || name.starts_with('/')
            || name.ends_with('/')
            || name.ends_with(".lock")
            || name.contains("..")
            || name.contains("/.")
            || name.contains("@{")
            || name.contains('\\')
            || name
                .chars()
                .any(|c| c.is_control() || " ~^:?*[".contains(c));

        if invalid {
            return Err(Error::InvalidBranchName(name));
        }
        Ok(BranchName(name))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a ref file can hold: another ref's path, or a commit id.
#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_from(path: &Path) -> Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_regex = regex::Regex::new(SYMREF_REGEX)
            .map_err(|err| Error::Corrupt(format!("invalid symref pattern: {err}")))?;
        if let Some(captures) = symref_regex.captures(content) {
            Ok(Some(SymRefOrOid::SymRef(captures[1].to_string())))
        } else {
            let oid = ObjectId::try_parse(content.to_string()).map_err(|_| {
                Error::Corrupt(format!("ref file {} holds no valid hash", path.display()))
            })?;
            Ok(Some(SymRefOrOid::Oid(oid)))
        }
    }
}

/// Reference manager for one repository.
#[derive(Debug, new)]
pub struct Refs {
    /// Repository root: `HEAD` and `refs/` live directly underneath.
    path: Box<Path>,
}

impl Refs {
    /// Lay out `refs/heads`, `refs/tags`, and point HEAD at the default
    /// branch. The branch itself stays unborn until the first commit.
    pub fn init(&self, default_branch: &BranchName) -> Result<()> {
        std::fs::create_dir_all(self.heads_path())?;
        std::fs::create_dir_all(self.tags_path())?;
        self.write_ref_file(
            &self.head_path(),
            &format!("ref: {HEADS_PREFIX}{default_branch}"),
        )
    }

    /// Commit id HEAD currently resolves to; None on an unborn branch.
    pub fn read_head(&self) -> Result<Option<ObjectId>> {
        match SymRefOrOid::read_from(&self.head_path())? {
            Some(SymRefOrOid::SymRef(ref_path)) => {
                match SymRefOrOid::read_from(&self.path.join(&ref_path))? {
                    Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
                    Some(SymRefOrOid::SymRef(nested)) => Err(Error::Corrupt(format!(
                        "branch ref {ref_path} points at another ref {nested}"
                    ))),
                    None => Ok(None),
                }
            }
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            None => Err(Error::Corrupt("HEAD file is missing or empty".into())),
        }
    }

    /// The checked-out branch; None when HEAD is detached.
    pub fn current_branch(&self) -> Result<Option<BranchName>> {
        match SymRefOrOid::read_from(&self.head_path())? {
            Some(SymRefOrOid::SymRef(ref_path)) => {
                let name = ref_path.strip_prefix(HEADS_PREFIX).ok_or_else(|| {
                    Error::Corrupt(format!("HEAD points outside refs/heads: {ref_path}"))
                })?;
                Ok(Some(BranchName::try_parse(name)?))
            }
            Some(SymRefOrOid::Oid(_)) => Ok(None),
            None => Err(Error::Corrupt("HEAD file is missing or empty".into())),
        }
    }

    /// Commit hash a branch points to; None for an unborn branch.
    pub fn resolve(&self, branch: &BranchName) -> Result<Option<ObjectId>> {
        match SymRefOrOid::read_from(&self.branch_path(branch))? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(nested)) => Err(Error::Corrupt(format!(
                "branch ref {branch} points at another ref {nested}"
            ))),
            None => Ok(None),
        }
    }

    pub fn branch_exists(&self, branch: &BranchName) -> bool {
        self.branch_path(branch).exists()
    }

    /// Point a branch at a commit. Atomic: rename of a fully written file.
    pub fn update(&self, branch: &BranchName, oid: &ObjectId) -> Result<()> {
        self.write_ref_file(&self.branch_path(branch), oid.as_ref())
    }

    /// Advance whatever HEAD designates: the attached branch, or HEAD itself
    /// when detached.
    pub fn update_current(&self, oid: &ObjectId) -> Result<()> {
        match SymRefOrOid::read_from(&self.head_path())? {
            Some(SymRefOrOid::SymRef(ref_path)) => {
                self.write_ref_file(&self.path.join(ref_path), oid.as_ref())
            }
            Some(SymRefOrOid::Oid(_)) => self.write_ref_file(&self.head_path(), oid.as_ref()),
            None => Err(Error::Corrupt("HEAD file is missing or empty".into())),
        }
    }

    pub fn create_branch(&self, name: &BranchName, start: &ObjectId) -> Result<()> {
        if self.branch_exists(name) {
            return Err(Error::RefExists(name.to_string()));
        }
        self.update(name, start)
    }

    /// Attach HEAD to an existing branch, or detach it onto a raw commit
    /// hash. Anything else is BranchNotFound.
    pub fn set_head(&self, target: &str) -> Result<()> {
        if let Ok(branch) = BranchName::try_parse(target) {
            if self.branch_exists(&branch) {
                return self.write_ref_file(
                    &self.head_path(),
                    &format!("ref: {HEADS_PREFIX}{branch}"),
                );
            }
        }

        match ObjectId::try_parse(target.to_string()) {
            Ok(oid) => self.write_ref_file(&self.head_path(), oid.as_ref()),
            Err(_) => Err(Error::BranchNotFound(target.to_string())),
        }
    }

    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        let heads = self.heads_path();

        let mut branches = WalkDir::new(&heads)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&heads).ok()?;
                BranchName::try_parse(relative.to_string_lossy().to_string()).ok()
            })
            .collect::<Vec<_>>();

        branches.sort();
        Ok(branches)
    }

    fn write_ref_file(&self, path: &Path, content: &str) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Corrupt(format!("invalid ref path {}", path.display())))?;
        std::fs::create_dir_all(parent)?;

        let temp_path = parent.join(format!("tmp-ref-{}", rand::random::<u32>()));
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        file.write_all(content.as_bytes())?;

        std::fs::rename(&temp_path, path)?;

        Ok(())
    }

    fn branch_path(&self, branch: &BranchName) -> PathBuf {
        self.heads_path().join(branch.as_ref())
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join("HEAD")
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.refs_path().join("heads")
    }

    pub fn tags_path(&self) -> PathBuf {
        self.refs_path().join("tags")
    }
}
