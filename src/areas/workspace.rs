//! Working-tree materializer
//!
//! Reads and writes the user-visible file set under the repository's `files/`
//! root. Every externally supplied path is sanitized lexically before any
//! I/O: both `/` and `\` count as separators, and absolute paths, drive
//! prefixes, and `.`/`..` segments are rejected with InvalidPath. The check
//! never consults the filesystem, so a traversal attempt cannot probe for
//! existing paths either.

use crate::error::{Error, Result};
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate a user-supplied relative path and normalize it to its
    /// canonical `/`-joined form. Purely lexical.
    ///
    /// Both separator spellings of a path normalize to one string, so the
    /// canonical form is the only shape ever recorded in trees and index
    /// entries.
    pub fn canonical(&self, user_path: &str) -> Result<String> {
        let invalid = || Error::InvalidPath(user_path.to_string());

        if user_path.is_empty() || user_path.contains('\0') {
            return Err(invalid());
        }
        if user_path.starts_with('/') || user_path.starts_with('\\') {
            return Err(invalid());
        }
        // Windows drive or UNC prefixes ("c:...", "\\server\...")
        if user_path.len() >= 2 && user_path.as_bytes()[1] == b':' {
            return Err(invalid());
        }

        let mut segments = Vec::new();
        for segment in user_path.split(['/', '\\']) {
            match segment {
                "" | "." | ".." => return Err(invalid()),
                segment => segments.push(segment),
            }
        }

        Ok(segments.join("/"))
    }

    /// Validate a user-supplied relative path and resolve it against the
    /// workspace root.
    pub fn sanitize(&self, user_path: &str) -> Result<PathBuf> {
        let canonical = self.canonical(user_path)?;

        let mut relative = PathBuf::new();
        for segment in canonical.split('/') {
            relative.push(segment);
        }

        Ok(self.path.join(relative))
    }

    /// Read a file's content; None if the path does not exist.
    pub fn read(&self, user_path: &str) -> Result<Option<Bytes>> {
        let path = self.sanitize(user_path)?;

        match std::fs::read(&path) {
            Ok(content) => Ok(Some(Bytes::from(content))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Write a file, creating intermediate directories as needed.
    pub fn write(&self, user_path: &str, content: &[u8]) -> Result<()> {
        let path = self.sanitize(user_path)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        file.write_all(content)?;

        Ok(())
    }

    /// Delete a file; false if it was already absent.
    pub fn delete(&self, user_path: &str) -> Result<bool> {
        let path = self.sanitize(user_path)?;

        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Whether the path currently exists as a file.
    pub fn exists(&self, user_path: &str) -> Result<bool> {
        Ok(self.sanitize(user_path)?.is_file())
    }

    /// All files under the root as `/`-separated relative paths, sorted.
    pub fn list_files(&self) -> Result<Vec<String>> {
        let mut files = WalkDir::new(&self.path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(self.path.as_ref()).ok()?;
                Some(
                    relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/"),
                )
            })
            .collect::<Vec<_>>();

        files.sort();
        Ok(files)
    }

    /// Remove every file and directory under the root, keeping the root.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            for entry in std::fs::read_dir(&self.path)? {
                let entry = entry?;
                if entry.path().is_dir() {
                    std::fs::remove_dir_all(entry.path())?;
                } else {
                    std::fs::remove_file(entry.path())?;
                }
            }
        } else {
            std::fs::create_dir_all(&self.path)?;
        }

        Ok(())
    }
}
