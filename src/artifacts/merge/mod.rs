//! Tree union merge with conflict markers
//!
//! Merges two branch-tip trees path by path: identical content is kept,
//! one-sided paths are kept, and paths that differ on both sides become a
//! synthesized blob holding both versions between conflict markers naming
//! each branch. Whole-file granularity, no line diffing.

use crate::areas::database::Database;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::tree::Tree;
use crate::error::Result;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeSet;

/// Result of a tree merge: the merged snapshot plus the conflicting paths.
#[derive(Debug)]
pub struct MergedTree {
    pub tree: Tree,
    pub conflicts: Vec<String>,
}

#[derive(new)]
pub struct TreeMerge<'d> {
    database: &'d Database,
    target_name: &'d str,
    source_name: &'d str,
}

impl TreeMerge<'_> {
    /// Merge `source` into `target`, writing conflict blobs to the database.
    pub fn merge(&self, target: &Tree, source: &Tree) -> Result<MergedTree> {
        let paths: BTreeSet<&String> = target.paths().chain(source.paths()).collect();

        let mut tree = Tree::default();
        let mut conflicts = Vec::new();

        for path in paths {
            match (target.get(path), source.get(path)) {
                (Some(ours), Some(theirs)) if ours == theirs => {
                    tree.insert(path.clone(), ours.clone());
                }
                (Some(ours), None) => {
                    tree.insert(path.clone(), ours.clone());
                }
                (None, Some(theirs)) => {
                    tree.insert(path.clone(), theirs.clone());
                }
                (Some(ours), Some(theirs)) => {
                    let ours_data = self.database.load_blob(ours)?.into_data();
                    let theirs_data = self.database.load_blob(theirs)?.into_data();

                    let conflict = Blob::new(self.conflict_content(&ours_data, &theirs_data));
                    let conflict_oid = self.database.store(&conflict)?;

                    tree.insert(path.clone(), conflict_oid);
                    conflicts.push(path.clone());
                }
                (None, None) => unreachable!("path came from one of the trees"),
            }
        }

        Ok(MergedTree { tree, conflicts })
    }

    fn conflict_content(&self, ours: &Bytes, theirs: &Bytes) -> Bytes {
        let mut content = Vec::with_capacity(ours.len() + theirs.len() + 64);

        content.extend_from_slice(format!("<<<<<<< {}\n", self.target_name).as_bytes());
        content.extend_from_slice(ours);
        if !ours.is_empty() && !ours.ends_with(b"\n") {
            content.push(b'\n');
        }
        content.extend_from_slice(b"=======\n");
        content.extend_from_slice(theirs);
        if !theirs.is_empty() && !theirs.ends_with(b"\n") {
            content.push(b'\n');
        }
        content.extend_from_slice(format!(">>>>>>> {}\n", self.source_name).as_bytes());

        Bytes::from(content)
    }
}
