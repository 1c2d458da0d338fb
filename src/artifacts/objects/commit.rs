//! Commit object
//!
//! A commit records a tree snapshot, its parent(s), the acting user, a
//! message, and a UTC timestamp. The payload is a JSON record with fixed
//! field order; the id is the SHA-1 of `"commit " + payload`, so the parents
//! are part of the identity and history is tamper-evident.
//!
//! Timestamps carry sub-second precision (RFC 3339 with fractional seconds):
//! two commits with the same tree, parent, and message but distinct intents
//! still hash apart.

use crate::artifacts::core::UserId;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::Result;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker recorded on merge commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStatus {
    Clean,
    Conflicted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    tree: ObjectId,
    parent: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    merge_parent: Option<ObjectId>,
    author: UserId,
    message: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    merge_status: Option<MergeStatus>,
}

impl Commit {
    pub fn new(
        parent: Option<ObjectId>,
        tree: ObjectId,
        author: UserId,
        message: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Commit {
            tree,
            parent,
            merge_parent: None,
            author,
            message,
            timestamp,
            merge_status: None,
        }
    }

    pub fn new_merge(
        parent: ObjectId,
        merge_parent: ObjectId,
        tree: ObjectId,
        author: UserId,
        message: String,
        timestamp: DateTime<Utc>,
        merge_status: MergeStatus,
    ) -> Self {
        Commit {
            tree,
            parent: Some(parent),
            merge_parent: Some(merge_parent),
            author,
            message,
            timestamp,
            merge_status: Some(merge_status),
        }
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn merge_parent(&self) -> Option<&ObjectId> {
        self.merge_parent.as_ref()
    }

    /// All parents: zero for a root commit, two for a merge commit.
    pub fn parents(&self) -> Vec<&ObjectId> {
        self.parent
            .iter()
            .chain(self.merge_parent.iter())
            .collect()
    }

    pub fn is_merge(&self) -> bool {
        self.merge_parent.is_some()
    }

    pub fn merge_status(&self) -> Option<MergeStatus> {
        self.merge_status
    }

    pub fn author(&self) -> UserId {
        self.author
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the message, for log output.
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn serialize(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::OBJECT_ID_LENGTH;
    use pretty_assertions::assert_eq;

    fn oid(fill: char) -> ObjectId {
        ObjectId::try_parse(fill.to_string().repeat(OBJECT_ID_LENGTH)).unwrap()
    }

    #[test]
    fn payload_round_trips_through_json() {
        let commit = Commit::new(
            Some(oid('a')),
            oid('b'),
            UserId::new(7),
            "add readme".into(),
            Utc::now(),
        );
        // qualified: the derived serde `Serialize` is also in scope
        let payload = Object::serialize(&commit).unwrap();
        let parsed: Commit = serde_json::from_slice(&payload).unwrap();
        assert_eq!(parsed, commit);
    }

    #[test]
    fn identity_includes_parent() {
        let ts = Utc::now();
        let root = Commit::new(None, oid('b'), UserId::new(1), "same".into(), ts);
        let child = Commit::new(Some(oid('a')), oid('b'), UserId::new(1), "same".into(), ts);
        assert_ne!(root.object_id().unwrap(), child.object_id().unwrap());
    }

    #[test]
    fn merge_commit_records_both_parents_and_status() {
        let commit = Commit::new_merge(
            oid('a'),
            oid('b'),
            oid('c'),
            UserId::new(1),
            "Merge branch 'dev' into 'main'".into(),
            Utc::now(),
            MergeStatus::Conflicted,
        );
        assert_eq!(commit.parents(), vec![&oid('a'), &oid('b')]);
        assert!(commit.is_merge());

        let payload = String::from_utf8(Object::serialize(&commit).unwrap().to_vec()).unwrap();
        assert!(payload.contains("\"merge_status\":\"conflicted\""));
    }

    #[test]
    fn plain_commit_omits_merge_fields() {
        let commit = Commit::new(None, oid('c'), UserId::new(1), "root".into(), Utc::now());
        let payload = String::from_utf8(Object::serialize(&commit).unwrap().to_vec()).unwrap();
        assert!(!payload.contains("merge_parent"));
        assert!(!payload.contains("merge_status"));
    }
}
