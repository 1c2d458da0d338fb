//! Content-addressed object store
//!
//! Objects live under `objects/<first-2-hex>/<rest>` as the literal
//! `"<kind> <payload>"` bytes whose SHA-1 is the object's identity. The
//! format is inspectable with ordinary tooling, so the bytes are stored
//! uncompressed and never rewritten: a `put` for an existing hash is a no-op.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::error::{Error, Result};
use bytes::Bytes;
use fake::rand;
use sha1::{Digest, Sha1};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store a typed object, returning its id. Idempotent.
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        self.put(object.object_type(), object.serialize()?)
    }

    /// Store raw typed content, returning its id. Idempotent: an existing
    /// object is never rewritten.
    pub fn put(&self, object_type: ObjectType, payload: Bytes) -> Result<ObjectId> {
        let mut content = Vec::with_capacity(object_type.as_str().len() + 1 + payload.len());
        content.extend_from_slice(object_type.as_str().as_bytes());
        content.push(b' ');
        content.extend_from_slice(&payload);

        let mut hasher = Sha1::new();
        hasher.update(&content);
        let oid = ObjectId::try_parse(format!("{:x}", hasher.finalize()))?;

        let object_path = self.path.join(oid.to_path());
        if !object_path.exists() {
            self.write_object(object_path, &content)?;
            debug!(object = %oid, kind = %object_type, "stored object");
        }

        Ok(oid)
    }

    /// Load an object's kind and payload.
    pub fn load(&self, oid: &ObjectId) -> Result<(ObjectType, Bytes)> {
        let object_path = self.path.join(oid.to_path());

        let content = match std::fs::read(&object_path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ObjectNotFound(oid.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        let space = content
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| Error::Corrupt(format!("object {oid} has no kind header")))?;

        let tag = std::str::from_utf8(&content[..space])
            .map_err(|_| Error::Corrupt(format!("object {oid} has a non-utf8 kind header")))?;
        let object_type = ObjectType::try_parse(tag)?;

        Ok((object_type, Bytes::copy_from_slice(&content[space + 1..])))
    }

    pub fn load_blob(&self, oid: &ObjectId) -> Result<Blob> {
        let payload = self.load_expecting(oid, ObjectType::Blob)?;
        Ok(Blob::new(payload))
    }

    pub fn load_tree(&self, oid: &ObjectId) -> Result<Tree> {
        let payload = self.load_expecting(oid, ObjectType::Tree)?;
        serde_json::from_slice(&payload)
            .map_err(|err| Error::Corrupt(format!("tree {oid} does not parse: {err}")))
    }

    pub fn load_commit(&self, oid: &ObjectId) -> Result<Commit> {
        let payload = self.load_expecting(oid, ObjectType::Commit)?;
        serde_json::from_slice(&payload)
            .map_err(|err| Error::Corrupt(format!("commit {oid} does not parse: {err}")))
    }

    fn load_expecting(&self, oid: &ObjectId, expected: ObjectType) -> Result<Bytes> {
        let (object_type, payload) = self.load(oid)?;
        if object_type != expected {
            return Err(Error::Corrupt(format!(
                "object {oid} is a {object_type}, expected {expected}"
            )));
        }
        Ok(payload)
    }

    /// Write the object file atomically: temp file in the shard directory,
    /// then rename onto the final path.
    fn write_object(&self, object_path: PathBuf, content: &[u8]) -> Result<()> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::Corrupt(format!("invalid object path {}", object_path.display())))?;
        std::fs::create_dir_all(object_dir)?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)?;
        file.write_all(content)?;

        std::fs::rename(&temp_object_path, &object_path)?;

        Ok(())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
