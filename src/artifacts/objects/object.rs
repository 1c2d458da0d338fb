use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::Result;
use bytes::Bytes;
use sha1::{Digest, Sha1};

/// A content-addressed object.
///
/// `serialize` produces the payload bytes; the stored form is
/// `"<kind> <payload>"` and the object id is the SHA-1 of that stored form.
/// The kind tag is part of the hashed content, so a blob and a tree with
/// identical payloads never collide.
pub trait Object {
    fn object_type(&self) -> ObjectType;

    fn serialize(&self) -> Result<Bytes>;

    /// The exact byte sequence written to the object store.
    fn encode(&self) -> Result<Bytes> {
        let payload = self.serialize()?;
        let mut content = Vec::with_capacity(self.object_type().as_str().len() + 1 + payload.len());
        content.extend_from_slice(self.object_type().as_str().as_bytes());
        content.push(b' ');
        content.extend_from_slice(&payload);
        Ok(Bytes::from(content))
    }

    fn object_id(&self) -> Result<ObjectId> {
        let content = self.encode()?;
        let mut hasher = Sha1::new();
        hasher.update(&content);

        let oid = hasher.finalize();
        ObjectId::try_parse(format!("{oid:x}"))
    }
}
