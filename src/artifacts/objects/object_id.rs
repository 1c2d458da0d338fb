//! Object identifier (SHA-1 hash)
//!
//! Object ids are 40-character lowercase hex strings covering the typed
//! object content (`"<kind> <payload>"`). They shard on disk as
//! `objects/<first-2-chars>/<remaining-38-chars>` to bound directory fan-out.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Validated 40-hex object identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object id from a hex string.
    pub fn try_parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let valid = id.len() == OBJECT_ID_LENGTH
            && id
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
        if !valid {
            return Err(Error::MalformedObjectId(id));
        }
        Ok(ObjectId(id))
    }

    /// Relative storage path: `XX/YYYY...` with XX the first two hex chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters, for log output.
    pub fn to_short_oid(&self) -> &str {
        &self.0[..7]
    }
}

// Validation also applies when ids come back out of stored JSON, so a
// corrupt tree or commit payload surfaces as Corrupt instead of smuggling a
// bad hash into path construction.
impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        ObjectId::try_parse(id).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn parses_any_40_char_lowercase_hex(id in "[0-9a-f]{40}") {
            let oid = ObjectId::try_parse(id.clone()).unwrap();
            assert_eq!(oid.as_ref(), id);
        }

        #[test]
        fn rejects_wrong_length(id in "[0-9a-f]{0,39}") {
            assert!(ObjectId::try_parse(id).is_err());
        }

        #[test]
        fn rejects_non_hex(id in "[g-z]{40}") {
            assert!(ObjectId::try_parse(id).is_err());
        }
    }

    #[test]
    fn shards_by_two_char_prefix() {
        let oid = ObjectId::try_parse("ab".to_string() + &"c".repeat(38)).unwrap();
        assert_eq!(oid.to_path(), PathBuf::from("ab").join("c".repeat(38)));
    }

    #[test]
    fn rejects_uppercase_hex() {
        assert!(ObjectId::try_parse("A".repeat(40)).is_err());
    }
}
