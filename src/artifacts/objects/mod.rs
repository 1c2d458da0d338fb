pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a full object id in hex characters (SHA-1).
pub const OBJECT_ID_LENGTH: usize = 40;
