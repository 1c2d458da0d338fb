pub mod core;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
