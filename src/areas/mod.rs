pub mod database;
pub mod index;
pub mod lock;
pub mod refs;
pub mod repository;
pub mod stash;
pub mod workspace;
