pub mod index_entry;
