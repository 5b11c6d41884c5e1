//! Persistence implementations
//!
//! File-based implementations of the domain's storage traits.

mod file_key_value_store;

pub use file_key_value_store::FileKeyValueStore;
