//! Infrastructure layer for the virtual garage

pub mod persistence;

pub use persistence::FileKeyValueStore;
