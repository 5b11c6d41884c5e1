//! Garage aggregate and its persistence to a flat key-value store

mod collation;
pub mod garage;
pub mod memory;

pub use collation::sort_by_model;
pub use garage::{Garage, Reload};
pub use memory::MemoryStore;
