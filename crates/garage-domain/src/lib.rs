//! Domain models, services, and repository traits for the virtual garage

pub mod format;
pub mod model;
pub mod repository;
pub mod service;

pub use model::{
    CostInput, MaintenanceRecord, StatusSnapshot, Timestamp, TimestampInput, Vehicle, VehicleKind,
};
pub use repository::KeyValueStore;

/// Generate a fresh opaque identity token
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
