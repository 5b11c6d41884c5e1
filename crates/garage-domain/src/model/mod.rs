//! Domain model types

pub mod maintenance;
pub mod snapshot;
pub mod timestamp;
pub mod vehicle;

pub use maintenance::{CostInput, MaintenanceRecord};
pub use snapshot::{MaintenanceSnapshot, StoredCost, VehicleSnapshot, VehicleTag};
pub use timestamp::{Timestamp, TimestampInput};
pub use vehicle::{BoostReport, StatusSnapshot, Vehicle, VehicleKind};
