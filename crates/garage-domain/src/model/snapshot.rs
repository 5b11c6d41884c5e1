//! Stored (wire) form of vehicles and maintenance records
//!
//! Every vehicle record carries a `_type` discriminator used to pick the
//! concrete variant on reload:
//!
//! ```json
//! { "_type": "CargoCarrier", "id": "...", "model": "Actros", "color": "Branco",
//!   "ignitionOn": false, "speed": 0, "maintenanceHistory": [ ... ],
//!   "cargoCapacity": 12000, "currentCargo": 3500 }
//! ```

use serde::{Deserialize, Serialize};

/// Discriminator of a stored maintenance record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordTag {
    MaintenanceRecord,
}

/// Stored maintenance record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSnapshot {
    #[serde(rename = "_type")]
    pub tag: RecordTag,
    /// `None` when the date was invalid at save time
    #[serde(rename = "timestampISO", default)]
    pub timestamp_iso: Option<String>,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub cost: Option<StoredCost>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Cost as found in storage; older or hand-edited records may hold text
/// such as `"150,50"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredCost {
    Number(f64),
    Text(String),
}

/// Known vehicle discriminators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleTag {
    Base,
    CargoCarrier,
    PerformanceVariant,
}

impl VehicleTag {
    pub const ALL: [VehicleTag; 3] = [
        VehicleTag::Base,
        VehicleTag::CargoCarrier,
        VehicleTag::PerformanceVariant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleTag::Base => "Base",
            VehicleTag::CargoCarrier => "CargoCarrier",
            VehicleTag::PerformanceVariant => "PerformanceVariant",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl std::fmt::Display for VehicleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every stored vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonSnapshot {
    pub id: String,
    pub model: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub ignition_on: bool,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub maintenance_history: Vec<MaintenanceSnapshot>,
}

/// Stored vehicle, tagged by variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum VehicleSnapshot {
    Base(CommonSnapshot),
    CargoCarrier(CargoSnapshot),
    PerformanceVariant(PerformanceSnapshot),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoSnapshot {
    #[serde(flatten)]
    pub common: CommonSnapshot,
    pub cargo_capacity: f64,
    #[serde(default)]
    pub current_cargo: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    #[serde(flatten)]
    pub common: CommonSnapshot,
    /// Missing in old records; a fresh value is rolled on reload
    #[serde(default)]
    pub top_speed: Option<f64>,
    #[serde(default)]
    pub boost_consumed: bool,
}

impl VehicleSnapshot {
    pub fn tag(&self) -> VehicleTag {
        match self {
            VehicleSnapshot::Base(_) => VehicleTag::Base,
            VehicleSnapshot::CargoCarrier(_) => VehicleTag::CargoCarrier,
            VehicleSnapshot::PerformanceVariant(_) => VehicleTag::PerformanceVariant,
        }
    }

    pub fn common(&self) -> &CommonSnapshot {
        match self {
            VehicleSnapshot::Base(common) => common,
            VehicleSnapshot::CargoCarrier(cargo) => &cargo.common,
            VehicleSnapshot::PerformanceVariant(perf) => &perf.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut CommonSnapshot {
        match self {
            VehicleSnapshot::Base(common) => common,
            VehicleSnapshot::CargoCarrier(cargo) => &mut cargo.common,
            VehicleSnapshot::PerformanceVariant(perf) => &mut perf.common,
        }
    }
}
