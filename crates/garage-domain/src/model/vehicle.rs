//! Vehicle entity and its variants
//!
//! A vehicle is one struct with shared state (identity, ignition, speed,
//! maintenance history) plus a closed [`VehicleKind`] that carries the
//! variant fields and decides the speed ceiling and acceleration step.

use chrono::{DateTime, Local};
use garage_types::{ValidationError, VehicleError};
use rand::Rng;
use serde::Serialize;

use super::maintenance::MaintenanceRecord;
use super::snapshot::{
    CargoSnapshot, CommonSnapshot, PerformanceSnapshot, VehicleSnapshot, VehicleTag,
};

/// Base variant ceiling (km/h)
pub const BASE_MAX_SPEED: f64 = 180.0;
pub const BASE_ACCELERATION: f64 = 10.0;
pub const BRAKE_DECREMENT: f64 = 10.0;

/// Cargo carrier ceiling when empty (km/h)
pub const CARGO_MAX_SPEED: f64 = 120.0;
pub const CARGO_ACCELERATION: f64 = 8.0;
/// Share of the ceiling lost at full load
pub const CARGO_LOAD_PENALTY: f64 = 0.5;

/// Range for the top speed rolled at construction (km/h)
pub const TOP_SPEED_RANGE: std::ops::RangeInclusive<u32> = 280..=360;
pub const BOOST_FRACTION: f64 = 0.25;
pub const BOOST_FLOOR: f64 = 50.0;
pub const PERFORMANCE_ACCELERATION_FRACTION: f64 = 0.1;
pub const PERFORMANCE_ACCELERATION_FLOOR: f64 = 20.0;

/// Variant-specific state
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleKind {
    Base,
    CargoCarrier {
        cargo_capacity: f64,
        current_cargo: f64,
    },
    PerformanceVariant {
        top_speed: f64,
        /// One-shot; nothing resets it
        boost_consumed: bool,
    },
}

/// Outcome of a successful boost
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostReport {
    pub old_speed: f64,
    pub new_speed: f64,
}

/// Point-in-time view of the driving state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub ignition_on: bool,
    pub speed: f64,
    pub max_speed: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cargo_capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_cargo: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost_consumed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    id: String,
    model: String,
    color: String,
    ignition_on: bool,
    speed: f64,
    /// Newest first
    maintenance_history: Vec<MaintenanceRecord>,
    kind: VehicleKind,
}

impl Vehicle {
    fn build(model: &str, color: &str, kind: VehicleKind) -> Result<Self, ValidationError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(ValidationError::EmptyModel);
        }
        Ok(Self {
            id: crate::new_id(),
            model: model.to_string(),
            color: color.trim().to_string(),
            ignition_on: false,
            speed: 0.0,
            maintenance_history: Vec::new(),
            kind,
        })
    }

    pub fn base(model: &str, color: &str) -> Result<Self, ValidationError> {
        Self::build(model, color, VehicleKind::Base)
    }

    pub fn cargo_carrier(model: &str, color: &str, cargo_capacity: f64) -> Result<Self, ValidationError> {
        if !(cargo_capacity.is_finite() && cargo_capacity > 0.0) {
            return Err(ValidationError::InvalidCapacity);
        }
        Self::build(
            model,
            color,
            VehicleKind::CargoCarrier {
                cargo_capacity,
                current_cargo: 0.0,
            },
        )
    }

    /// Performance variant with a top speed rolled from [`TOP_SPEED_RANGE`]
    pub fn performance(model: &str, color: &str) -> Result<Self, ValidationError> {
        Self::performance_with_top_speed(model, color, roll_top_speed())
    }

    pub fn performance_with_top_speed(
        model: &str,
        color: &str,
        top_speed: f64,
    ) -> Result<Self, ValidationError> {
        if !(top_speed.is_finite() && top_speed > 0.0) {
            return Err(ValidationError::InvalidTopSpeed);
        }
        Self::build(
            model,
            color,
            VehicleKind::PerformanceVariant {
                top_speed,
                boost_consumed: false,
            },
        )
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn kind(&self) -> &VehicleKind {
        &self.kind
    }

    pub fn tag(&self) -> VehicleTag {
        match self.kind {
            VehicleKind::Base => VehicleTag::Base,
            VehicleKind::CargoCarrier { .. } => VehicleTag::CargoCarrier,
            VehicleKind::PerformanceVariant { .. } => VehicleTag::PerformanceVariant,
        }
    }

    pub fn ignition_on(&self) -> bool {
        self.ignition_on
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// `Actros (Branco)`
    pub fn label(&self) -> String {
        if self.color.is_empty() {
            self.model.clone()
        } else {
            format!("{} ({})", self.model, self.color)
        }
    }

    /// Speed ceiling for the current variant and state
    pub fn effective_max_speed(&self) -> f64 {
        match self.kind {
            VehicleKind::Base => BASE_MAX_SPEED,
            VehicleKind::CargoCarrier {
                cargo_capacity,
                current_cargo,
            } => CARGO_MAX_SPEED * load_factor(cargo_capacity, current_cargo),
            VehicleKind::PerformanceVariant { top_speed, .. } => top_speed,
        }
    }

    fn acceleration_step(&self) -> f64 {
        match self.kind {
            VehicleKind::Base => BASE_ACCELERATION,
            VehicleKind::CargoCarrier {
                cargo_capacity,
                current_cargo,
            } => CARGO_ACCELERATION * load_factor(cargo_capacity, current_cargo),
            VehicleKind::PerformanceVariant { top_speed, .. } => {
                (top_speed * PERFORMANCE_ACCELERATION_FRACTION)
                    .floor()
                    .max(PERFORMANCE_ACCELERATION_FLOOR)
            }
        }
    }

    /// Speed up by one step, never past the effective ceiling
    pub fn accelerate(&mut self) -> Result<f64, VehicleError> {
        if !self.ignition_on {
            return Err(VehicleError::IgnitionOff);
        }
        let max_speed = self.effective_max_speed();
        if self.speed >= max_speed {
            return Err(VehicleError::AtMaxSpeed { max_speed });
        }
        self.speed = (self.speed + self.acceleration_step()).min(max_speed);
        tracing::debug!(vehicle = %self.id, speed = self.speed, "accelerated");
        Ok(self.speed)
    }

    pub fn brake(&mut self) -> f64 {
        self.speed = (self.speed - BRAKE_DECREMENT).max(0.0);
        self.speed
    }

    /// Flip the ignition; switching off stops the vehicle. Returns the new state.
    pub fn toggle_ignition(&mut self) -> bool {
        self.ignition_on = !self.ignition_on;
        if !self.ignition_on {
            self.speed = 0.0;
        }
        self.ignition_on
    }

    /// Returns the new cargo level
    pub fn load_cargo(&mut self, amount: f64) -> Result<f64, VehicleError> {
        let VehicleKind::CargoCarrier {
            cargo_capacity,
            current_cargo,
        } = &mut self.kind
        else {
            return Err(VehicleError::NotSupported("carga"));
        };
        if !(amount.is_finite() && amount > 0.0) {
            return Err(VehicleError::InvalidAmount);
        }
        if *current_cargo + amount > *cargo_capacity {
            return Err(VehicleError::ExceedsCapacity {
                requested: amount,
                current: *current_cargo,
                capacity: *cargo_capacity,
            });
        }
        *current_cargo += amount;
        let level = *current_cargo;

        // Heavier load lowers the ceiling; a moving truck slows down to it
        self.speed = self.speed.min(self.effective_max_speed());
        Ok(level)
    }

    /// Returns the new cargo level
    pub fn unload_cargo(&mut self, amount: f64) -> Result<f64, VehicleError> {
        let VehicleKind::CargoCarrier { current_cargo, .. } = &mut self.kind else {
            return Err(VehicleError::NotSupported("carga"));
        };
        if !(amount.is_finite() && amount > 0.0) {
            return Err(VehicleError::InvalidAmount);
        }
        if amount > *current_cargo {
            return Err(VehicleError::InsufficientCargo {
                requested: amount,
                current: *current_cargo,
            });
        }
        *current_cargo = (*current_cargo - amount).max(0.0);
        Ok(*current_cargo)
    }

    /// One-shot speed boost for performance variants
    pub fn activate_boost(&mut self) -> Result<BoostReport, VehicleError> {
        let VehicleKind::PerformanceVariant {
            top_speed,
            boost_consumed,
        } = &mut self.kind
        else {
            return Err(VehicleError::NotSupported("turbo"));
        };
        if !self.ignition_on {
            return Err(VehicleError::IgnitionOff);
        }
        if *boost_consumed {
            return Err(VehicleError::BoostAlreadyUsed);
        }
        if self.speed <= 0.0 {
            return Err(VehicleError::NotMoving);
        }

        let boost = (*top_speed * BOOST_FRACTION).floor().max(BOOST_FLOOR);
        let old_speed = self.speed;
        self.speed = (self.speed + boost).min(*top_speed);
        *boost_consumed = true;

        tracing::debug!(vehicle = %self.id, old_speed, new_speed = self.speed, "boost activated");
        Ok(BoostReport {
            old_speed,
            new_speed: self.speed,
        })
    }

    pub fn status(&self) -> StatusSnapshot {
        let mut status = StatusSnapshot {
            ignition_on: self.ignition_on,
            speed: self.speed,
            max_speed: self.effective_max_speed(),
            cargo_capacity: None,
            current_cargo: None,
            top_speed: None,
            boost_consumed: None,
        };
        match self.kind {
            VehicleKind::Base => {}
            VehicleKind::CargoCarrier {
                cargo_capacity,
                current_cargo,
            } => {
                status.cargo_capacity = Some(cargo_capacity);
                status.current_cargo = Some(current_cargo);
            }
            VehicleKind::PerformanceVariant {
                top_speed,
                boost_consumed,
            } => {
                status.top_speed = Some(top_speed);
                status.boost_consumed = Some(boost_consumed);
            }
        }
        status
    }

    pub fn maintenance_history(&self) -> &[MaintenanceRecord] {
        &self.maintenance_history
    }

    /// Append a validated record, keeping the history newest first
    pub fn add_maintenance(&mut self, record: MaintenanceRecord) -> Result<(), ValidationError> {
        record.validate()?;
        self.maintenance_history.push(record);
        sort_newest_first(&mut self.maintenance_history);
        Ok(())
    }

    pub fn remove_maintenance(&mut self, record_id: &str) -> bool {
        let before = self.maintenance_history.len();
        self.maintenance_history.retain(|m| m.id() != record_id);
        self.maintenance_history.len() != before
    }

    /// Replace the whole history; records with invalid dates are left out
    pub fn with_maintenance_history(mut self, mut records: Vec<MaintenanceRecord>) -> Self {
        records.retain(MaintenanceRecord::is_valid);
        sort_newest_first(&mut records);
        self.maintenance_history = records;
        self
    }

    /// Records at or before `now`, newest first
    pub fn completed_maintenance_at(&self, now: DateTime<Local>) -> Vec<&MaintenanceRecord> {
        self.maintenance_history
            .iter()
            .filter(|m| !m.is_scheduled_at(now))
            .collect()
    }

    /// Appointments after `now`, soonest first
    pub fn scheduled_maintenance_at(&self, now: DateTime<Local>) -> Vec<&MaintenanceRecord> {
        let mut scheduled: Vec<_> = self
            .maintenance_history
            .iter()
            .filter(|m| m.is_scheduled_at(now))
            .collect();
        scheduled.sort_by_key(|m| m.timestamp().as_datetime());
        scheduled
    }

    pub fn to_snapshot(&self) -> VehicleSnapshot {
        let common = CommonSnapshot {
            id: self.id.clone(),
            model: self.model.clone(),
            color: self.color.clone(),
            ignition_on: self.ignition_on,
            speed: self.speed,
            maintenance_history: self
                .maintenance_history
                .iter()
                .map(MaintenanceRecord::to_snapshot)
                .collect(),
        };
        match self.kind {
            VehicleKind::Base => VehicleSnapshot::Base(common),
            VehicleKind::CargoCarrier {
                cargo_capacity,
                current_cargo,
            } => VehicleSnapshot::CargoCarrier(CargoSnapshot {
                common,
                cargo_capacity,
                current_cargo,
            }),
            VehicleKind::PerformanceVariant {
                top_speed,
                boost_consumed,
            } => VehicleSnapshot::PerformanceVariant(PerformanceSnapshot {
                common,
                top_speed: Some(top_speed),
                boost_consumed,
            }),
        }
    }

    /// Rebuild a vehicle from its stored form.
    ///
    /// Stored state is re-normalized so the speed invariants hold even for
    /// hand-edited data; maintenance entries with invalid dates are dropped.
    pub fn from_snapshot(snapshot: VehicleSnapshot) -> Result<Self, ValidationError> {
        let (common, kind) = match snapshot {
            VehicleSnapshot::Base(common) => (common, VehicleKind::Base),
            VehicleSnapshot::CargoCarrier(cargo) => {
                if !(cargo.cargo_capacity.is_finite() && cargo.cargo_capacity > 0.0) {
                    return Err(ValidationError::InvalidCapacity);
                }
                let current_cargo = if cargo.current_cargo.is_finite() {
                    cargo.current_cargo.clamp(0.0, cargo.cargo_capacity)
                } else {
                    0.0
                };
                (
                    cargo.common,
                    VehicleKind::CargoCarrier {
                        cargo_capacity: cargo.cargo_capacity,
                        current_cargo,
                    },
                )
            }
            VehicleSnapshot::PerformanceVariant(perf) => {
                let top_speed = perf
                    .top_speed
                    .filter(|t| t.is_finite() && *t > 0.0)
                    .unwrap_or_else(roll_top_speed);
                (
                    perf.common,
                    VehicleKind::PerformanceVariant {
                        top_speed,
                        boost_consumed: perf.boost_consumed,
                    },
                )
            }
        };

        let history: Vec<MaintenanceRecord> = common
            .maintenance_history
            .into_iter()
            .map(MaintenanceRecord::from_snapshot)
            .filter(|m| {
                if !m.is_valid() {
                    tracing::warn!(record = %m.id(), "dropping maintenance record with invalid date");
                }
                m.is_valid()
            })
            .collect();

        let mut vehicle = Self::build(&common.model, &common.color, kind)?
            .with_id(common.id)
            .with_maintenance_history(history);

        vehicle.ignition_on = common.ignition_on;
        if vehicle.ignition_on && common.speed.is_finite() && common.speed > 0.0 {
            vehicle.speed = common.speed.min(vehicle.effective_max_speed());
        }
        Ok(vehicle)
    }
}

/// 1.0 when empty, `1 - CARGO_LOAD_PENALTY` at full load
fn load_factor(cargo_capacity: f64, current_cargo: f64) -> f64 {
    let ratio = (current_cargo / cargo_capacity).clamp(0.0, 1.0);
    1.0 - CARGO_LOAD_PENALTY * ratio
}

fn roll_top_speed() -> f64 {
    f64::from(rand::thread_rng().gen_range(TOP_SPEED_RANGE))
}

fn sort_newest_first(records: &mut [MaintenanceRecord]) {
    records.sort_by(|a, b| b.timestamp().as_datetime().cmp(&a.timestamp().as_datetime()));
}
