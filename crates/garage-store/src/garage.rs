//! Garage aggregate root
//!
//! Owns the vehicle collection and the current selection, and writes both
//! through to a [`KeyValueStore`] after every mutation. Store failures never
//! roll back memory; they are logged and queued as [`Alert`]s instead.

use std::collections::HashSet;

use chrono::{DateTime, Local};
use serde_json::Value;
use thiserror::Error;

use garage_domain::model::{MaintenanceSnapshot, VehicleSnapshot, VehicleTag};
use garage_domain::repository::{SELECTED_VEHICLE_KEY, VEHICLES_KEY};
use garage_domain::service::{self, Reminder};
use garage_domain::{KeyValueStore, Vehicle};
use garage_types::{Alert, GarageError, ValidationError};

use crate::collation::sort_by_model;

const SAVE_FAILED: &str =
    "Não foi possível salvar a garagem. As alterações podem ser perdidas ao recarregar.";
const SELECTION_SAVE_FAILED: &str = "Não foi possível salvar o veículo selecionado.";
const READ_FAILED: &str = "Não foi possível ler os dados salvos da garagem.";
const CORRUPTED: &str =
    "Os dados salvos da garagem estavam corrompidos e foram apagados. A garagem foi reiniciada.";

/// Result of rebuilding the collection from the store
#[derive(Debug, Default)]
pub struct Reload {
    /// Sorted by model
    pub vehicles: Vec<Vehicle>,
    pub alerts: Vec<Alert>,
}

/// Why a stored vehicle entry was left out of a reload
#[derive(Debug, Error)]
enum SkipReason {
    #[error("entry is not an object")]
    NotAnObject,

    #[error("missing _type discriminator")]
    MissingTag,

    #[error("unknown _type '{0}'")]
    UnknownTag(String),

    #[error("malformed fields: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid data: {0}")]
    Invalid(#[from] ValidationError),

    #[error("duplicate id '{0}'")]
    DuplicateId(String),
}

pub struct Garage<S: KeyValueStore> {
    store: S,
    vehicles: Vec<Vehicle>,
    selected_vehicle_id: Option<String>,
    alerts: Vec<Alert>,
}

impl<S: KeyValueStore> Garage<S> {
    /// Empty garage over `store`; nothing is read
    pub fn new(store: S) -> Self {
        Self {
            store,
            vehicles: Vec::new(),
            selected_vehicle_id: None,
            alerts: Vec::new(),
        }
    }

    /// Reload the collection from `store` and restore the saved selection
    pub fn open(store: S) -> Self {
        let Reload { vehicles, alerts } = Self::reload(&store);
        let mut garage = Self {
            store,
            vehicles,
            selected_vehicle_id: None,
            alerts,
        };
        garage.restore_selection();
        garage
    }

    /// Rebuild every stored vehicle.
    ///
    /// Broken entries are skipped one by one. Only an unparseable collection
    /// is fatal: both keys are wiped and a critical alert is returned.
    pub fn reload(store: &S) -> Reload {
        let mut alerts = Vec::new();

        let raw = match store.get(VEHICLES_KEY) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return Reload::default(),
            Err(e) => {
                tracing::error!(error = %e, "failed to read stored vehicles");
                alerts.push(Alert::warning(READ_FAILED));
                return Reload {
                    vehicles: Vec::new(),
                    alerts,
                };
            }
        };

        let entries: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "stored vehicle collection is corrupted; wiping");
                for key in [VEHICLES_KEY, SELECTED_VEHICLE_KEY] {
                    if let Err(e) = store.remove(key) {
                        tracing::error!(key, error = %e, "failed to wipe corrupted key");
                    }
                }
                alerts.push(Alert::critical(CORRUPTED));
                return Reload {
                    vehicles: Vec::new(),
                    alerts,
                };
            }
        };

        let mut seen = HashSet::new();
        let mut vehicles = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let decoded = decode_entry(entry).and_then(|vehicle| {
                if seen.insert(vehicle.id().to_string()) {
                    Ok(vehicle)
                } else {
                    Err(SkipReason::DuplicateId(vehicle.id().to_string()))
                }
            });
            match decoded {
                Ok(vehicle) => vehicles.push(vehicle),
                Err(reason) => tracing::warn!(index, %reason, "skipping stored vehicle"),
            }
        }

        sort_by_model(&mut vehicles);
        tracing::debug!(count = vehicles.len(), "vehicles reloaded");
        Reload { vehicles, alerts }
    }

    fn restore_selection(&mut self) {
        match self.store.get(SELECTED_VEHICLE_KEY) {
            Ok(Some(id)) if self.find(&id).is_some() => {
                self.selected_vehicle_id = Some(id);
            }
            Ok(Some(id)) => {
                tracing::warn!(id = %id, "dropping stale selection");
                if let Err(e) = self.store.remove(SELECTED_VEHICLE_KEY) {
                    tracing::error!(error = %e, "failed to clear stale selection");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "failed to read selection"),
        }
    }

    /// Insert a vehicle, keeping the collection sorted by model
    pub fn add(&mut self, vehicle: Vehicle) -> Result<(), GarageError> {
        if self.find(vehicle.id()).is_some() {
            return Err(GarageError::DuplicateId(vehicle.id().to_string()));
        }

        let model = vehicle.model().to_lowercase();
        let color = vehicle.color().to_lowercase();
        if self
            .vehicles
            .iter()
            .any(|v| v.model().to_lowercase() == model && v.color().to_lowercase() == color)
        {
            return Err(GarageError::DuplicateModelColor {
                model: vehicle.model().to_string(),
                color: vehicle.color().to_string(),
            });
        }

        tracing::debug!(id = %vehicle.id(), model = %vehicle.model(), "vehicle added");
        self.vehicles.push(vehicle);
        sort_by_model(&mut self.vehicles);
        self.persist();
        Ok(())
    }

    /// Remove a vehicle; returns false when the id is unknown
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.vehicles.iter().position(|v| v.id() == id) else {
            return false;
        };

        self.vehicles.remove(index);
        if self.selected_vehicle_id.as_deref() == Some(id) {
            self.selected_vehicle_id = None;
            self.persist_selection();
        }
        tracing::debug!(id, "vehicle removed");
        self.persist();
        true
    }

    pub fn find(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id() == id)
    }

    /// Change the selection.
    ///
    /// `None` or an unknown id clears it and reports whether anything
    /// changed; a known id is selected and always reports true.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        let target = match id {
            Some(id) if self.find(id).is_some() => Some(id.to_string()),
            Some(id) => {
                tracing::warn!(id, "cannot select unknown vehicle");
                None
            }
            None => None,
        };

        let found = target.is_some();
        let changed = self.selected_vehicle_id != target;
        if changed {
            self.selected_vehicle_id = target;
            self.persist_selection();
        }
        found || changed
    }

    pub fn selected(&self) -> Option<&Vehicle> {
        self.selected_vehicle_id
            .as_deref()
            .and_then(|id| self.find(id))
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_vehicle_id.as_deref()
    }

    /// Mutate one vehicle in place and persist; `None` when the id is unknown
    pub fn update<R>(&mut self, id: &str, mutate: impl FnOnce(&mut Vehicle) -> R) -> Option<R> {
        let vehicle = self.vehicles.iter_mut().find(|v| v.id() == id)?;
        let result = mutate(vehicle);
        self.persist();
        Some(result)
    }

    /// Write the whole collection. On failure memory stays authoritative and
    /// a warning alert is queued.
    pub fn persist(&mut self) -> bool {
        match self.write_vehicles() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to persist vehicles");
                self.alerts.push(Alert::warning(SAVE_FAILED));
                false
            }
        }
    }

    fn write_vehicles(&self) -> garage_types::Result<()> {
        let snapshots: Vec<VehicleSnapshot> =
            self.vehicles.iter().map(Vehicle::to_snapshot).collect();
        let json = serde_json::to_string(&snapshots)?;
        self.store.set(VEHICLES_KEY, &json)?;
        Ok(())
    }

    fn persist_selection(&mut self) -> bool {
        let result = match &self.selected_vehicle_id {
            Some(id) => self.store.set(SELECTED_VEHICLE_KEY, id),
            None => self.store.remove(SELECTED_VEHICLE_KEY),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "failed to persist selection");
                self.alerts.push(Alert::warning(SELECTION_SAVE_FAILED));
                false
            }
        }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Drain alerts queued since the last call
    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reminder lines for maintenance due within `lead_days`
    pub fn scan_upcoming(&self, lead_days: u32) -> Vec<String> {
        self.scan_upcoming_at(Local::now(), lead_days)
    }

    pub fn scan_upcoming_at(&self, now: DateTime<Local>, lead_days: u32) -> Vec<String> {
        service::scan_upcoming(&self.vehicles, now, lead_days)
    }

    pub fn upcoming_reminders_at(&self, now: DateTime<Local>, lead_days: u32) -> Vec<Reminder> {
        service::upcoming_reminders(&self.vehicles, now, lead_days)
    }
}

fn decode_entry(entry: Value) -> Result<Vehicle, SkipReason> {
    let Value::Object(mut fields) = entry else {
        return Err(SkipReason::NotAnObject);
    };

    match fields.get("_type") {
        Some(Value::String(tag)) if VehicleTag::from_tag(tag).is_some() => {}
        Some(Value::String(tag)) => return Err(SkipReason::UnknownTag(tag.clone())),
        _ => return Err(SkipReason::MissingTag),
    }

    let history = match fields.remove("maintenanceHistory") {
        Some(Value::Array(items)) => decode_history(items),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            tracing::warn!("maintenanceHistory is not a list; ignoring it");
            Vec::new()
        }
    };

    let mut snapshot: VehicleSnapshot = serde_json::from_value(Value::Object(fields))?;
    snapshot.common_mut().maintenance_history = history;
    Ok(Vehicle::from_snapshot(snapshot)?)
}

fn decode_history(items: Vec<Value>) -> Vec<MaintenanceSnapshot> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed maintenance record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use garage_types::AlertSeverity;

    #[test]
    fn test_add_sorts_by_model() {
        let mut garage = Garage::new(MemoryStore::new());
        garage.add(Vehicle::base("Uno", "Vermelho").unwrap()).unwrap();
        garage.add(Vehicle::base("Argo", "Prata").unwrap()).unwrap();
        garage.add(Vehicle::base("ônibus", "Amarelo").unwrap()).unwrap();

        let models: Vec<_> = garage.vehicles().iter().map(|v| v.model()).collect();
        assert_eq!(models, vec!["Argo", "ônibus", "Uno"]);
        assert_eq!(garage.store().write_count(), 3);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut garage = Garage::new(MemoryStore::new());
        garage.add(Vehicle::base("Uno", "Vermelho").unwrap().with_id("v1")).unwrap();

        let err = garage
            .add(Vehicle::base("Gol", "Azul").unwrap().with_id("v1"))
            .unwrap_err();
        assert_eq!(err, GarageError::DuplicateId("v1".to_string()));
        assert_eq!(garage.len(), 1);
    }

    #[test]
    fn test_select_semantics() {
        let mut garage = Garage::new(MemoryStore::new());
        garage.add(Vehicle::base("Uno", "Vermelho").unwrap().with_id("v1")).unwrap();

        assert!(!garage.select(None));
        assert!(garage.select(Some("v1")));
        assert!(garage.select(Some("v1")));
        assert_eq!(garage.store().raw(SELECTED_VEHICLE_KEY).as_deref(), Some("v1"));

        assert!(garage.select(Some("missing")));
        assert!(garage.selected().is_none());
        assert!(!garage.store().contains(SELECTED_VEHICLE_KEY));
        assert!(!garage.select(Some("missing")));
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut garage = Garage::new(MemoryStore::new());
        garage.add(Vehicle::base("Uno", "Vermelho").unwrap().with_id("v1")).unwrap();
        garage.select(Some("v1"));

        assert!(garage.remove("v1"));
        assert!(garage.selected_id().is_none());
        assert!(!garage.store().contains(SELECTED_VEHICLE_KEY));
        assert!(!garage.remove("v1"));
    }

    #[test]
    fn test_update_persists() {
        let store = MemoryStore::new();
        let mut garage = Garage::new(&store);
        garage.add(Vehicle::base("Uno", "Vermelho").unwrap().with_id("v1")).unwrap();

        let speed = garage.update("v1", |v| {
            v.toggle_ignition();
            v.accelerate()
        });
        assert_eq!(speed, Some(Ok(10.0)));
        assert!(garage.update("nope", |v| v.brake()).is_none());

        let reloaded = Garage::reload(&&store);
        assert_eq!(reloaded.vehicles[0].speed(), 10.0);
    }

    #[test]
    fn test_write_failure_keeps_memory_and_alerts() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let mut garage = Garage::new(&store);

        garage.add(Vehicle::base("Uno", "Vermelho").unwrap()).unwrap();
        assert_eq!(garage.len(), 1);

        let alerts = garage.take_alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
        assert!(garage.take_alerts().is_empty());
    }

    #[test]
    fn test_blank_store_is_empty() {
        let store = MemoryStore::new().with_entry(VEHICLES_KEY, "   ");
        let reload = Garage::reload(&store);
        assert!(reload.vehicles.is_empty());
        assert!(reload.alerts.is_empty());
    }

    #[test]
    fn test_decode_entry_reasons() {
        assert!(matches!(decode_entry(Value::from(3)), Err(SkipReason::NotAnObject)));
        assert!(matches!(
            decode_entry(serde_json::json!({"_type": "Hovercraft", "id": "h", "model": "X"})),
            Err(SkipReason::UnknownTag(tag)) if tag == "Hovercraft"
        ));
        assert!(matches!(
            decode_entry(serde_json::json!({"_type": "Base", "id": "b"})),
            Err(SkipReason::Malformed(_))
        ));
        assert!(matches!(
            decode_entry(serde_json::json!({"_type": "Base", "id": "b", "model": "  "})),
            Err(SkipReason::Invalid(ValidationError::EmptyModel))
        ));
    }
}
