//! Integration tests for the garage against an in-memory store

use chrono::{DateTime, Duration, Local, TimeZone};
use garage_domain::model::VehicleKind;
use garage_domain::repository::{SELECTED_VEHICLE_KEY, VEHICLES_KEY};
use garage_domain::{MaintenanceRecord, Vehicle};
use garage_store::{Garage, MemoryStore};
use garage_types::{AlertSeverity, GarageError};

fn now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap()
}

fn fleet() -> Vec<Vehicle> {
    let mut gol = Vehicle::base("Gol", "Prata").unwrap().with_id("gol");
    gol.add_maintenance(
        MaintenanceRecord::new("2024-03-10T09:00", "Troca de óleo", "150,50", Some("Filtro incluído"))
            .with_id("m-oleo"),
    )
    .unwrap();
    gol.add_maintenance(
        MaintenanceRecord::new("2024-01-02", "Alinhamento", 90.0, None).with_id("m-alinhamento"),
    )
    .unwrap();
    gol.toggle_ignition();
    gol.accelerate().unwrap();

    let mut actros = Vehicle::cargo_carrier("Actros", "Branco", 12000.0)
        .unwrap()
        .with_id("actros");
    actros.load_cargo(3000.0).unwrap();

    let mut ferrari = Vehicle::performance_with_top_speed("F8", "Vermelho", 300.0)
        .unwrap()
        .with_id("f8");
    ferrari.toggle_ignition();
    ferrari.accelerate().unwrap();
    ferrari.activate_boost().unwrap();

    vec![gol, actros, ferrari]
}

/// Test that every variant survives persist + reload with its history intact
#[test]
fn test_round_trip_all_variants() {
    let store = MemoryStore::new();
    let mut garage = Garage::new(&store);
    for vehicle in fleet() {
        garage.add(vehicle).unwrap();
    }

    let reloaded = Garage::open(&store);
    assert_eq!(reloaded.vehicles(), garage.vehicles());

    let gol = reloaded.find("gol").unwrap();
    let ids: Vec<_> = gol.maintenance_history().iter().map(|m| m.id()).collect();
    assert_eq!(ids, vec!["m-oleo", "m-alinhamento"]);
    assert!(matches!(
        reloaded.find("f8").unwrap().kind(),
        VehicleKind::PerformanceVariant { boost_consumed: true, .. }
    ));
}

/// Test that add followed by remove restores the previous state
#[test]
fn test_add_then_remove_is_neutral() {
    let store = MemoryStore::new();
    let mut garage = Garage::new(&store);
    garage.add(Vehicle::base("Gol", "Prata").unwrap().with_id("gol")).unwrap();
    garage.select(Some("gol"));

    let vehicles_before = garage.vehicles().to_vec();
    let selected_before = garage.selected_id().map(str::to_string);
    let writes_before = store.write_count();

    garage.add(Vehicle::base("Uno", "Branco").unwrap().with_id("uno")).unwrap();
    assert!(garage.remove("uno"));

    assert_eq!(garage.vehicles(), vehicles_before.as_slice());
    assert_eq!(garage.selected_id().map(str::to_string), selected_before);
    assert_eq!(store.write_count(), writes_before + 2);
}

/// Test case-insensitive (model, color) uniqueness
#[test]
fn test_duplicate_model_and_color_rejected() {
    let mut garage = Garage::new(MemoryStore::new());
    garage.add(Vehicle::base("Civic", "Preto").unwrap()).unwrap();

    let result = garage.add(Vehicle::base("CIVIC", "preto").unwrap());
    assert!(matches!(result, Err(GarageError::DuplicateModelColor { .. })));
    assert_eq!(garage.len(), 1);

    garage.add(Vehicle::base("Civic", "Branco").unwrap()).unwrap();
    assert_eq!(garage.len(), 2);
}

/// Test that a record without a discriminator is skipped, not fatal
#[test]
fn test_reload_skips_untagged_record() {
    let raw = r#"[
        {"_type":"Base","id":"b1","model":"Gol","color":"Prata","ignitionOn":false,"speed":0,"maintenanceHistory":[]},
        {"id":"x1","model":"Fantasma","color":"Cinza","ignitionOn":false,"speed":0,"maintenanceHistory":[]}
    ]"#;
    let store = MemoryStore::new().with_entry(VEHICLES_KEY, raw);

    let reload = Garage::reload(&store);
    assert_eq!(reload.vehicles.len(), 1);
    assert_eq!(reload.vehicles[0].id(), "b1");
    assert!(reload.alerts.is_empty());
}

/// Test recovery of unknown tags, duplicate ids and broken maintenance entries
#[test]
fn test_reload_recovers_partial_corruption() {
    let raw = r#"[
        {"_type":"Hovercraft","id":"h1","model":"Aero"},
        {"_type":"Base","id":"b1","model":"Uno","color":"Azul","maintenanceHistory":[
            {"_type":"MaintenanceRecord","timestampISO":"2024-02-01T12:00:00.000Z","kind":"Revisão","cost":300,"description":"","id":"m1"},
            {"_type":"MaintenanceRecord","timestampISO":null,"kind":"Pneus","cost":0,"description":"","id":"m2"},
            {"_type":"MaintenanceRecord","timestampISO":"2024-04-01T12:00:00.000Z","kind":"Freios","cost":"caro","id":"m3"},
            {"_type":"MaintenanceRecord","timestampISO":"2024-04-02T12:00:00.000Z","kind":42,"id":"m5"},
            {"_type":"MaintenanceRecord","timestampISO":"2024-03-01T12:00:00.000Z","kind":"Bateria","cost":null,"id":"m4"}
        ]},
        {"_type":"Base","id":"b1","model":"Uno","color":"Verde"},
        {"_type":"CargoCarrier","id":"c1","model":"Accelo","color":"Branco","cargoCapacity":5000,"currentCargo":9000}
    ]"#;
    let store = MemoryStore::new().with_entry(VEHICLES_KEY, raw);

    let reload = Garage::reload(&store);
    let ids: Vec<_> = reload.vehicles.iter().map(|v| v.id()).collect();
    assert_eq!(ids, vec!["c1", "b1"]);

    let uno = &reload.vehicles[1];
    assert_eq!(uno.color(), "Azul");
    let history: Vec<_> = uno.maintenance_history().iter().map(|m| m.id()).collect();
    assert_eq!(history, vec!["m3", "m4", "m1"]);
    assert_eq!(uno.maintenance_history()[0].cost(), 0.0);

    match reload.vehicles[0].kind() {
        VehicleKind::CargoCarrier { current_cargo, .. } => assert_eq!(*current_cargo, 5000.0),
        other => panic!("unexpected kind: {:?}", other),
    }
}

/// Test that a cost stored as text is coerced instead of dropping the record
#[test]
fn test_reload_coerces_text_cost() {
    let raw = r#"[
        {"_type":"Base","id":"b1","model":"Gol","color":"Prata","maintenanceHistory":[
            {"_type":"MaintenanceRecord","timestampISO":"2023-12-25T13:30:00.000Z","kind":"Troca de óleo","cost":"150,50","description":"Filtro incluído","id":"m1"}
        ]}
    ]"#;
    let store = MemoryStore::new().with_entry(VEHICLES_KEY, raw);

    let reload = Garage::reload(&store);
    let history = reload.vehicles[0].maintenance_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id(), "m1");
    assert_eq!(history[0].cost(), 150.5);
}

/// Test that an unparseable store is wiped with a critical alert
#[test]
fn test_corrupted_store_is_wiped() {
    let store = MemoryStore::new()
        .with_entry(VEHICLES_KEY, "{not json")
        .with_entry(SELECTED_VEHICLE_KEY, "b1");

    let mut garage = Garage::open(&store);
    assert!(garage.is_empty());
    assert!(garage.selected().is_none());

    let alerts = garage.take_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    assert!(!store.contains(VEHICLES_KEY));
    assert!(!store.contains(SELECTED_VEHICLE_KEY));
}

/// Test that a non-array collection counts as corruption
#[test]
fn test_non_array_store_is_wiped() {
    let store = MemoryStore::new().with_entry(VEHICLES_KEY, r#"{"_type":"Base"}"#);

    let reload = Garage::reload(&store);
    assert!(reload.vehicles.is_empty());
    assert!(reload.alerts.iter().any(|a| a.is_critical()));
    assert!(!store.contains(VEHICLES_KEY));
}

/// Test that a failed write keeps the in-memory change and warns the user
#[test]
fn test_write_failure_surfaces_warning() {
    let store = MemoryStore::new();
    let mut garage = Garage::new(&store);
    garage.add(Vehicle::base("Gol", "Prata").unwrap().with_id("gol")).unwrap();

    store.set_fail_writes(true);
    garage.add(Vehicle::base("Uno", "Branco").unwrap()).unwrap();
    assert_eq!(garage.len(), 2);

    let alerts = garage.take_alerts();
    assert_eq!(alerts.len(), 1);
    assert!(!alerts[0].is_critical());

    store.set_fail_writes(false);
    assert_eq!(Garage::reload(&&store).vehicles.len(), 1);
}

/// Test that the selection survives a reopen and stale ids are dropped
#[test]
fn test_selection_persistence() {
    let store = MemoryStore::new();
    {
        let mut garage = Garage::new(&store);
        garage.add(Vehicle::base("Gol", "Prata").unwrap().with_id("gol")).unwrap();
        assert!(garage.select(Some("gol")));
    }
    assert_eq!(store.raw(SELECTED_VEHICLE_KEY).as_deref(), Some("gol"));

    let garage = Garage::open(&store);
    assert_eq!(garage.selected().map(|v| v.model()), Some("Gol"));

    let stale = MemoryStore::new().with_entry(SELECTED_VEHICLE_KEY, "ghost");
    let garage = Garage::open(&stale);
    assert!(garage.selected().is_none());
    assert!(!stale.contains(SELECTED_VEHICLE_KEY));
}

/// Test the reminder window and buckets through the garage
#[test]
fn test_scan_upcoming_window() {
    let mut garage = Garage::new(MemoryStore::new());
    garage.add(Vehicle::base("Gol", "Prata").unwrap().with_id("gol")).unwrap();
    garage.add(Vehicle::base("Uno", "Branco").unwrap().with_id("uno")).unwrap();

    garage.update("gol", |v| {
        v.add_maintenance(MaintenanceRecord::new(now() + Duration::minutes(20), "Troca de óleo", 0.0, None))
    })
    .unwrap()
    .unwrap();
    garage.update("uno", |v| {
        v.add_maintenance(MaintenanceRecord::new(now() + Duration::days(3), "Revisão", 0.0, None))
    })
    .unwrap()
    .unwrap();

    let messages = garage.scan_upcoming_at(now(), 2);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("MENOS DE 30 MINUTOS"));
    assert!(messages[0].starts_with("Lembrete: Troca de óleo p/ Gol"));

    let reminders = garage.upcoming_reminders_at(now(), 3);
    assert_eq!(reminders.len(), 2);
    assert_eq!(reminders[1].vehicle_id, "uno");
    assert!(reminders[1].message.contains("em 3 dia(s)"));
}
