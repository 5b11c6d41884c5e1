//! Command implementations

use std::path::PathBuf;

use chrono::{DateTime, Local};

use garage_domain::{KeyValueStore, MaintenanceRecord, Vehicle};
use garage_infra::FileKeyValueStore;
use garage_store::Garage;
use garage_types::{GarageError, OutputFormat, Result, ValidationError, VehicleError};

use crate::cli::{Cli, Commands, DriveAction, MaintenanceAction, VehicleType};
use crate::config::Config;
use crate::output;

pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(ref store_dir) = cli.store_dir {
        config.store_dir = Some(store_dir.clone());
    }
    let output_format = cli.format.unwrap_or(config.output_format);
    let now = Local::now();

    match cli.command {
        Commands::List => with_garage(&config, |garage| cmd_list(garage, output_format)),

        Commands::Add {
            model,
            color,
            vehicle_type,
            capacity,
            top_speed,
            select,
        } => with_garage(&config, |garage| {
            let vehicle = build_vehicle(&model, &color, vehicle_type, capacity, top_speed)?;
            cmd_add(garage, vehicle, select, output_format)
        }),

        Commands::Remove { id } => with_garage(&config, |garage| cmd_remove(garage, &id)),

        Commands::Select { id } => with_garage(&config, |garage| cmd_select(garage, id.as_deref())),

        Commands::Show { id } => with_garage(&config, |garage| cmd_show(garage, id, output_format, now)),

        Commands::Drive { vehicle, action } => {
            with_garage(&config, |garage| cmd_drive(garage, vehicle, &action, output_format))
        }

        Commands::Maintenance { vehicle, action } => with_garage(&config, |garage| {
            cmd_maintenance(garage, vehicle, action, output_format, now)
        }),

        Commands::Remind { days } => {
            let lead_days = days.unwrap_or(config.reminder_lead_days);
            with_garage(&config, |garage| cmd_remind(garage, lead_days, output_format, now))
        }

        Commands::Config {
            show,
            set_store_dir,
            set_output,
            set_lead_days,
            reset,
        } => cmd_config(show, set_store_dir, set_output, set_lead_days, reset),
    }
}

/// Open the file-backed garage, run `f`, then surface any queued alerts
fn with_garage<T>(
    config: &Config,
    f: impl FnOnce(&mut Garage<FileKeyValueStore>) -> Result<T>,
) -> Result<T> {
    let store = FileKeyValueStore::open(config.store_dir()?)?;
    let mut garage = Garage::open(store);
    tracing::debug!(
        dir = %garage.store().store_dir().display(),
        vehicles = garage.len(),
        "garage opened"
    );
    let result = f(&mut garage);
    for alert in garage.take_alerts() {
        output::print_alert(&alert);
    }
    result
}

fn build_vehicle(
    model: &str,
    color: &str,
    vehicle_type: VehicleType,
    capacity: Option<f64>,
    top_speed: Option<u32>,
) -> Result<Vehicle> {
    let vehicle = match vehicle_type {
        VehicleType::Base => Vehicle::base(model, color)?,
        VehicleType::Cargo => {
            let capacity = capacity.ok_or(ValidationError::InvalidCapacity)?;
            Vehicle::cargo_carrier(model, color, capacity)?
        }
        VehicleType::Performance => match top_speed {
            Some(top_speed) => Vehicle::performance_with_top_speed(model, color, f64::from(top_speed))?,
            None => Vehicle::performance(model, color)?,
        },
    };
    Ok(vehicle)
}

/// Explicit id, else the current selection
fn resolve_target<S: KeyValueStore>(garage: &Garage<S>, explicit: Option<String>) -> Result<String> {
    let id = match explicit {
        Some(id) => id,
        None => garage
            .selected_id()
            .map(str::to_string)
            .ok_or(GarageError::NoSelection)?,
    };
    if garage.find(&id).is_none() {
        return Err(GarageError::NotFound(id).into());
    }
    Ok(id)
}

fn find_vehicle<'a, S: KeyValueStore>(garage: &'a Garage<S>, id: &str) -> Result<&'a Vehicle> {
    garage
        .find(id)
        .ok_or_else(|| GarageError::NotFound(id.to_string()).into())
}

fn cmd_list<S: KeyValueStore>(garage: &mut Garage<S>, output_format: OutputFormat) -> Result<()> {
    output::output_vehicles(output_format, garage.vehicles(), garage.selected_id())
}

fn cmd_add<S: KeyValueStore>(
    garage: &mut Garage<S>,
    vehicle: Vehicle,
    select: bool,
    output_format: OutputFormat,
) -> Result<()> {
    let id = vehicle.id().to_string();
    garage.add(vehicle)?;
    if select {
        garage.select(Some(&id));
    }

    let vehicle = find_vehicle(garage, &id)?;
    let message = format!("Veículo adicionado: {}", vehicle.label());
    output::output_action(output_format, vehicle, &message)
}

fn cmd_remove<S: KeyValueStore>(garage: &mut Garage<S>, id: &str) -> Result<()> {
    let label = find_vehicle(garage, id)?.label();
    garage.remove(id);
    println!("Veículo removido: {}", label);
    Ok(())
}

fn cmd_select<S: KeyValueStore>(garage: &mut Garage<S>, id: Option<&str>) -> Result<()> {
    garage.select(id);

    match (id, garage.selected()) {
        (None, _) => println!("Seleção removida."),
        (Some(_), Some(vehicle)) => println!("Selecionado: {}", vehicle.label()),
        (Some(id), None) => return Err(GarageError::NotFound(id.to_string()).into()),
    }
    Ok(())
}

fn cmd_show<S: KeyValueStore>(
    garage: &mut Garage<S>,
    id: Option<String>,
    output_format: OutputFormat,
    now: DateTime<Local>,
) -> Result<()> {
    let id = resolve_target(garage, id)?;
    let selected = garage.selected_id() == Some(id.as_str());
    let vehicle = find_vehicle(garage, &id)?;
    output::output_vehicle_detail(output_format, vehicle, selected, now)
}

fn apply_drive(vehicle: &mut Vehicle, action: &DriveAction) -> std::result::Result<String, VehicleError> {
    let message = match action {
        DriveAction::Ignition => {
            if vehicle.toggle_ignition() {
                "Motor ligado.".to_string()
            } else {
                "Motor desligado.".to_string()
            }
        }
        DriveAction::Accelerate => format!("Acelerando: {:.0} km/h", vehicle.accelerate()?),
        DriveAction::Brake => format!("Freando: {:.0} km/h", vehicle.brake()),
        DriveAction::Boost => {
            let report = vehicle.activate_boost()?;
            format!(
                "Turbo ativado: de {:.0} para {:.0} km/h",
                report.old_speed, report.new_speed
            )
        }
        DriveAction::Load { amount } => format!("Carga atual: {:.1} kg", vehicle.load_cargo(*amount)?),
        DriveAction::Unload { amount } => {
            format!("Carga atual: {:.1} kg", vehicle.unload_cargo(*amount)?)
        }
    };
    Ok(message)
}

fn cmd_drive<S: KeyValueStore>(
    garage: &mut Garage<S>,
    vehicle: Option<String>,
    action: &DriveAction,
    output_format: OutputFormat,
) -> Result<()> {
    let id = resolve_target(garage, vehicle)?;
    tracing::debug!(vehicle = %id, ?action, "drive command");
    let message = garage
        .update(&id, |v| apply_drive(v, action))
        .ok_or_else(|| GarageError::NotFound(id.clone()))??;

    output::output_action(output_format, find_vehicle(garage, &id)?, &message)
}

fn cmd_maintenance<S: KeyValueStore>(
    garage: &mut Garage<S>,
    vehicle: Option<String>,
    action: MaintenanceAction,
    output_format: OutputFormat,
    now: DateTime<Local>,
) -> Result<()> {
    let id = resolve_target(garage, vehicle)?;

    match action {
        MaintenanceAction::Add {
            date,
            kind,
            cost,
            description,
        } => {
            let record = MaintenanceRecord::new(date.as_str(), &kind, cost.as_deref(), description.as_deref());
            let summary = record.describe_at(now, true);
            garage
                .update(&id, |v| v.add_maintenance(record))
                .ok_or_else(|| GarageError::NotFound(id.clone()))??;

            let message = format!("Manutenção registrada: {}", summary);
            output::output_action(output_format, find_vehicle(garage, &id)?, &message)
        }

        MaintenanceAction::Remove { record_id } => {
            let removed = garage
                .update(&id, |v| v.remove_maintenance(&record_id))
                .ok_or_else(|| GarageError::NotFound(id.clone()))?;
            if !removed {
                return Err(GarageError::MaintenanceNotFound(record_id).into());
            }

            let message = format!("Manutenção removida: {}", record_id);
            output::output_action(output_format, find_vehicle(garage, &id)?, &message)
        }

        MaintenanceAction::List => output::output_maintenance(output_format, find_vehicle(garage, &id)?, now),
    }
}

fn cmd_remind<S: KeyValueStore>(
    garage: &mut Garage<S>,
    lead_days: u32,
    output_format: OutputFormat,
    now: DateTime<Local>,
) -> Result<()> {
    let reminders = garage.upcoming_reminders_at(now, lead_days);
    output::output_reminders(output_format, &reminders, lead_days)
}

fn cmd_config(
    show: bool,
    set_store_dir: Option<PathBuf>,
    set_output: Option<OutputFormat>,
    set_lead_days: Option<u32>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        tracing::debug!("configuration reset");
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(store_dir) = set_store_dir {
        config.store_dir = Some(store_dir);
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(lead_days) = set_lead_days {
        config.reminder_lead_days = lead_days;
        modified = true;
    }

    if modified {
        config.save()?;
        tracing::debug!(?config, "configuration saved");
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
