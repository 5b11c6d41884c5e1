//! Output formatting module

use chrono::{DateTime, Local};
use serde::Serialize;

use garage_domain::format::format_day_month_time;
use garage_domain::model::{MaintenanceSnapshot, VehicleSnapshot, VehicleTag};
use garage_domain::service::Reminder;
use garage_domain::{MaintenanceRecord, StatusSnapshot, Vehicle, VehicleKind};
use garage_types::{Alert, OutputFormat, Result};

#[derive(Serialize)]
struct VehicleDetail {
    vehicle: VehicleSnapshot,
    status: StatusSnapshot,
    selected: bool,
}

#[derive(Serialize)]
struct MaintenanceListing {
    completed: Vec<MaintenanceSnapshot>,
    scheduled: Vec<MaintenanceSnapshot>,
}

#[derive(Serialize)]
struct ActionOutcome<'a> {
    id: &'a str,
    message: &'a str,
    status: StatusSnapshot,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    println!("{}", content);
    Ok(())
}

fn type_label(tag: VehicleTag) -> &'static str {
    match tag {
        VehicleTag::Base => "Base",
        VehicleTag::CargoCarrier => "Carga",
        VehicleTag::PerformanceVariant => "Esportivo",
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

pub fn print_alert(alert: &Alert) {
    eprintln!("{}", alert);
}

pub fn output_vehicles(
    output_format: OutputFormat,
    vehicles: &[Vehicle],
    selected_id: Option<&str>,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        let snapshots: Vec<VehicleSnapshot> = vehicles.iter().map(Vehicle::to_snapshot).collect();
        return print_json(&snapshots);
    }

    println!("Garagem Virtual");
    println!("===============");
    println!("Veículos: {}", vehicles.len());
    println!();

    if vehicles.is_empty() {
        println!("Nenhum veículo cadastrado.");
        return Ok(());
    }

    println!(
        "  {:<36} {:<20} {:<12} {:<10} {:>10}",
        "ID", "Modelo", "Cor", "Tipo", "Velocidade"
    );
    println!("{}", "-".repeat(94));

    for vehicle in vehicles {
        let marker = if Some(vehicle.id()) == selected_id { "*" } else { " " };
        println!(
            "{} {:<36} {:<20} {:<12} {:<10} {:>7.0} km/h",
            marker,
            vehicle.id(),
            truncate(vehicle.model(), 20),
            truncate(vehicle.color(), 12),
            type_label(vehicle.tag()),
            vehicle.speed()
        );
    }

    if selected_id.is_some() {
        println!();
        println!("* selecionado");
    }

    Ok(())
}

fn print_status_lines(vehicle: &Vehicle) {
    let status = vehicle.status();
    println!(
        "Motor:        {}",
        if status.ignition_on { "Ligado" } else { "Desligado" }
    );
    println!(
        "Velocidade:   {:.0} km/h (máx. {:.0} km/h)",
        status.speed, status.max_speed
    );

    match vehicle.kind() {
        VehicleKind::Base => {}
        VehicleKind::CargoCarrier {
            cargo_capacity,
            current_cargo,
        } => {
            println!("Carga:        {:.1} / {:.1} kg", current_cargo, cargo_capacity);
        }
        VehicleKind::PerformanceVariant {
            top_speed,
            boost_consumed,
        } => {
            println!("Vel. final:   {:.0} km/h", top_speed);
            println!(
                "Turbo:        {}",
                if *boost_consumed { "usado" } else { "disponível" }
            );
        }
    }
}

fn print_records(title: &str, records: &[&MaintenanceRecord], now: DateTime<Local>) {
    println!("{} ({})", title, records.len());
    if records.is_empty() {
        println!("  -");
    }
    for record in records {
        println!("  [{}] {}", record.id(), record.describe_at(now, true));
    }
}

pub fn output_vehicle_detail(
    output_format: OutputFormat,
    vehicle: &Vehicle,
    selected: bool,
    now: DateTime<Local>,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&VehicleDetail {
            vehicle: vehicle.to_snapshot(),
            status: vehicle.status(),
            selected,
        });
    }

    let title = vehicle.label();
    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
    println!("ID:           {}", vehicle.id());
    println!("Tipo:         {}", type_label(vehicle.tag()));
    if selected {
        println!("Selecionado:  sim");
    }
    print_status_lines(vehicle);
    println!();
    print_records("Histórico", &vehicle.completed_maintenance_at(now), now);
    print_records("Agendamentos", &vehicle.scheduled_maintenance_at(now), now);

    Ok(())
}

pub fn output_maintenance(
    output_format: OutputFormat,
    vehicle: &Vehicle,
    now: DateTime<Local>,
) -> Result<()> {
    let completed = vehicle.completed_maintenance_at(now);
    let scheduled = vehicle.scheduled_maintenance_at(now);

    if output_format == OutputFormat::Json {
        return print_json(&MaintenanceListing {
            completed: completed.iter().map(|m| m.to_snapshot()).collect(),
            scheduled: scheduled.iter().map(|m| m.to_snapshot()).collect(),
        });
    }

    println!("Manutenções: {}", vehicle.label());
    println!();
    print_records("Histórico", &completed, now);
    print_records("Agendamentos", &scheduled, now);
    Ok(())
}

/// Result of a drive or maintenance action
pub fn output_action(output_format: OutputFormat, vehicle: &Vehicle, message: &str) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&ActionOutcome {
            id: vehicle.id(),
            message,
            status: vehicle.status(),
        });
    }

    println!("{}", message);
    let status = vehicle.status();
    println!(
        "{}: {} - {:.0} km/h",
        vehicle.label(),
        if status.ignition_on { "ligado" } else { "desligado" },
        status.speed
    );
    Ok(())
}

pub fn output_reminders(output_format: OutputFormat, reminders: &[Reminder], lead_days: u32) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(reminders);
    }

    if reminders.is_empty() {
        println!("Nenhuma manutenção nos próximos {} dia(s).", lead_days);
        return Ok(());
    }

    for reminder in reminders {
        println!("{}", reminder.message);
    }
    println!();
    println!(
        "{} lembrete(s); próximo em {}",
        reminders.len(),
        format_day_month_time(&reminders[0].due)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Ônix", 20), "Ônix");
        assert_eq!(truncate("Caminhão Basculante Grande", 10), "Caminhã...");
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(type_label(VehicleTag::CargoCarrier), "Carga");
        assert_eq!(type_label(VehicleTag::PerformanceVariant), "Esportivo");
    }
}
