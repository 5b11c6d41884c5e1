//! Upcoming-maintenance reminder scan

use chrono::{DateTime, Days, Local};
use serde::Serialize;

use crate::format::format_day_month_time;
use crate::model::Vehicle;

/// Default look-ahead in days
pub const DEFAULT_LEAD_DAYS: u32 = 2;

/// How soon a reminder is due, relative to the scan time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReminderBucket {
    UnderThirtyMinutes,
    UnderOneHour,
    Today { hours: i64 },
    /// Next calendar day but not after `now` (clock skew); bucketed by hours
    NextHours { hours: i64 },
    Tomorrow,
    InDays { days: i64 },
}

impl ReminderBucket {
    pub fn label(&self) -> String {
        match self {
            ReminderBucket::UnderThirtyMinutes => "em MENOS DE 30 MINUTOS".to_string(),
            ReminderBucket::UnderOneHour => "em MENOS DE 1 HORA".to_string(),
            ReminderBucket::Today { hours } => format!("HOJE (~{}h)", hours),
            ReminderBucket::NextHours { hours } => format!("nas PRÓXIMAS {} HORAS", hours),
            ReminderBucket::Tomorrow => "AMANHÃ".to_string(),
            ReminderBucket::InDays { days } => format!("em {} dia(s)", days),
        }
    }
}

/// One upcoming maintenance appointment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub due: DateTime<Local>,
    pub vehicle_id: String,
    pub vehicle_model: String,
    pub kind: String,
    pub bucket: ReminderBucket,
    pub message: String,
}

/// Reminders for every valid record due between the start of today and the
/// end of day `lead_days` from today, soonest first.
pub fn upcoming_reminders(vehicles: &[Vehicle], now: DateTime<Local>, lead_days: u32) -> Vec<Reminder> {
    let today = now.date_naive();
    let last_day = today
        .checked_add_days(Days::new(u64::from(lead_days)))
        .unwrap_or(today);

    let mut reminders: Vec<Reminder> = vehicles
        .iter()
        .flat_map(|vehicle| {
            vehicle
                .maintenance_history()
                .iter()
                .filter_map(move |record| {
                    let due = record.timestamp().as_datetime()?;
                    let due_day = due.date_naive();
                    if due_day < today || due_day > last_day {
                        return None;
                    }
                    let bucket = bucket_for(due, now)?;
                    let message = format!(
                        "Lembrete: {} p/ {} {} ({}).",
                        record.kind(),
                        vehicle.model(),
                        bucket.label(),
                        format_day_month_time(&due)
                    );
                    Some(Reminder {
                        due,
                        vehicle_id: vehicle.id().to_string(),
                        vehicle_model: vehicle.model().to_string(),
                        kind: record.kind().to_string(),
                        bucket,
                        message,
                    })
                })
        })
        .collect();

    reminders.sort_by_key(|r| r.due);
    if !reminders.is_empty() {
        tracing::debug!(count = reminders.len(), "upcoming maintenance found");
    }
    reminders
}

/// Rendered reminder strings, soonest first
pub fn scan_upcoming(vehicles: &[Vehicle], now: DateTime<Local>, lead_days: u32) -> Vec<String> {
    upcoming_reminders(vehicles, now, lead_days)
        .into_iter()
        .map(|r| r.message)
        .collect()
}

/// `None` means the entry is suppressed (already past today)
fn bucket_for(due: DateTime<Local>, now: DateTime<Local>) -> Option<ReminderBucket> {
    let day_diff = (due.date_naive() - now.date_naive()).num_days();
    let remaining = due - now;
    let remaining_ms = remaining.num_milliseconds();

    match day_diff {
        0 => {
            if remaining_ms < 0 {
                None
            } else if remaining.num_minutes() < 30 {
                Some(ReminderBucket::UnderThirtyMinutes)
            } else if remaining.num_minutes() < 60 {
                Some(ReminderBucket::UnderOneHour)
            } else {
                let hours = (remaining_ms as f64 / 3_600_000.0).round() as i64;
                Some(ReminderBucket::Today { hours: hours.max(1) })
            }
        }
        1 if due > now => Some(ReminderBucket::Tomorrow),
        1 => Some(ReminderBucket::NextHours {
            hours: remaining.num_hours().max(1),
        }),
        days if days > 1 => Some(ReminderBucket::InDays { days }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaintenanceRecord;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap()
    }

    fn car_with(model: &str, records: Vec<MaintenanceRecord>) -> Vehicle {
        Vehicle::base(model, "Prata")
            .unwrap()
            .with_maintenance_history(records)
    }

    fn at(offset: Duration, kind: &str) -> MaintenanceRecord {
        MaintenanceRecord::new(now() + offset, kind, 0.0, None)
    }

    #[test]
    fn test_twenty_minutes_ahead() {
        let car = car_with("Gol", vec![at(Duration::minutes(20), "Troca de óleo")]);
        let messages = scan_upcoming(&[car], now(), 2);
        assert_eq!(
            messages,
            vec!["Lembrete: Troca de óleo p/ Gol em MENOS DE 30 MINUTOS (15/05 às 10:20).".to_string()]
        );
    }

    #[test]
    fn test_same_day_buckets() {
        let car = car_with(
            "Gol",
            vec![
                at(Duration::minutes(45), "Lavagem"),
                at(Duration::hours(5), "Revisão"),
                at(Duration::hours(-2), "Passado"),
            ],
        );
        let reminders = upcoming_reminders(&[car], now(), 2);
        let buckets: Vec<_> = reminders.iter().map(|r| r.bucket).collect();
        assert_eq!(
            buckets,
            vec![ReminderBucket::UnderOneHour, ReminderBucket::Today { hours: 5 }]
        );
        assert!(reminders[1].message.contains("HOJE (~5h)"));
    }

    #[test]
    fn test_tomorrow_and_days() {
        let car = car_with(
            "Gol",
            vec![
                at(Duration::hours(23), "Pneus"),
                at(Duration::days(2), "Freios"),
            ],
        );
        let reminders = upcoming_reminders(&[car], now(), 2);
        assert_eq!(reminders[0].bucket, ReminderBucket::Tomorrow);
        assert!(reminders[0].message.contains("AMANHÃ"));
        assert_eq!(reminders[1].bucket, ReminderBucket::InDays { days: 2 });
        assert!(reminders[1].message.contains("em 2 dia(s)"));
    }

    #[test]
    fn test_outside_window_is_ignored() {
        let car = car_with(
            "Gol",
            vec![
                at(Duration::days(3), "Longe"),
                at(Duration::days(-1), "Ontem"),
                MaintenanceRecord::new("inválida", "Sem data", 0.0, None),
            ],
        );
        assert!(scan_upcoming(&[car.clone()], now(), 2).is_empty());
        assert_eq!(scan_upcoming(&[car], now(), 3).len(), 1);
    }

    #[test]
    fn test_sorted_across_vehicles() {
        let gol = car_with("Gol", vec![at(Duration::hours(30), "Pneus")]);
        let uno = car_with("Uno", vec![at(Duration::minutes(10), "Óleo")]);
        let reminders = upcoming_reminders(&[gol, uno], now(), 2);
        let models: Vec<_> = reminders.iter().map(|r| r.vehicle_model.as_str()).collect();
        assert_eq!(models, vec!["Uno", "Gol"]);
    }
}
