//! Maintenance record (one service event or appointment)

use chrono::{DateTime, Local};
use garage_types::ValidationError;

use super::snapshot::{MaintenanceSnapshot, RecordTag, StoredCost};
use super::timestamp::{Timestamp, TimestampInput};
use crate::format::{format_brl, format_date, format_time};

/// Raw cost input as it arrives from a form or from storage
#[derive(Debug, Clone, PartialEq)]
pub enum CostInput {
    Missing,
    Number(f64),
    Text(String),
}

impl From<f64> for CostInput {
    fn from(value: f64) -> Self {
        CostInput::Number(value)
    }
}

impl From<u32> for CostInput {
    fn from(value: u32) -> Self {
        CostInput::Number(f64::from(value))
    }
}

impl From<&str> for CostInput {
    fn from(value: &str) -> Self {
        CostInput::Text(value.to_string())
    }
}

impl From<String> for CostInput {
    fn from(value: String) -> Self {
        CostInput::Text(value)
    }
}

impl From<StoredCost> for CostInput {
    fn from(value: StoredCost) -> Self {
        match value {
            StoredCost::Number(n) => CostInput::Number(n),
            StoredCost::Text(s) => CostInput::Text(s),
        }
    }
}

impl<T: Into<CostInput>> From<Option<T>> for CostInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CostInput::Missing)
    }
}

impl CostInput {
    /// Resolve to a non-negative amount; anything unusable becomes 0
    pub fn coerce(self) -> f64 {
        let parsed = match self {
            CostInput::Missing => None,
            CostInput::Number(n) => Some(n),
            CostInput::Text(text) if text.trim().is_empty() => None,
            CostInput::Text(text) => parse_cost_text(&text),
        };

        match parsed {
            Some(n) if n.is_finite() && n >= 0.0 => n,
            _ => 0.0,
        }
    }
}

/// Accepts `"150,50"`, `"R$ 99.90"` and similar: the first comma is the
/// decimal separator, everything but digits, `.` and `-` is dropped, and
/// the longest leading number wins.
fn parse_cost_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .replacen(',', ".", 1)
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    leading_number(&cleaned)
}

fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }
    s[..end].parse().ok()
}

/// One maintenance event. Construction never fails; an unreadable date
/// leaves the record in an invalid state that `validate` reports.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceRecord {
    id: String,
    timestamp: Timestamp,
    kind: String,
    cost: f64,
    description: String,
}

impl MaintenanceRecord {
    pub fn new(
        timestamp: impl Into<TimestampInput>,
        kind: &str,
        cost: impl Into<CostInput>,
        description: Option<&str>,
    ) -> Self {
        Self {
            id: crate::new_id(),
            timestamp: Timestamp::parse(timestamp),
            kind: kind.trim().to_string(),
            cost: cost.into().coerce(),
            description: description.map(str::trim).unwrap_or_default().to_string(),
        }
    }

    /// Restore the identity a record had before it was stored
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_valid(&self) -> bool {
        self.timestamp.is_valid()
    }

    /// Valid and strictly after `now`
    pub fn is_scheduled_at(&self, now: DateTime<Local>) -> bool {
        self.timestamp.as_datetime().is_some_and(|dt| dt > now)
    }

    pub fn describe(&self, include_time: bool) -> String {
        self.describe_at(Local::now(), include_time)
    }

    /// e.g. `Troca de óleo em 25/12/2023 às 10:30 - R$ 150,50 (Filtro incluído)`
    pub fn describe_at(&self, now: DateTime<Local>, include_time: bool) -> String {
        let suffix = if self.description.is_empty() {
            String::new()
        } else {
            format!(" ({})", self.description)
        };

        match self.timestamp.as_datetime() {
            Some(dt) => {
                let mut date = format_date(&dt);
                if include_time {
                    date.push_str(" às ");
                    date.push_str(&format_time(&dt));
                }
                format!("{} em {} - {}{}", self.kind, date, self.format_cost_at(now), suffix)
            }
            None => {
                let kind = if self.kind.is_empty() {
                    "Tipo Indefinido"
                } else {
                    &self.kind
                };
                format!("{} - Data Inválida - {}{}", kind, self.format_cost_at(now), suffix)
            }
        }
    }

    pub fn format_cost(&self) -> String {
        self.format_cost_at(Local::now())
    }

    /// Zero cost reads as "Agendado" for future appointments, "Grátis" otherwise
    pub fn format_cost_at(&self, now: DateTime<Local>) -> String {
        if self.cost == 0.0 {
            if self.is_scheduled_at(now) {
                return "Agendado".to_string();
            }
            return "Grátis".to_string();
        }
        format_brl(self.cost)
    }

    /// Date and kind are required; cost and description never fail
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.is_valid() {
            return Err(ValidationError::InvalidDate);
        }
        if self.kind.trim().is_empty() {
            return Err(ValidationError::EmptyKind);
        }
        Ok(())
    }

    pub fn to_snapshot(&self) -> MaintenanceSnapshot {
        MaintenanceSnapshot {
            tag: RecordTag::MaintenanceRecord,
            timestamp_iso: self.timestamp.to_iso(),
            kind: self.kind.clone(),
            cost: Some(StoredCost::Number(self.cost)),
            description: Some(self.description.clone()),
            id: Some(self.id.clone()),
        }
    }

    /// Rebuild through the normal constructor, keeping the stored id
    pub fn from_snapshot(snapshot: MaintenanceSnapshot) -> Self {
        let record = Self::new(
            snapshot.timestamp_iso,
            &snapshot.kind,
            snapshot.cost,
            snapshot.description.as_deref(),
        );
        match snapshot.id {
            Some(id) if !id.is_empty() => record.with_id(id),
            _ => record,
        }
    }
}
