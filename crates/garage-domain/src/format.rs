//! pt-BR display helpers

use chrono::{DateTime, Local};

/// Format a value as Brazilian reais, e.g. `R$ 1.234,50`
pub fn format_brl(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let integer = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{:02}", sign, grouped, fraction)
}

/// `25/12/2023`
pub fn format_date(dt: &DateTime<Local>) -> String {
    dt.format("%d/%m/%Y").to_string()
}

/// `10:30`
pub fn format_time(dt: &DateTime<Local>) -> String {
    dt.format("%H:%M").to_string()
}

/// `25/12 às 10:30`, used by reminders
pub fn format_day_month_time(dt: &DateTime<Local>) -> String {
    format!("{} às {}", dt.format("%d/%m"), format_time(dt))
}
