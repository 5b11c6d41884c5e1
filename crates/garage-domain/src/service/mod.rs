//! Domain services

pub mod reminders;

pub use reminders::{
    scan_upcoming, upcoming_reminders, Reminder, ReminderBucket, DEFAULT_LEAD_DAYS,
};
