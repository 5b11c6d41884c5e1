//! Lenient timestamp parsing with an explicit invalid state

use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc,
};

/// Local date-time layouts accepted from user input (no offset)
const LOCAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Raw input for a point in time
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampInput {
    Instant(DateTime<Local>),
    Text(String),
    Missing,
}

impl From<DateTime<Local>> for TimestampInput {
    fn from(value: DateTime<Local>) -> Self {
        TimestampInput::Instant(value)
    }
}

impl From<DateTime<Utc>> for TimestampInput {
    fn from(value: DateTime<Utc>) -> Self {
        TimestampInput::Instant(value.with_timezone(&Local))
    }
}

impl From<&str> for TimestampInput {
    fn from(value: &str) -> Self {
        TimestampInput::Text(value.to_string())
    }
}

impl From<String> for TimestampInput {
    fn from(value: String) -> Self {
        TimestampInput::Text(value)
    }
}

impl<T: Into<TimestampInput>> From<Option<T>> for TimestampInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(TimestampInput::Missing)
    }
}

/// A point in time, or the marker for input that could not be read as one.
///
/// Valid instants are kept at millisecond precision, which is what the
/// stored ISO form carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Valid(DateTime<Local>),
    Invalid,
}

impl Timestamp {
    /// Parse any accepted input; never fails, unreadable input is `Invalid`
    pub fn parse(input: impl Into<TimestampInput>) -> Self {
        let parsed = match input.into() {
            TimestampInput::Instant(dt) => Some(dt),
            TimestampInput::Text(text) => {
                let parsed = parse_text(&text);
                if parsed.is_none() {
                    tracing::warn!(input = %text, "text did not parse as a date");
                }
                parsed
            }
            TimestampInput::Missing => None,
        };

        match parsed {
            Some(dt) => Timestamp::Valid(dt.trunc_subsecs(3)),
            None => Timestamp::Invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Timestamp::Valid(_))
    }

    pub fn as_datetime(&self) -> Option<DateTime<Local>> {
        match self {
            Timestamp::Valid(dt) => Some(*dt),
            Timestamp::Invalid => None,
        }
    }

    /// UTC ISO-8601 with milliseconds, `None` when invalid
    pub fn to_iso(&self) -> Option<String> {
        self.as_datetime()
            .map(|dt| dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

fn parse_text(raw: &str) -> Option<DateTime<Local>> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local));
    }

    for format in LOCAL_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Local.from_local_datetime(&naive).earliest();
        }
    }

    // Date only: local midnight
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}
