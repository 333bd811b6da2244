//! Date values as they appear in project and task documents.
//!
//! A document date arrives in one of three shapes: a native instant, a
//! string, or a backend timestamp object (`{seconds, nanoseconds}`). All
//! shapes resolve through [`DateValue::calendar_day_in`] so call sites never
//! guess at the representation.
//!
//! Calendar days are always derived in the caller's time zone from the
//! local year/month/day components. Keying a day off a UTC rendering shifts
//! late-evening deadlines west of UTC onto the following day.

use std::fmt;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

const DAY_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A date-like document value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    /// A native date value: an absolute instant.
    Instant(DateTime<Utc>),
    /// A string as typed or stored; parsed lazily.
    Text(String),
    /// A backend timestamp object.
    Timestamp { seconds: i64, nanoseconds: u32 },
}

impl DateValue {
    /// Date-only text for a calendar day. Stays on that day in every zone.
    pub fn from_day(day: NaiveDate) -> Self {
        DateValue::Text(day_key(day))
    }

    /// Interpret a raw JSON value. Unknown shapes yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(raw) => {
                Some(match DateTime::parse_from_rfc3339(raw.trim()) {
                    Ok(at) => DateValue::Instant(at.with_timezone(&Utc)),
                    Err(_) => DateValue::Text(raw.clone()),
                })
            }
            serde_json::Value::Object(map) => {
                let seconds = map
                    .get("seconds")
                    .or_else(|| map.get("_seconds"))
                    .and_then(serde_json::Value::as_i64)?;
                let nanoseconds = map.get("nanoseconds").or_else(|| map.get("_nanoseconds"));
                let nanoseconds = match nanoseconds {
                    Some(raw) => u32::try_from(raw.as_u64()?).ok()?,
                    None => 0,
                };
                Some(DateValue::Timestamp {
                    seconds,
                    nanoseconds,
                })
            }
            _ => None,
        }
    }

    /// The calendar day this value falls on in `tz`, or `None` when the
    /// value cannot be resolved. Never panics.
    pub fn calendar_day_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        match self {
            DateValue::Instant(at) => Some(at.with_timezone(tz).date_naive()),
            DateValue::Timestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds)
                .map(|at| at.with_timezone(tz).date_naive()),
            DateValue::Text(raw) => parse_text(raw, tz).map(|parsed| parsed.day),
        }
    }

    /// The calendar day in the system local zone.
    pub fn calendar_day(&self) -> Option<NaiveDate> {
        self.calendar_day_in(&Local)
    }

    /// The absolute instant, reading date-only and naive text as wall-clock
    /// time in `tz`.
    pub fn instant_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        match self {
            DateValue::Instant(at) => Some(*at),
            DateValue::Timestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds),
            DateValue::Text(raw) => {
                let parsed = parse_text(raw, tz)?;
                if parsed.instant.is_some() {
                    return parsed.instant;
                }
                let naive = match parsed.wall_clock {
                    Some(naive) => naive,
                    None => parsed.day.and_hms_opt(0, 0, 0)?,
                };
                tz.from_local_datetime(&naive)
                    .earliest()
                    .map(|at| at.with_timezone(&Utc))
            }
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.instant_in(&Local)
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateValue::Instant(at) => write!(f, "{}", at.to_rfc3339()),
            DateValue::Text(raw) => write!(f, "{raw}"),
            DateValue::Timestamp {
                seconds,
                nanoseconds,
            } => write!(f, "{seconds}s+{nanoseconds}ns"),
        }
    }
}

impl Serialize for DateValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DateValue::Instant(at) => serializer.serialize_str(&at.to_rfc3339()),
            DateValue::Text(raw) => serializer.serialize_str(raw),
            DateValue::Timestamp {
                seconds,
                nanoseconds,
            } => {
                let mut state = serializer.serialize_struct("Timestamp", 2)?;
                state.serialize_field("seconds", seconds)?;
                state.serialize_field("nanoseconds", nanoseconds)?;
                state.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for DateValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        DateValue::from_json(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognized date value: {raw}")))
    }
}

/// Lenient field deserializer: unknown shapes become `None` instead of
/// failing the whole document.
pub fn deserialize_lenient<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateValue>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(DateValue::from_json))
}

/// Lenient instant deserializer for document timestamps.
pub fn deserialize_lenient_instant<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(deserialize_lenient(deserializer)?.and_then(|value| value.instant()))
}

/// `YYYY-MM-DD` key built from the date's own components.
pub fn day_key(day: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", day.year(), day.month(), day.day())
}

/// Parse a strict `YYYY-MM-DD` day.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DAY_FORMAT).ok()
}

/// Today in the system local zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

struct ParsedText {
    day: NaiveDate,
    instant: Option<DateTime<Utc>>,
    wall_clock: Option<NaiveDateTime>,
}

fn parse_text<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<ParsedText> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(day) = parse_day(trimmed) {
        return Some(ParsedText {
            day,
            instant: None,
            wall_clock: None,
        });
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ParsedText {
            day: at.with_timezone(tz).date_naive(),
            instant: Some(at.with_timezone(&Utc)),
            wall_clock: None,
        });
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| ParsedText {
            day: naive.date(),
            instant: None,
            wall_clock: Some(naive),
        })
}
