//! Timewarrior timestamp parsing.

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use thiserror::Error;

/// Timewarrior's compact UTC format, e.g. `20240101T083000Z`.
static TIMEW_DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})T([0-9]{2})([0-9]{2})([0-9]{2})Z$").unwrap()
});

/// An externally supplied timestamp could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unable to parse {field}: {value}")]
pub struct TimestampError {
    /// What the value was meant to be, e.g. `report start time`.
    pub field: String,
    pub value: String,
}

/// Parses a `YYYYMMDDTHHMMSSZ` timestamp.
///
/// `field` describes the value for diagnostics.
pub fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>, TimestampError> {
    let error = || TimestampError {
        field: field.to_string(),
        value: value.to_string(),
    };

    let caps = TIMEW_DATETIME_RE.captures(value).ok_or_else(error)?;
    let num = |i: usize| caps[i].parse::<u32>().map_err(|_| error());

    let year = i32::try_from(num(1)?).map_err(|_| error())?;
    Utc.with_ymd_and_hms(year, num(2)?, num(3)?, num(4)?, num(5)?, num(6)?)
        .single()
        .ok_or_else(error)
}
