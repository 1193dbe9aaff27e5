//! Timewarrior extension input.
//!
//! Timewarrior feeds report extensions a block of `name: value` settings,
//! followed by the tracked intervals as a JSON array.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use tb_core::{ReportWindow, TrackedInterval, parse_timestamp};

/// Setting holding the report start, empty when unbounded.
const REPORT_START: &str = "temp.report.start";
/// Setting holding the report end, empty when open-ended.
const REPORT_END: &str = "temp.report.end";
/// Setting holding the Timewarrior data directory.
const DATA_DIR: &str = "temp.db";

/// Parsed extension input.
#[derive(Debug, Clone)]
pub struct TimewInput {
    pub settings: BTreeMap<String, String>,
    pub window: ReportWindow,
    pub intervals: Vec<TrackedInterval>,
}

impl TimewInput {
    /// The Timewarrior data directory, if Timewarrior reported one.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.settings
            .get(DATA_DIR)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: u64,
    start: String,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Reads extension input from `reader`.
///
/// `now` closes an open-ended report and any interval still being tracked.
pub fn read_input<R: Read>(mut reader: R, now: DateTime<Utc>) -> Result<TimewInput> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("failed to read extension input")?;
    parse_input(&text, now)
}

/// Parses extension input already held in memory.
pub fn parse_input(text: &str, now: DateTime<Utc>) -> Result<TimewInput> {
    let (settings, json) = split_settings(text);

    let start = match settings.get(REPORT_START).map(String::as_str) {
        None | Some("") => unbounded_start(),
        Some(value) => parse_timestamp(value, "report start time")?,
    };
    let end = match settings.get(REPORT_END).map(String::as_str) {
        None | Some("") => now,
        Some(value) => parse_timestamp(value, "report end time")?,
    };

    let entries: Vec<RawEntry> =
        serde_json::from_str(json).context("invalid JSON in interval list")?;
    let intervals = entries
        .into_iter()
        .map(|entry| into_interval(entry, now))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        settings = settings.len(),
        intervals = intervals.len(),
        %start,
        %end,
        "read extension input"
    );

    Ok(TimewInput {
        settings,
        window: ReportWindow::new(start, end),
        intervals,
    })
}

/// Splits leading `name: value` lines from the JSON that follows them.
fn split_settings(text: &str) -> (BTreeMap<String, String>, &str) {
    let mut settings = BTreeMap::new();
    let mut rest = text;
    while let Some((line, tail)) = rest.split_once('\n') {
        let Some((name, value)) = line.split_once(": ") else {
            break;
        };
        if name.is_empty() {
            break;
        }
        settings.insert(name.to_string(), value.to_string());
        rest = tail;
    }
    (settings, rest)
}

/// Earliest representable report start, one day clear of the minimum so
/// conversion to local time cannot overflow.
fn unbounded_start() -> DateTime<Utc> {
    DateTime::<Utc>::MIN_UTC + TimeDelta::days(1)
}

fn into_interval(entry: RawEntry, now: DateTime<Utc>) -> Result<TrackedInterval> {
    let start = parse_timestamp(&entry.start, &format!("start time for @{}", entry.id))?;
    let end = match &entry.end {
        Some(end) => parse_timestamp(end, &format!("end time for @{}", entry.id))?,
        None => now,
    };
    Ok(TrackedInterval {
        id: entry.id,
        start,
        end,
        tags: entry.tags.into_iter().collect::<BTreeSet<_>>(),
    })
}
