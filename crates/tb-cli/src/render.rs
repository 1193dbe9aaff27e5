//! Report rendering: aligned text table and JSON.

use std::cmp::Ordering;
use std::fmt::Write;

use anyhow::Result;
use chrono::{Local, TimeDelta};
use serde::Serialize;
use tb_core::{Balance, BalanceRow, ReportWindow, TagKey};

const HEADER: [&str; 4] = ["Tag", "Spent", "Allotted", "Balance"];
const GAP: usize = 2;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const HALF_MINUTE_NANOS: i64 = 30 * NANOS_PER_SECOND;

/// Rounds a duration to whole minutes, ties to even.
///
/// Sub-second precision takes part in the rounding.
pub fn to_minutes(delta: TimeDelta) -> i64 {
    // Both parts share the sign of `delta`; normalize to a non-negative
    // fraction below one second.
    let mut seconds = delta.num_seconds();
    let mut nanos = i64::from(delta.subsec_nanos());
    if nanos < 0 {
        seconds -= 1;
        nanos += NANOS_PER_SECOND;
    }

    let minutes = seconds.div_euclid(60);
    let remainder = seconds.rem_euclid(60) * NANOS_PER_SECOND + nanos;
    match remainder.cmp(&HALF_MINUTE_NANOS) {
        Ordering::Greater => minutes + 1,
        Ordering::Equal if minutes % 2 != 0 => minutes + 1,
        _ => minutes,
    }
}

/// Formats minutes as `H:MM`, with a leading `+` on non-negative values when
/// `explicit_sign` is set.
pub fn format_hours(minutes: i64, explicit_sign: bool) -> String {
    let sign = if minutes < 0 {
        "-"
    } else if explicit_sign {
        "+"
    } else {
        ""
    };
    let magnitude = minutes.unsigned_abs();
    format!("{sign}{}:{:02}", magnitude / 60, magnitude % 60)
}

/// A row with durations already rounded to minutes.
#[derive(Debug, Serialize)]
struct MinuteRow<'a> {
    tag: &'a TagKey,
    spent_minutes: i64,
    allotted_minutes: i64,
    balance_minutes: i64,
}

impl<'a> MinuteRow<'a> {
    fn new(row: &'a BalanceRow) -> Self {
        let spent_minutes = to_minutes(row.spent);
        let allotted_minutes = to_minutes(row.owed);
        Self {
            tag: &row.key,
            spent_minutes,
            allotted_minutes,
            balance_minutes: spent_minutes - allotted_minutes,
        }
    }

    fn cells(&self) -> [String; 4] {
        [
            self.tag.label().to_string(),
            format_hours(self.spent_minutes, false),
            format_hours(self.allotted_minutes, false),
            format_hours(self.balance_minutes, true),
        ]
    }
}

/// Rows to display: named tags, then the untagged bucket when it holds
/// anything after rounding.
fn visible_rows(balance: &Balance) -> Vec<MinuteRow<'_>> {
    balance
        .rows
        .iter()
        .map(MinuteRow::new)
        .filter(|row| {
            *row.tag != TagKey::Untagged || row.spent_minutes != 0 || row.allotted_minutes != 0
        })
        .collect()
}

/// Formats the balance as right-aligned columns with a separated total.
pub fn format_table(balance: &Balance) -> String {
    let rows: Vec<[String; 4]> = visible_rows(balance).iter().map(MinuteRow::cells).collect();
    let total = MinuteRow::new(&balance.total).cells();

    let widths: [usize; 4] = std::array::from_fn(|i| {
        rows.iter()
            .chain(std::iter::once(&total))
            .map(|cells| cells[i].chars().count())
            .chain(std::iter::once(HEADER[i].len()))
            .max()
            .unwrap_or(0)
    });

    let line = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:>width$}"))
            .collect::<Vec<_>>()
            .join(&" ".repeat(GAP))
    };
    let rule = widths
        .iter()
        .map(|width| "─".repeat(*width))
        .collect::<Vec<_>>()
        .join(&"─".repeat(GAP));

    let mut output = String::new();
    writeln!(output, "{}", line(&HEADER)).unwrap();
    writeln!(output, "{rule}").unwrap();
    for cells in &rows {
        writeln!(output, "{}", line(&cells.each_ref().map(String::as_str))).unwrap();
    }
    writeln!(output, "{rule}").unwrap();
    writeln!(output, "{}", line(&total.each_ref().map(String::as_str))).unwrap();
    output
}

/// Formats the full human-readable report: window bounds, then the table.
pub fn format_report(balance: &Balance, window: &ReportWindow) -> String {
    const CTIME: &str = "%a %b %e %H:%M:%S %Y";

    let mut output = String::new();
    writeln!(
        output,
        "Start: {}",
        window.start.with_timezone(&Local).format(CTIME)
    )
    .unwrap();
    writeln!(
        output,
        "  End: {}",
        window.end.with_timezone(&Local).format(CTIME)
    )
    .unwrap();
    writeln!(output).unwrap();
    output.push_str(&format_table(balance));
    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    start: String,
    end: String,
    timezone: &'a str,
    rows: Vec<MinuteRow<'a>>,
    total: MinuteRow<'a>,
}

/// Formats the balance as pretty-printed JSON.
pub fn format_json(balance: &Balance, window: &ReportWindow, timezone: &str) -> Result<String> {
    let report = JsonReport {
        start: window.start.to_rfc3339(),
        end: window.end.to_rfc3339(),
        timezone,
        rows: visible_rows(balance),
        total: MinuteRow::new(&balance.total),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
