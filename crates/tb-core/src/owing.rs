//! Owed time: weekday proration of periods plus one-off date entries.
//!
//! A period says "every Tuesday, 2 hours". To prorate it against an arbitrary
//! report window we count how many times each weekday occurs in the
//! intersection of period and window, rather than scaling by elapsed time.
//!
//! # Civil days
//!
//! Weekday identity is a property of the local calendar, so the intersection
//! is converted to local wall-clock time before counting. All day arithmetic
//! then happens on naive local date-times: a day is a calendar day and the
//! distance between two readings is measured on the wall clock. A window that
//! spans a DST transition therefore neither repeats nor skips a day.

use chrono::{Datelike, Local, NaiveTime, TimeDelta, TimeZone};

use crate::document::{DateEntry, Document, Period, TagKey};
use crate::error::OverflowError;
use crate::totals::Totals;
use crate::window::ReportWindow;

/// Computes owed time per tag, bucketing weekdays in the system time zone.
pub fn compute_owed(document: &Document, window: &ReportWindow) -> Result<Totals, OverflowError> {
    compute_owed_in(document, window, &Local)
}

/// Computes owed time per tag, bucketing weekdays in `tz`.
///
/// A tag only gets a slot if at least one of its periods overlaps the window
/// or one of its date entries falls inside it.
pub fn compute_owed_in<Tz: TimeZone>(
    document: &Document,
    window: &ReportWindow,
    tz: &Tz,
) -> Result<Totals, OverflowError> {
    let mut owed = Totals::default();

    for (key, block) in document.iter() {
        for period in &block.periods {
            if let Some(delta) = prorate_period(key, period, window, tz)? {
                tracing::trace!(tag = %key, start = %period.start, end = %period.end, ?delta, "prorated period");
                owed.add_with_total(key, delta)?;
            }
        }

        for entry in matching_entries(&block.date_entries, window) {
            tracing::trace!(tag = %key, date = %entry.date, delta = ?entry.delta, "matched date entry");
            owed.add_with_total(key, entry.delta)?;
        }
    }

    Ok(owed)
}

/// Owed time for one period of `key` within the window.
///
/// Returns `None` when the period does not overlap the window or no day of
/// the overlap could be counted.
fn prorate_period<Tz: TimeZone>(
    key: &TagKey,
    period: &Period,
    window: &ReportWindow,
    tz: &Tz,
) -> Result<Option<TimeDelta>, OverflowError> {
    let Some((start, end)) = window.intersect(period.start, period.end) else {
        return Ok(None);
    };
    let anchor = start.with_timezone(tz).date_naive();
    let end = end.with_timezone(tz).naive_local();
    let overflow = || OverflowError { tag: key.clone() };

    let mut owed = None;
    for day in anchor.iter_days().take(7) {
        let day_start = day.and_time(NaiveTime::MIN);
        if day_start >= end {
            break;
        }
        // Ceiling division: a partial trailing week still counts.
        let occurrences = i32::try_from(((end - day_start).num_days() + 6) / 7)
            .map_err(|_| overflow())?;
        let per_day = period.weekday_deltas[day.weekday().num_days_from_monday() as usize];
        let delta = per_day.checked_mul(occurrences).ok_or_else(overflow)?;
        let sum = owed
            .unwrap_or_else(TimeDelta::zero)
            .checked_add(&delta)
            .ok_or_else(overflow)?;
        owed = Some(sum);
    }
    Ok(owed)
}

/// Date entries dated inside the window.
fn matching_entries<'a>(
    entries: &'a [DateEntry],
    window: &'a ReportWindow,
) -> impl Iterator<Item = &'a DateEntry> {
    entries.iter().filter(|entry| window.contains(entry.date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};
    use chrono_tz::America::New_York;

    use crate::document::TagKey;
    use crate::parser::parse_document_in;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn owed_for(src: &str, window: ReportWindow) -> Totals {
        let doc = parse_document_in(src, window.end, Utc).unwrap();
        compute_owed_in(&doc, &window, &Utc).unwrap()
    }

    fn work() -> TagKey {
        TagKey::named("work")
    }

    const EVERY_DAY: &str = "work { from 2024-01-01 { mon 1 tue 1 wed 1 thu 1 fri 1 sat 1 sun 1 } }";

    #[test]
    fn one_week_from_monday() {
        let window = ReportWindow::new(utc(2024, 1, 1, 0), utc(2024, 1, 8, 0));
        let owed = owed_for(
            "work { from 2024-01-01 to end of time { mon 8:00 tue 8:00 } }",
            window,
        );
        assert_eq!(owed.get(&work()), TimeDelta::hours(16));
        assert_eq!(owed.total(), TimeDelta::hours(16));
    }

    #[test]
    fn ten_days_count_two_mondays() {
        let window = ReportWindow::new(utc(2024, 1, 1, 0), utc(2024, 1, 11, 0));
        let owed = owed_for("work { from 2024-01-01 { mon 2:00 } }", window);
        assert_eq!(owed.get(&work()), TimeDelta::hours(4));
    }

    #[test]
    fn ten_days_of_every_weekday() {
        // Mon..Wed occur twice, Thu..Sun once.
        let window = ReportWindow::new(utc(2024, 1, 1, 0), utc(2024, 1, 11, 0));
        let owed = owed_for(EVERY_DAY, window);
        assert_eq!(owed.get(&work()), TimeDelta::hours(10));
    }

    #[test]
    fn sub_week_window_counts_only_its_days() {
        let window = ReportWindow::new(utc(2024, 1, 3, 0), utc(2024, 1, 5, 0));
        let owed = owed_for(EVERY_DAY, window);
        assert_eq!(owed.get(&work()), TimeDelta::hours(2));
    }

    #[test]
    fn start_is_truncated_to_midnight_and_partial_end_day_is_dropped() {
        // Wednesday noon to Thursday 06:00: Wednesday counts through the
        // midnight anchor, Thursday has less than a whole day left.
        let window = ReportWindow::new(utc(2024, 1, 3, 12), utc(2024, 1, 4, 6));
        let owed = owed_for("work { from 2024-01-01 { wed 3 thu 5 } }", window);
        assert_eq!(owed.get(&work()), TimeDelta::hours(3));
    }

    #[test]
    fn period_ending_inside_window_is_clipped() {
        let window = ReportWindow::new(utc(2024, 1, 1, 0), utc(2024, 1, 8, 0));
        let owed = owed_for(
            "work { from 2024-01-01 to 2024-01-03 { mon 1 tue 1 wed 1 thu 1 } }",
            window,
        );
        assert_eq!(owed.get(&work()), TimeDelta::hours(2));
    }

    #[test]
    fn chained_periods_switch_regime() {
        let window = ReportWindow::new(utc(2024, 1, 1, 0), utc(2024, 1, 15, 0));
        let owed = owed_for(
            "work { from 2024-01-01 { mon 8 } from 2024-01-08 { mon 4 } }",
            window,
        );
        assert_eq!(owed.get(&work()), TimeDelta::hours(12));
    }

    #[test]
    fn period_outside_window_gets_no_slot() {
        let window = ReportWindow::new(utc(2024, 3, 1, 0), utc(2024, 3, 8, 0));
        let owed = owed_for("work { from 2024-01-01 to 2024-02-01 { mon 8 } }", window);
        assert!(!owed.contains(&work()));
        assert_eq!(owed.total(), TimeDelta::zero());
    }

    #[test]
    fn negative_allotments_reduce_owed() {
        let window = ReportWindow::new(utc(2024, 1, 1, 0), utc(2024, 1, 8, 0));
        let owed = owed_for("work { from 2024-01-01 { mon 8 tue -2:30 } }", window);
        assert_eq!(owed.get(&work()), TimeDelta::minutes(330));
    }

    #[test]
    fn date_entries_respect_half_open_window() {
        let window = ReportWindow::new(utc(2024, 1, 1, 0), utc(2024, 1, 8, 0));
        let owed = owed_for(
            r#"work {
                2023-12-31 7
                2024-01-01 1 "first day"
                2024-01-08 5 "window end"
             }"#,
            window,
        );
        assert_eq!(owed.get(&work()), TimeDelta::hours(1));
    }

    #[test]
    fn periods_and_entries_add_up_across_tags() {
        let window = ReportWindow::new(utc(2024, 1, 1, 0), utc(2024, 1, 8, 0));
        let owed = owed_for(
            r#"work { from 2024-01-01 { mon 8 } 2024-01-02 -8 "holiday" }
               untagged { 2024-01-03 1 }
               "side project" { from 2024-01-01 { sat 2 } }"#,
            window,
        );
        assert_eq!(owed.get(&work()), TimeDelta::zero());
        assert!(owed.contains(&work()));
        assert_eq!(owed.get(&TagKey::Untagged), TimeDelta::hours(1));
        assert_eq!(owed.get(&TagKey::named("side project")), TimeDelta::hours(2));
        assert_eq!(owed.total(), TimeDelta::hours(3));
    }

    #[test]
    fn weekdays_are_bucketed_in_the_given_zone() {
        // Sunday 20:00 UTC is Monday 01:00 at UTC+5.
        let window = ReportWindow::new(utc(2024, 1, 7, 20), utc(2024, 1, 8, 20));
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let src = "work { from 2024-01-01 { mon 1 } }";

        let doc = parse_document_in(src, window.end, tz).unwrap();
        assert_eq!(
            compute_owed_in(&doc, &window, &tz).unwrap().get(&work()),
            TimeDelta::hours(1)
        );

        let doc = parse_document_in(src, window.end, Utc).unwrap();
        assert_eq!(
            compute_owed_in(&doc, &window, &Utc).unwrap().get(&work()),
            TimeDelta::zero()
        );
    }

    #[test]
    fn overflowing_date_entries_are_an_error() {
        let window = ReportWindow::new(utc(2024, 1, 1, 0), utc(2024, 1, 22, 0));
        let doc = parse_document_in(
            "work { 2024-01-02 2000000000000 2024-01-03 2000000000000 }",
            window.end,
            Utc,
        )
        .unwrap();
        let err = compute_owed_in(&doc, &window, &Utc).unwrap_err();
        assert_eq!(err.tag, work());
    }

    #[test]
    fn overflowing_proration_is_an_error() {
        let window = ReportWindow::new(utc(2024, 1, 1, 0), utc(2024, 1, 15, 0));
        let doc = parse_document_in(
            "work { from 2024-01-01 { mon 2000000000000 tue 8 } }",
            window.end,
            Utc,
        )
        .unwrap();
        let err = compute_owed_in(&doc, &window, &Utc).unwrap_err();
        assert_eq!(err.tag, work());
    }

    #[test]
    fn large_allotment_in_range_is_kept() {
        let window = ReportWindow::new(utc(2024, 1, 1, 0), utc(2024, 1, 8, 0));
        let owed = owed_for("work { from 2024-01-01 { mon 2000000000000 } }", window);
        assert_eq!(owed.get(&work()), TimeDelta::hours(2_000_000_000_000));
        assert_eq!(owed.total(), TimeDelta::hours(2_000_000_000_000));
    }

    /// One bit per weekday: the sum identifies exactly which days counted.
    const WEEKDAY_BITS: &str =
        "work { from 2024-01-01 { mon 1 tue 2 wed 4 thu 8 fri 16 sat 32 sun 64 } }";

    fn owed_in_new_york(from: (u32, u32), to: (u32, u32)) -> TimeDelta {
        let local = |(m, d): (u32, u32)| {
            New_York
                .with_ymd_and_hms(2024, m, d, 0, 0, 0)
                .unwrap()
                .with_timezone(&Utc)
        };
        let window = ReportWindow::new(local(from), local(to));
        let doc = parse_document_in(WEEKDAY_BITS, window.end, New_York).unwrap();
        compute_owed_in(&doc, &window, &New_York)
            .unwrap()
            .get(&work())
    }

    #[test]
    fn spring_forward_week_counts_each_weekday_once() {
        // 2024-03-10 is 23 hours long in New York.
        assert_eq!(owed_in_new_york((3, 9), (3, 16)), TimeDelta::hours(127));
        assert_eq!(owed_in_new_york((3, 10), (3, 11)), TimeDelta::hours(64));
    }

    #[test]
    fn fall_back_week_counts_each_weekday_once() {
        // 2024-11-03 is 25 hours long in New York.
        assert_eq!(owed_in_new_york((11, 2), (11, 9)), TimeDelta::hours(127));
        assert_eq!(owed_in_new_york((11, 3), (11, 4)), TimeDelta::hours(64));
    }
}
