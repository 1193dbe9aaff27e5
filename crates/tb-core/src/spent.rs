//! Spent time aggregated from tracked intervals.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};

use crate::document::TagKey;
use crate::error::OverflowError;
use crate::totals::Totals;

/// A tracked time interval as reported by Timewarrior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedInterval {
    pub id: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub tags: BTreeSet<String>,
}

impl TrackedInterval {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Sums interval durations per tag.
///
/// Every interval counts towards the grand total and towards each of its
/// tags. Only intervals with no tags at all count towards
/// [`TagKey::Untagged`].
pub fn aggregate_spent<'a, I>(intervals: I) -> Result<Totals, OverflowError>
where
    I: IntoIterator<Item = &'a TrackedInterval>,
{
    let mut spent = Totals::default();
    let mut count = 0usize;

    for interval in intervals {
        let duration = interval.duration();
        spent.add(TagKey::Total, duration)?;
        if interval.tags.is_empty() {
            spent.add(TagKey::Untagged, duration)?;
        }
        for tag in &interval.tags {
            spent.add(TagKey::named(tag.as_str()), duration)?;
        }
        count += 1;
    }

    tracing::debug!(intervals = count, "aggregated spent time");
    Ok(spent)
}
