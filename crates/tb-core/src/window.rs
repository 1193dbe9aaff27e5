//! Report window.

use chrono::{DateTime, Utc};

/// Half-open time range `[start, end)` a balance is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true if `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Intersects `[start, end)` with the window.
    ///
    /// Returns `None` only when the intersection is inverted; a zero-length
    /// intersection is still returned.
    pub fn intersect(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = start.max(self.start);
        let end = end.min(self.end);
        (start <= end).then_some((start, end))
    }
}
