//! Spent vs. owed comparison rows.

use std::collections::BTreeSet;

use chrono::TimeDelta;

use crate::document::{Document, TagKey};
use crate::error::OverflowError;
use crate::owing::compute_owed;
use crate::spent::{TrackedInterval, aggregate_spent};
use crate::totals::Totals;
use crate::window::ReportWindow;

/// Spent and owed time for one tag key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRow {
    pub key: TagKey,
    pub spent: TimeDelta,
    pub owed: TimeDelta,
}

/// The full comparison: one row per tag key plus the grand total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// Named tags in sorted order, followed by the untagged row if either side
    /// touched it.
    pub rows: Vec<BalanceRow>,
    pub total: BalanceRow,
}

impl Balance {
    /// Pairs spent and owed totals over the union of their keys.
    pub fn assemble(spent: &Totals, owed: &Totals) -> Self {
        let keys: BTreeSet<&TagKey> = spent
            .keys()
            .chain(owed.keys())
            .filter(|key| **key != TagKey::Total)
            .collect();

        let row = |key: &TagKey| BalanceRow {
            key: key.clone(),
            spent: spent.get(key),
            owed: owed.get(key),
        };

        Self {
            rows: keys.into_iter().map(row).collect(),
            total: row(&TagKey::Total),
        }
    }

    /// Runs the whole engine: owed time from `document`, spent time from
    /// `intervals`, compared over `window`.
    pub fn compute<'a, I>(
        document: &Document,
        window: &ReportWindow,
        intervals: I,
    ) -> Result<Self, OverflowError>
    where
        I: IntoIterator<Item = &'a TrackedInterval>,
    {
        let owed = compute_owed(document, window)?;
        let spent = aggregate_spent(intervals)?;
        Ok(Self::assemble(&spent, &owed))
    }
}
