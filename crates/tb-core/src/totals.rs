//! Per-tag duration accumulators.

use std::collections::BTreeMap;

use chrono::TimeDelta;

use crate::document::TagKey;
use crate::error::OverflowError;

/// Durations accumulated per [`TagKey`].
///
/// The [`TagKey::Total`] slot holds the grand total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Totals {
    slots: BTreeMap<TagKey, TimeDelta>,
}

impl Totals {
    /// Adds `delta` to a single slot.
    ///
    /// Fails, leaving the slot untouched, if the sum is out of range.
    pub fn add(&mut self, key: TagKey, delta: TimeDelta) -> Result<(), OverflowError> {
        let Some(sum) = self.get(&key).checked_add(&delta) else {
            return Err(OverflowError { tag: key });
        };
        self.slots.insert(key, sum);
        Ok(())
    }

    /// Adds `delta` to a tag's slot and to the grand total.
    pub fn add_with_total(&mut self, key: &TagKey, delta: TimeDelta) -> Result<(), OverflowError> {
        self.add(key.clone(), delta)?;
        self.add(TagKey::Total, delta)
    }

    /// Accumulated duration for `key`, zero if never touched.
    pub fn get(&self, key: &TagKey) -> TimeDelta {
        self.slots.get(key).copied().unwrap_or_else(TimeDelta::zero)
    }

    /// The grand total.
    pub fn total(&self) -> TimeDelta {
        self.get(&TagKey::Total)
    }

    /// Returns true if `key` has been touched, even by a zero duration.
    pub fn contains(&self, key: &TagKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TagKey> {
        self.slots.keys()
    }
}
