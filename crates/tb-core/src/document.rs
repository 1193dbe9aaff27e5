//! Parsed allotment document.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};

/// Key of an accumulator slot.
///
/// Named tags order before the two meta slots, so iterating a sorted map
/// yields tags alphabetically, then [`TagKey::Untagged`], then
/// [`TagKey::Total`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagKey {
    /// A literal Timewarrior tag.
    Named(String),
    /// Intervals carrying no tags at all.
    Untagged,
    /// Grand total across everything.
    Total,
}

impl TagKey {
    pub fn named(tag: impl Into<String>) -> Self {
        Self::Named(tag.into())
    }

    /// Label used when reporting this key.
    pub fn label(&self) -> &str {
        match self {
            Self::Named(tag) => tag,
            Self::Untagged => "<untagged>",
            Self::Total => "TOTAL",
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(tag) => write!(f, "{tag:?}"),
            Self::Untagged | Self::Total => f.write_str(self.label()),
        }
    }
}

impl Serialize for TagKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

/// A date range with a recurring per-weekday allotment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    /// Exclusive end. Always concrete once parsing has finished.
    pub end: DateTime<Utc>,
    /// Hours owed on each weekday, indexed Monday = 0 through Sunday = 6.
    pub weekday_deltas: [TimeDelta; 7],
}

/// A one-off allotment adjustment on a single date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEntry {
    /// Local midnight of the date, as an absolute instant.
    pub date: DateTime<Utc>,
    pub delta: TimeDelta,
    pub note: String,
}

/// Allotment schedule for one tag, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBlock {
    pub periods: Vec<Period>,
    pub date_entries: Vec<DateEntry>,
}

/// A parsed allotment file: one [`TagBlock`] per distinct tag key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: BTreeMap<TagKey, TagBlock>,
}

impl Document {
    /// Inserts a block, handing it back if the key is already present.
    pub(crate) fn insert(&mut self, key: TagKey, block: TagBlock) -> Result<(), TagBlock> {
        if self.blocks.contains_key(&key) {
            return Err(block);
        }
        self.blocks.insert(key, block);
        Ok(())
    }

    pub fn get(&self, key: &TagKey) -> Option<&TagBlock> {
        self.blocks.get(key)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates blocks ordered by tag key.
    pub fn iter(&self) -> impl Iterator<Item = (&TagKey, &TagBlock)> {
        self.blocks.iter()
    }
}
