//! Historical statistics supplied by the event store

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of hour-of-day buckets in an activity histogram
pub const HOURS_PER_DAY: usize = 24;

/// Time window the statistics cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window length in days, counted back from now
    pub days: u32,
}

impl TimeWindow {
    /// Window covering the last `days` days
    pub fn last_days(days: u32) -> Self {
        Self { days }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::last_days(30)
    }
}

/// Directed co-occurrence: `second` changed shortly after `first`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoOccurrence {
    /// Earlier node
    pub first: String,

    /// Later node
    pub second: String,

    /// Number of observed co-occurrences in the window
    pub count: u64,
}

/// Raw statistics as returned by the provider
///
/// Activity histograms are kept as plain vectors so malformed provider
/// output (wrong bucket count) can be detected and skipped downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalStats {
    /// Pairwise co-occurrence counts
    #[serde(default)]
    pub co_occurrences: Vec<CoOccurrence>,

    /// Per-node hour-of-day event counts (24 buckets expected)
    #[serde(default)]
    pub activity: BTreeMap<String, Vec<u64>>,
}

impl HistoricalStats {
    /// Whether the provider returned nothing at all
    pub fn is_empty(&self) -> bool {
        self.co_occurrences.is_empty() && self.activity.is_empty()
    }
}
