//! Bounded, most-recent-first history of archived routine periods.

use crate::{CalendarDate, HistoryEntry};
use serde::{Deserialize, Serialize};

/// Ordered history, newest entry first.
///
/// Only the tracker adds entries, and only on a reset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog(Vec<HistoryEntry>);

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap entries that are already ordered newest first
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self(entries)
    }

    /// Prepend `entry` and drop the oldest entries beyond `limit`
    pub fn record(&mut self, entry: HistoryEntry, limit: usize) {
        self.0.insert(0, entry);
        if self.0.len() > limit {
            let dropped = self.0.len() - limit;
            self.0.truncate(limit);
            tracing::debug!("History over limit {}, dropped {} oldest entries", limit, dropped);
        }
    }

    /// Whether any entry is dated `date`
    pub fn contains_date(&self, date: CalendarDate) -> bool {
        self.0.iter().any(|e| e.date == date)
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.0.iter()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
