//! Core domain types for recurring routines.
//!
//! This module defines the fundamental types used throughout the engine:
//! - Calendar dates and weekday sets
//! - Recurrence patterns
//! - History entries
//! - Tracker input snapshots

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A timezone-less calendar date. Comparisons are by calendar day only.
pub type CalendarDate = NaiveDate;

// ============================================================================
// Weekdays
// ============================================================================

/// Weekday index as used by recurrence patterns: 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(weekday: Weekday) -> u32 {
    weekday.num_days_from_sunday()
}

/// Inverse of [`weekday_index`]. Returns `None` for indices above 6.
pub fn weekday_from_index(index: u32) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// A non-empty set of weekdays.
///
/// Stored as a bitmask where bit `n` is weekday index `n` (0 = Sunday).
/// Serialized as an ascending list of indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Monday through Friday
    pub const WEEKDAYS: WeekdaySet = WeekdaySet(0b0011_1110);
    /// Sunday and Saturday
    pub const WEEKENDS: WeekdaySet = WeekdaySet(0b0100_0001);
    /// Monday only, the default for bare "weekly"
    pub const MONDAY: WeekdaySet = WeekdaySet(0b0000_0010);

    /// Build a set from weekdays. Returns `None` if the iterator is empty.
    pub fn from_weekdays<I: IntoIterator<Item = Weekday>>(days: I) -> Option<Self> {
        let mask = days
            .into_iter()
            .fold(0u8, |mask, day| mask | (1 << weekday_index(day)));
        (mask != 0).then_some(WeekdaySet(mask))
    }

    /// Whether the given index (0 = Sunday) is in the set
    pub fn contains_index(&self, index: u32) -> bool {
        index < 7 && self.0 & (1 << index) != 0
    }

    /// Indices in ascending order, Sunday first
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        (0..7).filter(move |i| self.contains_index(*i))
    }

    pub fn weekdays(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.indices().filter_map(weekday_from_index)
    }

    /// Lowest index in the set
    pub fn first_index(&self) -> u32 {
        self.0.trailing_zeros()
    }

    /// Highest index in the set
    pub fn last_index(&self) -> u32 {
        7 - self.0.leading_zeros()
    }
}

impl TryFrom<Vec<u32>> for WeekdaySet {
    type Error = String;

    fn try_from(indices: Vec<u32>) -> std::result::Result<Self, Self::Error> {
        let days = indices
            .iter()
            .map(|&i| weekday_from_index(i).ok_or_else(|| format!("weekday index out of range: {}", i)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        WeekdaySet::from_weekdays(days).ok_or_else(|| "weekday set must not be empty".to_string())
    }
}

impl From<WeekdaySet> for Vec<u32> {
    fn from(set: WeekdaySet) -> Self {
        set.indices().collect()
    }
}

// ============================================================================
// Recurrence Patterns
// ============================================================================

/// Which occurrence of a weekday within a month
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ordinal {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Last,
}

impl Ordinal {
    /// Zero-based occurrence index, `None` for `Last`
    pub fn index(&self) -> Option<u32> {
        match self {
            Ordinal::First => Some(0),
            Ordinal::Second => Some(1),
            Ordinal::Third => Some(2),
            Ordinal::Fourth => Some(3),
            Ordinal::Fifth => Some(4),
            Ordinal::Last => None,
        }
    }
}

/// How often a routine repeats.
///
/// Exactly one variant applies; the period calculator matches on it
/// exhaustively.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecurrencePattern {
    /// Every calendar day
    Daily,
    /// On the given days of each week
    Weekly { days: WeekdaySet },
    /// On a fixed day of each month (1..=31, clamped to the month's length)
    MonthlyByDay { day_of_month: u32 },
    /// On the n-th (or last) given weekday of each month
    MonthlyByOrdinalWeekday { ordinal: Ordinal, weekday: Weekday },
    /// On the last day of each month
    MonthlyLastDay,
    /// On the first day of January, April, July and October
    Quarterly,
    /// Once a year. `month` is zero-based (0 = January); `day` is clamped.
    Yearly { month: u32, day: u32 },
}

// ============================================================================
// History and Snapshot Types
// ============================================================================

/// One archived period of a routine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub date: CalendarDate,
    pub completed: u32,
    pub total: u32,
}

impl HistoryEntry {
    pub fn new(date: CalendarDate, completed: u32, total: u32) -> Self {
        Self {
            date,
            completed,
            total,
        }
    }

    /// Whether every checklist item was done in this period
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// Everything the tracker needs to evaluate one routine on one day
#[derive(Clone, Debug)]
pub struct RoutineSnapshot {
    pub pattern: RecurrencePattern,
    pub scheduled_date: Option<CalendarDate>,
    pub today: CalendarDate,
    pub completed_count: u32,
    pub total_count: u32,
    pub history_limit: usize,
}
