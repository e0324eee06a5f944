//! Streak computation over routine history.

use crate::{CalendarDate, HistoryEntry};
use crate::history::HistoryLog;

/// Count consecutive fully-completed periods, newest first.
///
/// Entries dated after `today` are ignored. Counting stops at the first
/// entry that was not fully completed. Expects at most one entry per date;
/// duplicates are counted in input order.
pub fn current_streak(history: &HistoryLog, today: CalendarDate) -> u32 {
    let mut entries: Vec<&HistoryEntry> = history.iter().filter(|e| e.date <= today).collect();
    entries.sort_by(|a, b| b.date.cmp(&a.date));

    let streak = entries.iter().take_while(|e| e.is_complete()).count() as u32;
    tracing::debug!("Streak as of {}: {} of {} periods", today, streak, entries.len());
    streak
}
