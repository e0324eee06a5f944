//! Routine period tracking.
//!
//! Decides, for one routine on one day, whether the previous period should be
//! archived into history and the checklist reset:
//! - No scheduled date yet → nothing to do
//! - Scheduled date still in the future (for this period) → within period
//! - Otherwise → archive the elapsed period and schedule the next reset
//!
//! Two reset rules exist and are selected with [`ResetPolicy`].

use crate::history::HistoryLog;
use crate::period::{current_period_start, next_period_start, sub_days};
use crate::{current_streak, CalendarDate, HistoryEntry, RecurrencePattern, RoutineSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule used to decide whether a routine is due for reset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Reset once the scheduled date has passed relative to the period
    /// boundary; archive the elapsed period and schedule the next boundary.
    #[default]
    PeriodAware,
    /// Reset once the scheduled date is before today and not yet in history;
    /// archive under the scheduled date and reschedule to the current period.
    ScheduledDate,
}

impl fmt::Display for ResetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetPolicy::PeriodAware => f.write_str("period_aware"),
            ResetPolicy::ScheduledDate => f.write_str("scheduled_date"),
        }
    }
}

impl FromStr for ResetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "period_aware" => Ok(ResetPolicy::PeriodAware),
            "scheduled_date" => Ok(ResetPolicy::ScheduledDate),
            other => Err(format!(
                "unknown reset policy {:?} (expected period_aware or scheduled_date)",
                other
            )),
        }
    }
}

/// Which branch of the reset decision applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerState {
    /// The routine has never been scheduled
    NoPriorSchedule,
    /// The scheduled reset has not come due
    WithinPeriod,
    /// The elapsed period was archived under `history_date`
    ResetDue { history_date: CalendarDate },
}

/// Outcome of one tracker evaluation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerResult {
    pub state: TrackerState,
    pub reset_occurred: bool,
    pub new_scheduled_date: Option<CalendarDate>,
    pub updated_history: HistoryLog,
    pub streak: u32,
}

struct Decision {
    state: TrackerState,
    new_scheduled_date: Option<CalendarDate>,
}

/// Evaluate a routine snapshot against its history.
///
/// On reset the new entry is prepended and the history truncated to
/// `snapshot.history_limit`; otherwise the history is returned unchanged.
pub fn evaluate(snapshot: &RoutineSnapshot, history: &HistoryLog, policy: ResetPolicy) -> TrackerResult {
    let decision = match policy {
        ResetPolicy::PeriodAware => decide_period_aware(snapshot),
        ResetPolicy::ScheduledDate => decide_scheduled_date(snapshot, history),
    };

    let mut updated_history = history.clone();
    if let TrackerState::ResetDue { history_date } = decision.state {
        updated_history.record(
            HistoryEntry::new(history_date, snapshot.completed_count, snapshot.total_count),
            snapshot.history_limit,
        );
        tracing::info!(
            "Reset due ({}): archived {} as {}/{}, next reset {:?}",
            policy,
            history_date,
            snapshot.completed_count,
            snapshot.total_count,
            decision.new_scheduled_date
        );
    } else {
        tracing::debug!("No reset ({}): {:?}", policy, decision.state);
    }

    let streak = current_streak(&updated_history, snapshot.today);

    TrackerResult {
        state: decision.state,
        reset_occurred: matches!(decision.state, TrackerState::ResetDue { .. }),
        new_scheduled_date: decision.new_scheduled_date,
        updated_history,
        streak,
    }
}

fn decide_period_aware(snapshot: &RoutineSnapshot) -> Decision {
    let pattern = &snapshot.pattern;
    let today = snapshot.today;
    let period_start = current_period_start(pattern, today);
    let period_starts_today = period_start == today;

    let Some(scheduled) = snapshot.scheduled_date else {
        return Decision {
            state: TrackerState::NoPriorSchedule,
            new_scheduled_date: None,
        };
    };

    let needs_reset = if period_starts_today {
        scheduled < today
    } else {
        scheduled <= today
    };

    if !needs_reset {
        return Decision {
            state: TrackerState::WithinPeriod,
            new_scheduled_date: Some(scheduled),
        };
    }

    let (history_date, next) = if period_starts_today {
        (scheduled, period_start)
    } else {
        (
            current_period_start(pattern, sub_days(scheduled, 1)),
            next_period_start(pattern, today),
        )
    };

    Decision {
        state: TrackerState::ResetDue { history_date },
        new_scheduled_date: Some(next),
    }
}

fn decide_scheduled_date(snapshot: &RoutineSnapshot, history: &HistoryLog) -> Decision {
    let Some(scheduled) = snapshot.scheduled_date else {
        return Decision {
            state: TrackerState::NoPriorSchedule,
            new_scheduled_date: None,
        };
    };

    if scheduled < snapshot.today && !history.contains_date(scheduled) {
        Decision {
            state: TrackerState::ResetDue {
                history_date: scheduled,
            },
            new_scheduled_date: Some(current_period_start(&snapshot.pattern, snapshot.today)),
        }
    } else {
        Decision {
            state: TrackerState::WithinPeriod,
            new_scheduled_date: Some(scheduled),
        }
    }
}

/// First scheduled date for a routine that has none.
///
/// Today if a period starts today, otherwise the next period start, so the
/// first reset archives a full period.
pub fn initial_schedule(pattern: &RecurrencePattern, today: CalendarDate) -> CalendarDate {
    let period_start = current_period_start(pattern, today);
    if period_start == today {
        today
    } else {
        next_period_start(pattern, today)
    }
}
