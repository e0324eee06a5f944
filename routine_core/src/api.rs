//! String-level routine evaluation.
//!
//! Mirrors the function contract exposed to callers that hold routine data
//! as plain text: recurrence phrase, ISO `YYYY-MM-DD` dates and counts in,
//! reset decision, new schedule, history and streak out. Both types are
//! serde-serializable so the contract can be driven over JSON.

use crate::config::default_history_limit;
use crate::history::HistoryLog;
use crate::tracker::{evaluate, ResetPolicy};
use crate::{parse, CalendarDate, Error, HistoryEntry, Result, RoutineSnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// History entry with its date as text
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRecord {
    pub date: String,
    pub completed: u32,
    pub total: u32,
}

/// Input to one evaluation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutineInput {
    pub pattern: String,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    pub today: String,
    pub completed_count: u32,
    pub total_count: u32,
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
    /// Entries to keep; the configured default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

/// Result of one evaluation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutineOutput {
    pub reset_occurred: bool,
    pub new_scheduled_date: Option<String>,
    pub history: Vec<HistoryRecord>,
    pub streak: u32,
    /// Parser diagnostics, if the pattern fell back to daily
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Parse a `YYYY-MM-DD` date, naming the offending field on failure
pub fn parse_date(field: &str, value: &str) -> Result<CalendarDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate {
        field: field.to_string(),
        value: value.to_string(),
    })
}

pub fn format_date(date: CalendarDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Evaluate a routine given as text.
///
/// Fails only on malformed dates. An unrecognized pattern is evaluated as
/// daily and reported in `warnings`.
pub fn evaluate_input(input: &RoutineInput, policy: ResetPolicy) -> Result<RoutineOutput> {
    let (pattern, diagnostic) = parse(&input.pattern);
    if let Some(diagnostic) = &diagnostic {
        tracing::warn!("{}", diagnostic);
    }

    let scheduled_date = input
        .scheduled_date
        .as_deref()
        .map(|value| parse_date("scheduled_date", value))
        .transpose()?;
    let today = parse_date("today", &input.today)?;

    let entries = input
        .history
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let date = parse_date(&format!("history[{}].date", i), &record.date)?;
            Ok(HistoryEntry::new(date, record.completed, record.total))
        })
        .collect::<Result<Vec<_>>>()?;

    let snapshot = RoutineSnapshot {
        pattern,
        scheduled_date,
        today,
        completed_count: input.completed_count,
        total_count: input.total_count,
        history_limit: input.history_limit.unwrap_or_else(default_history_limit),
    };

    let result = evaluate(&snapshot, &HistoryLog::from_entries(entries), policy);

    Ok(RoutineOutput {
        reset_occurred: result.reset_occurred,
        new_scheduled_date: result.new_scheduled_date.map(format_date),
        history: result
            .updated_history
            .iter()
            .map(|entry| HistoryRecord {
                date: format_date(entry.date),
                completed: entry.completed,
                total: entry.total,
            })
            .collect(),
        streak: result.streak,
        warnings: diagnostic.map(|d| d.to_string()).into_iter().collect(),
    })
}
