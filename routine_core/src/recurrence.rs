//! Recurrence text parsing.
//!
//! Turns phrases such as "weekly on monday and thursday" or
//! "monthly on the last friday" into a [`RecurrencePattern`].
//!
//! Parsing never fails. Text outside the grammar yields [`RecurrencePattern::Daily`]
//! together with a [`Diagnostic`] the caller can log or surface.

use crate::{Ordinal, RecurrencePattern, WeekdaySet};
use chrono::Weekday;
use std::fmt;

// ============================================================================
// Token Tables
// ============================================================================

const WEEKDAY_NAMES: &[(&str, Weekday)] = &[
    ("sunday", Weekday::Sun),
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sun", Weekday::Sun),
    ("mon", Weekday::Mon),
    ("tue", Weekday::Tue),
    ("wed", Weekday::Wed),
    ("thu", Weekday::Thu),
    ("fri", Weekday::Fri),
    ("sat", Weekday::Sat),
];

const ORDINAL_NAMES: &[(&str, Ordinal)] = &[
    ("first", Ordinal::First),
    ("second", Ordinal::Second),
    ("third", Ordinal::Third),
    ("fourth", Ordinal::Fourth),
    ("fifth", Ordinal::Fifth),
    ("last", Ordinal::Last),
];

/// Month names with their zero-based index
const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 0),
    ("february", 1),
    ("march", 2),
    ("april", 3),
    ("may", 4),
    ("june", 5),
    ("july", 6),
    ("august", 7),
    ("september", 8),
    ("october", 9),
    ("november", 10),
    ("december", 11),
    ("jan", 0),
    ("feb", 1),
    ("mar", 2),
    ("apr", 3),
    ("jun", 5),
    ("jul", 6),
    ("aug", 7),
    ("sep", 8),
    ("sept", 8),
    ("oct", 9),
    ("nov", 10),
    ("dec", 11),
];

const DAY_SUFFIXES: &[&str] = &["st", "nd", "rd", "th"];

fn lookup<T: Copy>(table: &[(&str, T)], token: &str) -> Option<T> {
    table
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, value)| *value)
}

fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES
        .iter()
        .find(|(_, day)| *day == weekday)
        .map(|(name, _)| *name)
        .unwrap_or("monday")
}

fn ordinal_name(ordinal: Ordinal) -> &'static str {
    ORDINAL_NAMES
        .iter()
        .find(|(_, o)| *o == ordinal)
        .map(|(name, _)| *name)
        .unwrap_or("first")
}

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .iter()
        .find(|(_, m)| *m == month)
        .map(|(name, _)| *name)
        .unwrap_or("january")
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Why a recurrence phrase fell back to daily
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The phrase matches no rule of the grammar
    Unrecognized,
    /// "yearly on ..." whose month name or day could not be resolved
    InvalidYearlyDate,
}

/// Non-fatal note produced when parsing falls back to [`RecurrencePattern::Daily`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The input as given, trimmed
    pub input: String,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::Unrecognized => write!(
                f,
                "unrecognized recurrence pattern {:?}, defaulting to daily",
                self.input
            ),
            DiagnosticKind::InvalidYearlyDate => write!(
                f,
                "unresolvable yearly date in {:?}, defaulting to daily",
                self.input
            ),
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Parse a recurrence phrase.
///
/// Matching is case-insensitive; leading/trailing whitespace is ignored and
/// internal runs of whitespace count as a single space.
pub fn parse(text: &str) -> (RecurrencePattern, Option<Diagnostic>) {
    let normalized = normalize(text);
    match parse_normalized(&normalized) {
        Ok(pattern) => {
            tracing::debug!("Parsed recurrence {:?} as {:?}", text, pattern);
            (pattern, None)
        }
        Err(kind) => (
            RecurrencePattern::Daily,
            Some(Diagnostic {
                input: text.trim().to_string(),
                kind,
            }),
        ),
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn parse_normalized(text: &str) -> Result<RecurrencePattern, DiagnosticKind> {
    match text {
        "daily" => return Ok(RecurrencePattern::Daily),
        "on weekdays" | "weekdays" | "on weekday" => {
            return Ok(RecurrencePattern::Weekly {
                days: WeekdaySet::WEEKDAYS,
            })
        }
        "on weekends" | "weekends" | "on weekend" => {
            return Ok(RecurrencePattern::Weekly {
                days: WeekdaySet::WEEKENDS,
            })
        }
        "weekly" => {
            return Ok(RecurrencePattern::Weekly {
                days: WeekdaySet::MONDAY,
            })
        }
        "monthly" => return Ok(RecurrencePattern::MonthlyByDay { day_of_month: 1 }),
        "quarterly" | "quarterly on the first day" => return Ok(RecurrencePattern::Quarterly),
        "yearly" | "annual" => return Ok(RecurrencePattern::Yearly { month: 0, day: 1 }),
        _ => {}
    }

    if let Some(rest) = text.strip_prefix("weekly on ") {
        return Ok(parse_weekly_days(rest));
    }
    if let Some(rest) = text.strip_prefix("monthly on the ") {
        return parse_monthly(rest);
    }
    if let Some(rest) = text
        .strip_prefix("yearly on ")
        .or_else(|| text.strip_prefix("annual on "))
    {
        return parse_yearly(rest);
    }

    Err(DiagnosticKind::Unrecognized)
}

/// Day list separated by ", " or " and ". Unknown names are dropped.
fn parse_weekly_days(list: &str) -> RecurrencePattern {
    let days = list
        .split(',')
        .flat_map(|part| part.split(" and "))
        .map(str::trim)
        .filter_map(|name| lookup(WEEKDAY_NAMES, name));

    RecurrencePattern::Weekly {
        days: WeekdaySet::from_weekdays(days).unwrap_or(WeekdaySet::MONDAY),
    }
}

fn parse_monthly(rest: &str) -> Result<RecurrencePattern, DiagnosticKind> {
    let tokens: Vec<&str> = rest.split(' ').collect();
    match tokens.as_slice() {
        ["last", "day"] => Ok(RecurrencePattern::MonthlyLastDay),
        [ordinal, "day"] => match lookup(ORDINAL_NAMES, ordinal).and_then(|o| o.index()) {
            Some(index) => Ok(RecurrencePattern::MonthlyByDay {
                day_of_month: index + 1,
            }),
            None => Err(DiagnosticKind::Unrecognized),
        },
        [ordinal, weekday] => {
            match (lookup(ORDINAL_NAMES, ordinal), lookup(WEEKDAY_NAMES, weekday)) {
                (Some(ordinal), Some(weekday)) => {
                    Ok(RecurrencePattern::MonthlyByOrdinalWeekday { ordinal, weekday })
                }
                _ => Err(DiagnosticKind::Unrecognized),
            }
        }
        [day] => match parse_day_number(day, true) {
            Some(day_of_month) if (1..=31).contains(&day_of_month) => {
                Ok(RecurrencePattern::MonthlyByDay { day_of_month })
            }
            _ => Err(DiagnosticKind::Unrecognized),
        },
        _ => Err(DiagnosticKind::Unrecognized),
    }
}

fn parse_yearly(rest: &str) -> Result<RecurrencePattern, DiagnosticKind> {
    let tokens: Vec<&str> = rest.split(' ').collect();
    let [month, day] = tokens.as_slice() else {
        return Err(DiagnosticKind::InvalidYearlyDate);
    };

    let month = lookup(MONTH_NAMES, month);
    let day = parse_day_number(day, false);
    match (month, day) {
        (Some(month), Some(day)) if (1..=31).contains(&day) => {
            Ok(RecurrencePattern::Yearly { month, day })
        }
        _ => Err(DiagnosticKind::InvalidYearlyDate),
    }
}

/// Parse "15", "15th", "1st". With `suffix_required`, bare digits are rejected.
fn parse_day_number(token: &str, suffix_required: bool) -> Option<u32> {
    let digits = DAY_SUFFIXES
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix));
    let digits = match digits {
        Some(digits) => digits,
        None if suffix_required => return None,
        None => token,
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

// ============================================================================
// Canonical Text
// ============================================================================

fn day_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Renders the canonical phrase for the pattern.
///
/// Out-of-range days and months are clamped the way the period calculator
/// clamps them. For any pattern `parse` can produce, parsing the output
/// yields the same pattern.
impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrencePattern::Daily => f.write_str("daily"),
            RecurrencePattern::Weekly { days } if *days == WeekdaySet::WEEKDAYS => {
                f.write_str("on weekdays")
            }
            RecurrencePattern::Weekly { days } if *days == WeekdaySet::WEEKENDS => {
                f.write_str("on weekends")
            }
            RecurrencePattern::Weekly { days } => {
                let names: Vec<&str> = days.weekdays().map(weekday_name).collect();
                write!(f, "weekly on {}", names.join(", "))
            }
            RecurrencePattern::MonthlyByDay { day_of_month } => {
                let day = (*day_of_month).clamp(1, 31);
                write!(f, "monthly on the {}{}", day, day_suffix(day))
            }
            RecurrencePattern::MonthlyByOrdinalWeekday { ordinal, weekday } => write!(
                f,
                "monthly on the {} {}",
                ordinal_name(*ordinal),
                weekday_name(*weekday)
            ),
            RecurrencePattern::MonthlyLastDay => f.write_str("monthly on the last day"),
            RecurrencePattern::Quarterly => f.write_str("quarterly"),
            RecurrencePattern::Yearly { month, day } => {
                write!(f, "yearly on {} {}", month_name((*month).min(11)), (*day).clamp(1, 31))
            }
        }
    }
}
