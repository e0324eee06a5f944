//! Period boundary calculation.
//!
//! For a [`RecurrencePattern`] and a reference date this module answers two
//! questions:
//! - When did the period containing the reference date start?
//! - When does the following period start?
//!
//! Both functions are total. Day-of-month values are clamped to the length
//! of the target month, and ordinal weekdays that do not exist in a month
//! resolve to the last such weekday. Results saturate at chrono's
//! representable date range.

use crate::{weekday_index, CalendarDate, Ordinal, RecurrencePattern, WeekdaySet};
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Start of the period that contains `reference`
pub fn current_period_start(pattern: &RecurrencePattern, reference: CalendarDate) -> CalendarDate {
    match pattern {
        RecurrencePattern::Daily => reference,
        RecurrencePattern::Weekly { days } => weekly_current(*days, reference),
        RecurrencePattern::MonthlyByDay { day_of_month } => {
            monthly_current(reference, |month| month.day(*day_of_month))
        }
        RecurrencePattern::MonthlyByOrdinalWeekday { ordinal, weekday } => {
            monthly_current(reference, |month| month.ordinal_weekday(*ordinal, *weekday))
        }
        RecurrencePattern::MonthlyLastDay => monthly_current(reference, Month::last_day),
        RecurrencePattern::Quarterly => Month::of(reference).quarter_start().day(1),
        RecurrencePattern::Yearly { month, day } => {
            let candidate = Month::in_year(reference.year(), *month).day(*day);
            if candidate <= reference {
                candidate
            } else {
                Month::in_year(reference.year() - 1, *month).day(*day)
            }
        }
    }
}

/// Start of the period after the one that contains `reference`.
///
/// Always strictly after `reference`.
pub fn next_period_start(pattern: &RecurrencePattern, reference: CalendarDate) -> CalendarDate {
    match pattern {
        RecurrencePattern::Daily => add_days(reference, 1),
        RecurrencePattern::Weekly { days } => weekly_next(*days, reference),
        RecurrencePattern::MonthlyByDay { day_of_month } => {
            monthly_next(pattern, reference, |month| month.day(*day_of_month))
        }
        RecurrencePattern::MonthlyByOrdinalWeekday { ordinal, weekday } => {
            monthly_next(pattern, reference, |month| month.ordinal_weekday(*ordinal, *weekday))
        }
        RecurrencePattern::MonthlyLastDay => monthly_next(pattern, reference, Month::last_day),
        RecurrencePattern::Quarterly => Month::of(reference)
            .quarter_start()
            .offset(3)
            .day(1),
        RecurrencePattern::Yearly { month, day } => {
            // Step from the current period's year so a reference before this
            // year's date does not skip a year.
            let current = current_period_start(pattern, reference);
            Month::in_year(current.year() + 1, *month).day(*day)
        }
    }
}

// ============================================================================
// Weekly
// ============================================================================

fn weekly_current(days: WeekdaySet, reference: CalendarDate) -> CalendarDate {
    let today = weekday_index(reference.weekday());
    match days.indices().filter(|d| *d <= today).max() {
        Some(day) => sub_days(reference, u64::from(today - day)),
        None => sub_days(reference, u64::from(today + 7 - days.last_index())),
    }
}

fn weekly_next(days: WeekdaySet, reference: CalendarDate) -> CalendarDate {
    let today = weekday_index(reference.weekday());
    match days.indices().find(|d| *d > today) {
        Some(day) => add_days(reference, u64::from(day - today)),
        None => add_days(reference, u64::from(7 - today + days.first_index())),
    }
}

// ============================================================================
// Monthly
// ============================================================================

/// This month's occurrence if it is on or before `reference`, else last month's
fn monthly_current<F>(reference: CalendarDate, occurrence: F) -> CalendarDate
where
    F: Fn(Month) -> CalendarDate,
{
    let month = Month::of(reference);
    let candidate = occurrence(month);
    if candidate <= reference {
        candidate
    } else {
        occurrence(month.offset(-1))
    }
}

/// Occurrence in the month after the current period's month
fn monthly_next<F>(pattern: &RecurrencePattern, reference: CalendarDate, occurrence: F) -> CalendarDate
where
    F: Fn(Month) -> CalendarDate,
{
    let current = current_period_start(pattern, reference);
    occurrence(Month::of(current).offset(1))
}

/// A calendar month, `month` in 1..=12
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Month {
    year: i32,
    month: u32,
}

impl Month {
    fn of(date: CalendarDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Zero-based month within `year`; indices above 11 are treated as December
    fn in_year(year: i32, month0: u32) -> Self {
        Self {
            year,
            month: month0.min(11) + 1,
        }
    }

    fn offset(self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    fn quarter_start(self) -> Self {
        Self {
            year: self.year,
            month: (self.month - 1) / 3 * 3 + 1,
        }
    }

    fn len(self) -> u32 {
        match self.month {
            2 if is_leap_year(self.year) => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// The given day, clamped into this month
    fn day(self, day: u32) -> CalendarDate {
        ymd(self.year, self.month, day.clamp(1, self.len()))
    }

    fn last_day(self) -> CalendarDate {
        self.day(self.len())
    }

    fn ordinal_weekday(self, ordinal: Ordinal, weekday: Weekday) -> CalendarDate {
        let Some(index) = ordinal.index() else {
            return self.last_weekday(weekday);
        };
        let first = self.day(1);
        let offset = (7 + weekday_index(weekday) - weekday_index(first.weekday())) % 7;
        let day = 1 + offset + index * 7;
        if day <= self.len() {
            self.day(day)
        } else {
            self.last_weekday(weekday)
        }
    }

    fn last_weekday(self, weekday: Weekday) -> CalendarDate {
        let last = self.last_day();
        let back = (7 + weekday_index(last.weekday()) - weekday_index(weekday)) % 7;
        self.day(self.len() - back)
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn ymd(year: i32, month: u32, day: u32) -> CalendarDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

pub(crate) fn add_days(date: CalendarDate, days: u64) -> CalendarDate {
    date.checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

pub(crate) fn sub_days(date: CalendarDate, days: u64) -> CalendarDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn date(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn pattern(text: &str) -> RecurrencePattern {
        let (pattern, diagnostic) = parse(text);
        assert!(diagnostic.is_none(), "{}", text);
        pattern
    }

    fn all_patterns() -> Vec<RecurrencePattern> {
        [
            "daily",
            "weekly",
            "on weekdays",
            "on weekends",
            "weekly on monday and thursday",
            "weekly on sunday",
            "weekly on saturday",
            "monthly",
            "monthly on the 15th",
            "monthly on the 29th",
            "monthly on the 31st",
            "monthly on the first monday",
            "monthly on the third thursday",
            "monthly on the fifth friday",
            "monthly on the last sunday",
            "monthly on the last day",
            "quarterly",
            "yearly",
            "yearly on february 29",
            "yearly on december 31",
            "yearly on july 4",
        ]
        .iter()
        .map(|text| pattern(text))
        .collect()
    }

    fn dates_between(start: &str, end: &str) -> Vec<CalendarDate> {
        let end = date(end);
        date(start).iter_days().take_while(|d| *d <= end).collect()
    }

    // ------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------

    #[test]
    fn test_third_thursday_rolls_back_a_month() {
        let p = pattern("monthly on the third Thursday");
        assert_eq!(current_period_start(&p, date("2025-11-01")), date("2025-10-16"));
        assert_eq!(next_period_start(&p, date("2025-11-01")), date("2025-11-20"));
    }

    #[test]
    fn test_31st_clamps_into_february() {
        let p = pattern("monthly on the 31st");
        assert_eq!(current_period_start(&p, date("2025-02-10")), date("2025-01-31"));
        assert_eq!(next_period_start(&p, date("2025-02-10")), date("2025-02-28"));
    }

    #[test]
    fn test_quarterly_rolls_year_after_q4() {
        let p = pattern("quarterly");
        assert_eq!(current_period_start(&p, date("2025-11-05")), date("2025-10-01"));
        assert_eq!(next_period_start(&p, date("2025-11-05")), date("2026-01-01"));

        assert_eq!(current_period_start(&p, date("2025-05-20")), date("2025-04-01"));
        assert_eq!(next_period_start(&p, date("2025-05-20")), date("2025-07-01"));
    }

    // ------------------------------------------------------------------
    // Per-variant behavior
    // ------------------------------------------------------------------

    #[test]
    fn test_daily() {
        let p = RecurrencePattern::Daily;
        assert_eq!(current_period_start(&p, date("2025-06-10")), date("2025-06-10"));
        assert_eq!(next_period_start(&p, date("2025-12-31")), date("2026-01-01"));
    }

    #[test]
    fn test_weekly_same_week() {
        // 2025-06-11 is a Wednesday
        let p = pattern("weekly on monday and thursday");
        assert_eq!(current_period_start(&p, date("2025-06-11")), date("2025-06-09"));
        assert_eq!(next_period_start(&p, date("2025-06-11")), date("2025-06-12"));
    }

    #[test]
    fn test_weekly_wraps_weeks() {
        let p = pattern("weekly on thursday");
        // Tuesday: no Thursday yet this week, so last week's
        assert_eq!(current_period_start(&p, date("2025-06-10")), date("2025-06-05"));
        // Friday: next Thursday is in the following week
        assert_eq!(next_period_start(&p, date("2025-06-13")), date("2025-06-19"));
    }

    #[test]
    fn test_weekly_on_pattern_day() {
        let p = pattern("weekly");
        assert_eq!(current_period_start(&p, date("2025-06-09")), date("2025-06-09"));
        assert_eq!(next_period_start(&p, date("2025-06-09")), date("2025-06-16"));
    }

    #[test]
    fn test_weekends() {
        let p = pattern("on weekends");
        // Wednesday -> previous Sunday, next Saturday
        assert_eq!(current_period_start(&p, date("2025-06-11")), date("2025-06-08"));
        assert_eq!(next_period_start(&p, date("2025-06-11")), date("2025-06-14"));
        // Saturday -> itself, next Sunday
        assert_eq!(current_period_start(&p, date("2025-06-14")), date("2025-06-14"));
        assert_eq!(next_period_start(&p, date("2025-06-14")), date("2025-06-15"));
    }

    #[test]
    fn test_monthly_by_day() {
        let p = pattern("monthly on the 15th");
        assert_eq!(current_period_start(&p, date("2025-06-15")), date("2025-06-15"));
        assert_eq!(current_period_start(&p, date("2025-06-14")), date("2025-05-15"));
        assert_eq!(next_period_start(&p, date("2025-06-14")), date("2025-06-15"));
        assert_eq!(next_period_start(&p, date("2025-12-20")), date("2026-01-15"));
    }

    #[test]
    fn test_monthly_31st_in_leap_february() {
        let p = pattern("monthly on the 31st");
        assert_eq!(current_period_start(&p, date("2024-02-29")), date("2024-02-29"));
        assert_eq!(current_period_start(&p, date("2024-03-30")), date("2024-02-29"));
        assert_eq!(next_period_start(&p, date("2024-02-29")), date("2024-03-31"));
    }

    #[test]
    fn test_monthly_31st_clamps_every_february() {
        let p = RecurrencePattern::MonthlyByDay { day_of_month: 31 };
        for year in 1999..=2030 {
            let end_of_feb = NaiveDate::from_ymd_opt(year, 3, 1).unwrap().pred_opt().unwrap();
            let mid_march = NaiveDate::from_ymd_opt(year, 3, 15).unwrap();
            assert_eq!(current_period_start(&p, mid_march), end_of_feb, "{}", year);
            let mid_feb = NaiveDate::from_ymd_opt(year, 2, 15).unwrap();
            assert_eq!(next_period_start(&p, mid_feb), end_of_feb, "{}", year);
        }
    }

    #[test]
    fn test_ordinal_weekday_first_and_last() {
        // June 2025 starts on a Sunday and ends on a Monday
        let first_monday = pattern("monthly on the first monday");
        assert_eq!(current_period_start(&first_monday, date("2025-06-20")), date("2025-06-02"));

        let last_sunday = pattern("monthly on the last sunday");
        assert_eq!(current_period_start(&last_sunday, date("2025-06-30")), date("2025-06-29"));
        assert_eq!(next_period_start(&last_sunday, date("2025-06-30")), date("2025-07-27"));
    }

    #[test]
    fn test_missing_fifth_weekday_falls_back_to_last() {
        // February 2025 has four Fridays; the last is the 28th
        let p = pattern("monthly on the fifth friday");
        assert_eq!(current_period_start(&p, date("2025-02-28")), date("2025-02-28"));
        // May 2025 has five Fridays
        assert_eq!(current_period_start(&p, date("2025-05-31")), date("2025-05-30"));
        assert_eq!(next_period_start(&p, date("2025-05-31")), date("2025-06-27"));
    }

    #[test]
    fn test_monthly_last_day() {
        let p = pattern("monthly on the last day");
        assert_eq!(current_period_start(&p, date("2025-04-30")), date("2025-04-30"));
        assert_eq!(current_period_start(&p, date("2025-04-29")), date("2025-03-31"));
        assert_eq!(next_period_start(&p, date("2025-04-30")), date("2025-05-31"));
        assert_eq!(next_period_start(&p, date("2025-01-31")), date("2025-02-28"));
    }

    #[test]
    fn test_yearly() {
        let p = pattern("yearly on march 15");
        assert_eq!(current_period_start(&p, date("2025-06-01")), date("2025-03-15"));
        assert_eq!(current_period_start(&p, date("2025-03-14")), date("2024-03-15"));
        assert_eq!(next_period_start(&p, date("2025-03-14")), date("2025-03-15"));
        assert_eq!(next_period_start(&p, date("2025-03-15")), date("2026-03-15"));
    }

    #[test]
    fn test_yearly_leap_day_clamps() {
        let p = pattern("yearly on february 29");
        assert_eq!(current_period_start(&p, date("2025-03-01")), date("2025-02-28"));
        assert_eq!(next_period_start(&p, date("2027-03-01")), date("2028-02-29"));
    }

    // ------------------------------------------------------------------
    // Properties over a range of dates
    // ------------------------------------------------------------------

    #[test]
    fn test_next_is_strictly_after_reference() {
        for p in all_patterns() {
            for d in dates_between("2023-12-01", "2025-03-31") {
                let next = next_period_start(&p, d);
                assert!(next > d, "{:?} on {}: next {}", p, d, next);
            }
        }
    }

    #[test]
    fn test_current_is_not_after_reference() {
        for p in all_patterns() {
            for d in dates_between("2023-12-01", "2025-03-31") {
                let current = current_period_start(&p, d);
                assert!(current <= d, "{:?} on {}: current {}", p, d, current);
                if let RecurrencePattern::Weekly { days } = &p {
                    assert_eq!(current == d, days.contains_index(weekday_index(d.weekday())));
                }
            }
        }
    }

    #[test]
    fn test_current_is_idempotent() {
        for p in all_patterns() {
            for d in dates_between("2023-12-01", "2025-03-31") {
                let current = current_period_start(&p, d);
                assert_eq!(current_period_start(&p, current), current, "{:?} on {}", p, d);
            }
        }
    }

    #[test]
    fn test_no_period_start_between_current_and_next() {
        for p in all_patterns() {
            for d in dates_between("2024-01-01", "2024-12-31") {
                let current = current_period_start(&p, d);
                let next = next_period_start(&p, d);
                for between in current.iter_days().take_while(|b| *b < next) {
                    assert_eq!(current_period_start(&p, between), current, "{:?} on {}", p, d);
                }
            }
        }
    }

    #[test]
    fn test_saturates_at_calendar_limits() {
        assert_eq!(next_period_start(&RecurrencePattern::Daily, NaiveDate::MAX), NaiveDate::MAX);
    }
}
