//! Calendar arithmetic shared by the filter, aggregator and metrics engine.
//!
//! All dates are naive local calendar dates; the source files carry no
//! timezone information.

use chrono::{Datelike, Duration, NaiveDate};

/// Date format accepted on the command line (`--start`, `--end`).
pub const DATE_ARG_FORMAT: &str = "%Y-%m-%d";

// ── Day counts ────────────────────────────────────────────────────────────────

/// Number of calendar days in `[start, end]`, counting both ends.
///
/// Returns zero or a negative number when `start > end`; callers that need a
/// valid span should go through [`crate::models::DateWindow`].
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

// ── Bucket boundaries ─────────────────────────────────────────────────────────

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month *before* the one containing `date`.
pub fn previous_month_end(date: NaiveDate) -> NaiveDate {
    month_start(date) - Duration::days(1)
}

/// Number of days in the given month (`month` is 1-based).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(next_year, next_month, 1),
    ) {
        (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
        _ => 30,
    }
}

/// Shift `date` by `months` calendar months, clamping the day to the length
/// of the target month (e.g. Jan 31 + 1 month → Feb 28/29).
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date)
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` command-line date.
///
/// Usable directly as a clap `value_parser`.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_ARG_FORMAT)
        .map_err(|e| format!("invalid date '{}' (expected YYYY-MM-DD): {}", s, e))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
