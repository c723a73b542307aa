//! Inclusive date-range slicing and the default "last whole month" window.

use chrono::NaiveDate;
use dashboard_core::error::Result;
use dashboard_core::models::{Dataset, DateWindow, TimeSeriesRow};
use dashboard_core::time_utils;

/// Rows whose calendar date lies in `window`, both ends inclusive.
///
/// An empty result is not an error here; callers that need rows report
/// `EmptySlice` themselves.
pub fn filter_by_window(dataset: &Dataset, window: &DateWindow) -> Dataset {
    Dataset::from_rows(slice_rows(dataset.rows(), window).to_vec())
}

/// Borrowing variant of [`filter_by_window`].
///
/// Rows are sorted, so the slice is located by binary search.
pub fn slice_rows<'a>(rows: &'a [TimeSeriesRow], window: &DateWindow) -> &'a [TimeSeriesRow] {
    let lo = rows.partition_point(|r| r.date() < window.start());
    let hi = rows.partition_point(|r| r.date() <= window.end());
    if lo >= hi {
        return &[];
    }
    &rows[lo..hi]
}

/// Validate raw dates and filter in one step.
///
/// Returns `InvalidWindow` when `start > end`.
pub fn filter_by_dates(dataset: &Dataset, start: NaiveDate, end: NaiveDate) -> Result<Dataset> {
    let window = DateWindow::new(start, end)?;
    Ok(filter_by_window(dataset, &window))
}

/// The most recent complete calendar month strictly before the month of the
/// last row, clamped to the data span.
///
/// Falls back to the full span when the clamped window would be inverted
/// (data shorter than a month). Returns `None` for an empty dataset.
pub fn default_window(dataset: &Dataset) -> Option<DateWindow> {
    let (min_date, max_date) = dataset.date_span()?;
    default_window_for_span(min_date, max_date)
}

/// [`default_window`] on an explicit `(min_date, max_date)` span.
pub fn default_window_for_span(min_date: NaiveDate, max_date: NaiveDate) -> Option<DateWindow> {
    let prev_end = time_utils::previous_month_end(max_date);
    let prev_start = time_utils::month_start(prev_end);

    let start = prev_start.max(min_date);
    let end = prev_end.min(max_date);

    if start > end {
        return DateWindow::new(min_date, max_date).ok();
    }
    DateWindow::new(start, end).ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::error::DashboardError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(d: NaiveDate, h: u32) -> TimeSeriesRow {
        TimeSeriesRow::new(d.and_hms_opt(h, 0, 0).unwrap(), 1.0, 10.0, 0.0)
    }

    /// Two rows per day (00:00 and 23:00) from `from` through `to`.
    fn daily_dataset(from: NaiveDate, to: NaiveDate) -> Dataset {
        let mut rows = Vec::new();
        let mut d = from;
        while d <= to {
            rows.push(row(d, 0));
            rows.push(row(d, 23));
            d = d.succ_opt().unwrap();
        }
        Dataset::from_rows(rows)
    }

    // ── filter_by_window ──────────────────────────────────────────────────────

    #[test]
    fn test_filter_is_inclusive_on_both_ends() {
        let ds = daily_dataset(date(2024, 1, 1), date(2024, 1, 10));
        let window = DateWindow::new(date(2024, 1, 3), date(2024, 1, 5)).unwrap();

        let out = filter_by_window(&ds, &window);
        assert_eq!(out.len(), 6);
        assert_eq!(out.first_date(), Some(date(2024, 1, 3)));
        // 23:00 on the end date is still inside.
        assert_eq!(out.rows().last().unwrap().timestamp.date(), date(2024, 1, 5));
    }

    #[test]
    fn test_filter_outside_span_is_empty_not_error() {
        let ds = daily_dataset(date(2024, 1, 1), date(2024, 1, 10));
        let window = DateWindow::new(date(2023, 6, 1), date(2023, 6, 30)).unwrap();
        assert!(filter_by_window(&ds, &window).is_empty());
    }

    #[test]
    fn test_filter_single_day() {
        let ds = daily_dataset(date(2024, 1, 1), date(2024, 1, 10));
        let window = DateWindow::new(date(2024, 1, 10), date(2024, 1, 10)).unwrap();
        assert_eq!(filter_by_window(&ds, &window).len(), 2);
    }

    #[test]
    fn test_filter_by_dates_rejects_inverted() {
        let ds = daily_dataset(date(2024, 1, 1), date(2024, 1, 10));
        let err = filter_by_dates(&ds, date(2024, 1, 5), date(2024, 1, 4)).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidWindow { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_filter_full_span_round_trip() {
        let ds = daily_dataset(date(2024, 1, 1), date(2024, 2, 15));
        let (min, max) = ds.date_span().unwrap();
        let out = filter_by_dates(&ds, min, max).unwrap();
        assert_eq!(out, ds);
    }

    // ── default_window ────────────────────────────────────────────────────────

    #[test]
    fn test_default_window_last_whole_month() {
        let w = default_window_for_span(date(2015, 1, 1), date(2025, 3, 15)).unwrap();
        assert_eq!(w.start(), date(2025, 2, 1));
        assert_eq!(w.end(), date(2025, 2, 28));
    }

    #[test]
    fn test_default_window_clamps_start_to_min_date() {
        let w = default_window_for_span(date(2025, 2, 10), date(2025, 3, 15)).unwrap();
        assert_eq!(w.start(), date(2025, 2, 10));
        assert_eq!(w.end(), date(2025, 2, 28));
    }

    #[test]
    fn test_default_window_falls_back_to_full_span() {
        // Data within a single month: previous month lies before min_date.
        let w = default_window_for_span(date(2025, 3, 2), date(2025, 3, 15)).unwrap();
        assert_eq!(w.start(), date(2025, 3, 2));
        assert_eq!(w.end(), date(2025, 3, 15));
    }

    #[test]
    fn test_default_window_empty_dataset() {
        assert!(default_window(&Dataset::empty()).is_none());
    }

    #[test]
    fn test_default_window_from_dataset() {
        let ds = daily_dataset(date(2024, 11, 20), date(2025, 1, 3));
        let w = default_window(&ds).unwrap();
        assert_eq!(w.start(), date(2024, 12, 1));
        assert_eq!(w.end(), date(2024, 12, 31));
    }
}
