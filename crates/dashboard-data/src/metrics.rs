//! Scalar summary and pairwise correlations over a filtered slice.

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{CorrelationMatrix, Dataset, DateWindow, Metric, MetricsSummary};
use dashboard_core::statistics::Statistics;

/// Compute the [`MetricsSummary`] of `slice`.
///
/// `window` is the user's nominal selection: `num_days_in_filter` counts its
/// days, not the days actually present in `slice`. Returns `EmptySlice` when
/// `slice` has no rows.
pub fn summarize(slice: &Dataset, window: &DateWindow) -> Result<MetricsSummary> {
    if slice.is_empty() {
        return Err(DashboardError::EmptySlice {
            start: window.start(),
            end: window.end(),
        });
    }

    let consumption = slice.column(Metric::Consumption);
    let price = slice.column(Metric::Price);
    let temperature = slice.column(Metric::Temperature);
    let bill = slice.column(Metric::Bill);

    let total_consumption = Statistics::sum(&consumption);
    let avg_price = Statistics::mean(&price).unwrap_or(0.0);
    let num_days_in_filter = window.day_count();
    let daily_avg_consumption = total_consumption / num_days_in_filter as f64;

    Ok(MetricsSummary {
        total_consumption,
        total_bill: Statistics::sum(&bill),
        avg_price,
        avg_temperature: Statistics::mean(&temperature).unwrap_or(0.0),
        max_consumption: Statistics::max(&consumption).unwrap_or(0.0),
        min_consumption: Statistics::min(&consumption).unwrap_or(0.0),
        price_volatility: Statistics::sample_std_dev(&price),
        temperature_range: Statistics::range(&temperature).unwrap_or(0.0),
        daily_avg_consumption,
        efficiency_score: efficiency_score(daily_avg_consumption, avg_price),
        num_days_in_filter,
    })
}

/// `daily_avg / avg_price`, or 0 when the average price is zero or negative.
pub fn efficiency_score(daily_avg_consumption: f64, avg_price: f64) -> f64 {
    if avg_price > 0.0 {
        daily_avg_consumption / avg_price
    } else {
        0.0
    }
}

/// Pearson correlations between every pair of metric columns.
///
/// The diagonal is 1 wherever the column has variance. A cell is `None` when
/// either column is constant or the slice has fewer than two rows.
pub fn correlation_matrix(slice: &Dataset) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = Metric::ALL.iter().map(|&m| slice.column(m)).collect();
    let mut values = [[None; 4]; 4];

    for i in 0..4 {
        for j in i..4 {
            let r = if i == j {
                // Pearson of a column with itself is 1 unless undefined.
                Statistics::pearson(&columns[i], &columns[i]).map(|_| 1.0)
            } else {
                Statistics::pearson(&columns[i], &columns[j])
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix::from_values(values)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::TimeSeriesRow;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(d: NaiveDate, h: u32, kwh: f64, price: f64, temp: f64) -> TimeSeriesRow {
        TimeSeriesRow::new(d.and_hms_opt(h, 0, 0).unwrap(), kwh, price, temp)
    }

    fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
        DateWindow::new(start, end).unwrap()
    }

    // ── summarize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_summarize_basic_totals() {
        let d = date(2024, 1, 1);
        let ds = Dataset::from_rows(vec![
            row(d, 0, 1.0, 10.0, -1.0),
            row(d, 1, 2.0, 20.0, 3.0),
            row(d, 2, 3.0, 30.0, 1.0),
        ]);
        let s = summarize(&ds, &window(d, d)).unwrap();

        assert!((s.total_consumption - 6.0).abs() < 1e-9);
        assert!((s.total_bill - 1.4).abs() < 1e-9);
        assert!((s.avg_price - 20.0).abs() < 1e-9);
        assert!((s.avg_temperature - 1.0).abs() < 1e-9);
        assert_eq!(s.max_consumption, 3.0);
        assert_eq!(s.min_consumption, 1.0);
        assert!((s.price_volatility.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(s.temperature_range, 4.0);
        assert_eq!(s.num_days_in_filter, 1);
        assert!((s.daily_avg_consumption - 6.0).abs() < 1e-9);
        assert!((s.efficiency_score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_uses_nominal_window_days() {
        // One row, but a 10-day window.
        let ds = Dataset::from_rows(vec![row(date(2024, 1, 5), 0, 20.0, 10.0, 0.0)]);
        let s = summarize(&ds, &window(date(2024, 1, 1), date(2024, 1, 10))).unwrap();
        assert_eq!(s.num_days_in_filter, 10);
        assert!((s.daily_avg_consumption - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_single_row_volatility_undefined() {
        let d = date(2024, 1, 1);
        let ds = Dataset::from_rows(vec![row(d, 0, 1.0, 10.0, 0.0)]);
        let s = summarize(&ds, &window(d, d)).unwrap();
        assert!(s.price_volatility.is_none());
        assert_eq!(s.temperature_range, 0.0);
    }

    #[test]
    fn test_summarize_empty_slice_error() {
        let w = window(date(2024, 1, 1), date(2024, 1, 31));
        let err = summarize(&Dataset::empty(), &w).unwrap_err();
        assert!(matches!(err, DashboardError::EmptySlice { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_efficiency_zero_for_non_positive_price() {
        let d = date(2024, 1, 1);
        let zero = Dataset::from_rows(vec![row(d, 0, 5.0, 0.0, 0.0)]);
        assert_eq!(summarize(&zero, &window(d, d)).unwrap().efficiency_score, 0.0);

        let negative = Dataset::from_rows(vec![row(d, 0, 5.0, -5.0, 0.0)]);
        let s = summarize(&negative, &window(d, d)).unwrap();
        assert_eq!(s.efficiency_score, 0.0);
        assert!(s.total_bill < 0.0);
    }

    // ── correlation_matrix ────────────────────────────────────────────────────

    #[test]
    fn test_correlation_symmetric_with_unit_diagonal() {
        let d = date(2024, 1, 1);
        let ds = Dataset::from_rows(vec![
            row(d, 0, 1.0, 12.0, -5.0),
            row(d, 1, 3.0, 8.0, -1.0),
            row(d, 2, 2.0, 15.0, 2.0),
            row(d, 3, 5.0, 4.0, 0.5),
        ]);
        let m = correlation_matrix(&ds);

        for a in Metric::ALL {
            assert_eq!(m.get(a, a), Some(1.0));
            for b in Metric::ALL {
                assert_eq!(m.get(a, b), m.get(b, a));
                if let Some(r) = m.get(a, b) {
                    assert!((-1.0..=1.0).contains(&r));
                }
            }
        }
    }

    #[test]
    fn test_correlation_constant_column_undefined() {
        let d = date(2024, 1, 1);
        // Temperature constant.
        let ds = Dataset::from_rows(vec![
            row(d, 0, 1.0, 10.0, 4.0),
            row(d, 1, 2.0, 20.0, 4.0),
            row(d, 2, 3.0, 25.0, 4.0),
        ]);
        let m = correlation_matrix(&ds);
        assert!(m.get(Metric::Temperature, Metric::Temperature).is_none());
        assert!(m.get(Metric::Consumption, Metric::Temperature).is_none());
        assert!(m.get(Metric::Consumption, Metric::Price).is_some());
    }

    #[test]
    fn test_correlation_single_row_all_undefined() {
        let d = date(2024, 1, 1);
        let ds = Dataset::from_rows(vec![row(d, 0, 1.0, 10.0, 4.0)]);
        let m = correlation_matrix(&ds);
        assert!(m.cells().iter().all(|c| c.value.is_none()));
    }
}
