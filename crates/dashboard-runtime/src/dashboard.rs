//! Per-render view building.
//!
//! A [`DashboardRequest`] carries the user's typed selections; [`build_view`]
//! turns it into every figure the presentation layer shows. Building a view
//! is a pure function of the shared dataset and the request.

use std::time::Instant;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{
    AggregatedBucket, ChartPoint, ChartType, CorrelationMatrix, Dataset, DateWindow,
    EmptyBuckets, Granularity, MetricSelection, MetricsSummary,
};
use dashboard_core::settings::Settings;
use dashboard_data::aggregator::Aggregator;
use dashboard_data::filter;
use dashboard_data::insights::{self, BillingHighlights, KeyStatistics, QuickStats};
use dashboard_data::metrics;
use serde::Serialize;

// ── DashboardRequest ──────────────────────────────────────────────────────────

/// Typed selections for one render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardRequest {
    pub window: DateWindow,
    pub granularity: Granularity,
    pub chart_type: ChartType,
    pub metric: MetricSelection,
    pub show_trends: bool,
    pub empty_buckets: EmptyBuckets,
}

impl DashboardRequest {
    /// Default selections over the dataset's default window.
    ///
    /// Returns `None` for an empty dataset.
    pub fn default_for(dataset: &Dataset) -> Option<Self> {
        Some(Self::with_window(filter::default_window(dataset)?))
    }

    /// Default selections over `window`.
    pub fn with_window(window: DateWindow) -> Self {
        Self {
            window,
            granularity: Granularity::default(),
            chart_type: ChartType::default(),
            metric: MetricSelection::default(),
            show_trends: true,
            empty_buckets: EmptyBuckets::default(),
        }
    }

    /// Build a request from command-line settings.
    ///
    /// Without `--start`/`--end` the default window is used; when only one
    /// end is given the other comes from the data span. Returns
    /// `InvalidWindow` for an inverted range and `Config` when the dataset
    /// is empty and no explicit window was given.
    pub fn from_settings(settings: &Settings, dataset: &Dataset) -> Result<Self> {
        let window = resolve_window(settings, dataset)?;
        Ok(Self {
            window,
            granularity: settings.group_by,
            chart_type: settings.chart_type,
            metric: settings.metric,
            show_trends: settings.show_trends(),
            empty_buckets: settings.empty_buckets(),
        })
    }
}

fn resolve_window(settings: &Settings, dataset: &Dataset) -> Result<DateWindow> {
    let span = dataset.date_span();
    match (settings.start, settings.end, span) {
        (Some(start), Some(end), _) => DateWindow::new(start, end),
        (Some(start), None, Some((_, max))) => DateWindow::new(start, max),
        (None, Some(end), Some((min, _))) => DateWindow::new(min, end),
        (Some(day), None, None) | (None, Some(day), None) => DateWindow::new(day, day),
        (None, None, _) => filter::default_window(dataset).ok_or_else(|| {
            DashboardError::Config("no rows loaded, cannot derive a default date window".into())
        }),
    }
}

// ── DashboardView ─────────────────────────────────────────────────────────────

/// Everything shown for one request.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub window: DateWindow,
    /// Rows inside the window, for the raw data table.
    #[serde(skip)]
    pub rows: Dataset,
    pub row_count: usize,
    pub summary: MetricsSummary,
    pub buckets: Vec<AggregatedBucket>,
    /// Long-form points restricted to the selected metric(s).
    pub chart_points: Vec<ChartPoint>,
    pub correlation: CorrelationMatrix,
    pub key_statistics: KeyStatistics,
    pub highlights: BillingHighlights,
    pub quick_stats: QuickStats,
}

/// Compute the view for `request` over the shared `dataset`.
///
/// Returns `EmptySlice` when no rows fall inside the window. Neither error
/// case touches the dataset.
pub fn build_view(dataset: &Dataset, request: &DashboardRequest) -> Result<DashboardView> {
    let started = Instant::now();
    let window = request.window;

    let rows = filter::filter_by_window(dataset, &window);
    let summary = metrics::summarize(&rows, &window)?;
    let key_statistics = insights::key_statistics(&rows, summary.efficiency_score).ok_or(
        DashboardError::EmptySlice {
            start: window.start(),
            end: window.end(),
        },
    )?;

    let buckets = Aggregator::aggregate(&rows, request.granularity, request.empty_buckets);
    let long_form = Aggregator::to_long_form(&buckets);
    let chart_points = Aggregator::select_metric(&long_form, request.metric);
    let correlation = metrics::correlation_matrix(&rows);
    let highlights = BillingHighlights::from_summary(&summary, rows.len());
    let quick_stats = insights::quick_stats(dataset, window.start(), window.end());

    tracing::debug!(
        window = %window,
        rows = rows.len(),
        buckets = buckets.len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "view built"
    );

    Ok(DashboardView {
        window,
        row_count: rows.len(),
        rows,
        summary,
        buckets,
        chart_points,
        correlation,
        key_statistics,
        highlights,
        quick_stats,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clap::Parser;
    use dashboard_core::models::{Metric, TimeSeriesRow};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Hourly rows for every day from `from` through `to` (hours 0 and 12).
    fn dataset(from: NaiveDate, to: NaiveDate) -> Dataset {
        let mut rows = Vec::new();
        let mut d = from;
        let mut i = 0.0;
        while d <= to {
            for h in [0, 12] {
                i += 1.0;
                rows.push(TimeSeriesRow::new(
                    d.and_hms_opt(h, 0, 0).unwrap(),
                    1.0 + (i % 3.0),
                    5.0 + (i % 7.0),
                    -10.0 + (i % 11.0),
                ));
            }
            d = d.succ_opt().unwrap();
        }
        Dataset::from_rows(rows)
    }

    fn settings(args: &[&str]) -> Settings {
        let mut full = vec!["energy-dashboard"];
        full.extend_from_slice(args);
        Settings::parse_from(full)
    }

    // ── DashboardRequest ──────────────────────────────────────────────────────

    #[test]
    fn test_default_for_uses_last_whole_month() {
        let ds = dataset(date(2025, 1, 1), date(2025, 3, 15));
        let req = DashboardRequest::default_for(&ds).unwrap();
        assert_eq!(req.window.start(), date(2025, 2, 1));
        assert_eq!(req.window.end(), date(2025, 2, 28));
        assert_eq!(req.granularity, Granularity::Daily);
        assert!(req.show_trends);
    }

    #[test]
    fn test_default_for_empty_dataset() {
        assert!(DashboardRequest::default_for(&Dataset::empty()).is_none());
    }

    #[test]
    fn test_from_settings_explicit_window() {
        let ds = dataset(date(2025, 1, 1), date(2025, 3, 15));
        let s = settings(&[
            "--start",
            "2025-01-10",
            "--end",
            "2025-01-20",
            "--group-by",
            "weekly",
            "--metric",
            "all",
            "--no-trends",
        ]);
        let req = DashboardRequest::from_settings(&s, &ds).unwrap();
        assert_eq!(req.window.start(), date(2025, 1, 10));
        assert_eq!(req.window.end(), date(2025, 1, 20));
        assert_eq!(req.granularity, Granularity::Weekly);
        assert_eq!(req.metric, MetricSelection::All);
        assert!(!req.show_trends);
    }

    #[test]
    fn test_from_settings_open_ended_window() {
        let ds = dataset(date(2025, 1, 1), date(2025, 3, 15));
        let req = DashboardRequest::from_settings(&settings(&["--start", "2025-03-01"]), &ds).unwrap();
        assert_eq!(req.window.end(), date(2025, 3, 15));
    }

    #[test]
    fn test_from_settings_inverted_window() {
        let ds = dataset(date(2025, 1, 1), date(2025, 3, 15));
        let s = settings(&["--start", "2025-02-10", "--end", "2025-02-01"]);
        let err = DashboardRequest::from_settings(&s, &ds).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidWindow { .. }));
    }

    // ── build_view ────────────────────────────────────────────────────────────

    #[test]
    fn test_build_view_populates_every_section() {
        let ds = dataset(date(2025, 1, 1), date(2025, 3, 15));
        let req = DashboardRequest::default_for(&ds).unwrap();
        let view = build_view(&ds, &req).unwrap();

        assert_eq!(view.row_count, 28 * 2);
        assert_eq!(view.rows.len(), view.row_count);
        assert_eq!(view.summary.num_days_in_filter, 28);
        assert_eq!(view.buckets.len(), 28);
        assert!(view
            .chart_points
            .iter()
            .all(|p| p.metric == Metric::Consumption));
        assert_eq!(view.chart_points.len(), 28);
        assert_eq!(view.correlation.get(Metric::Price, Metric::Price), Some(1.0));
        assert_eq!(view.highlights.data_points, 56);
        assert_eq!(view.quick_stats.total_days, 28);
    }

    #[test]
    fn test_build_view_all_metrics_faceted() {
        let ds = dataset(date(2025, 1, 1), date(2025, 1, 31));
        let mut req = DashboardRequest::with_window(
            DateWindow::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap(),
        );
        req.metric = MetricSelection::All;
        req.granularity = Granularity::Monthly;

        let view = build_view(&ds, &req).unwrap();
        assert_eq!(view.buckets.len(), 1);
        assert_eq!(view.chart_points.len(), 4);
    }

    #[test]
    fn test_build_view_empty_slice() {
        let ds = dataset(date(2025, 1, 1), date(2025, 1, 31));
        let req = DashboardRequest::with_window(
            DateWindow::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap(),
        );
        let err = build_view(&ds, &req).unwrap_err();
        assert!(matches!(err, DashboardError::EmptySlice { .. }));
        // The dataset is untouched and still usable.
        assert_eq!(ds.len(), 62);
    }

    #[test]
    fn test_build_view_concurrent_requests() {
        let ds = dataset(date(2025, 1, 1), date(2025, 3, 31));
        let windows = [
            (date(2025, 1, 1), date(2025, 1, 31)),
            (date(2025, 2, 1), date(2025, 2, 28)),
            (date(2025, 3, 1), date(2025, 3, 31)),
        ];

        std::thread::scope(|s| {
            for (start, end) in windows {
                let ds = &ds;
                s.spawn(move || {
                    let req = DashboardRequest::with_window(DateWindow::new(start, end).unwrap());
                    let view = build_view(ds, &req).unwrap();
                    assert_eq!(view.summary.num_days_in_filter, (end - start).num_days() + 1);
                });
            }
        });
    }

    #[test]
    fn test_view_serializes_for_report() {
        let ds = dataset(date(2025, 1, 1), date(2025, 1, 31));
        let req = DashboardRequest::with_window(
            DateWindow::new(date(2025, 1, 1), date(2025, 1, 7)).unwrap(),
        );
        let view = build_view(&ds, &req).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("rows").is_none());
        assert_eq!(json["row_count"], 14);
        assert_eq!(json["summary"]["num_days_in_filter"], 7);
    }
}
