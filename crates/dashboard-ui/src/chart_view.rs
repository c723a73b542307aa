//! Trends tab: the resampled series of the selected metric(s), one chart per
//! metric, with an optional least-squares trend line.

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset as ChartDataset, GraphType, Paragraph},
    Frame,
};

use dashboard_core::formatting::format_number;
use dashboard_core::models::{ChartType, Metric, MetricSelection};
use dashboard_core::statistics::Statistics;
use dashboard_runtime::dashboard::{DashboardRequest, DashboardView};
use dashboard_runtime::data::aggregator::Aggregator;

use crate::themes::Theme;

// ── Series preparation ────────────────────────────────────────────────────────

/// Chart-ready points for one metric: x is days since [`chart_origin`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub metric: Metric,
    pub points: Vec<(f64, f64)>,
    /// Two end points of the fitted line, when a fit exists.
    pub trend: Option<[(f64, f64); 2]>,
}

impl MetricSeries {
    pub fn from_view(view: &DashboardView, metric: Metric, with_trend: bool) -> Self {
        let origin = chart_origin(view);
        let points = Aggregator::series(&view.chart_points, metric)
            .into_iter()
            .map(|(date, value)| (day_offset(origin, date), value))
            .collect::<Vec<_>>();
        let trend = if with_trend {
            trend_line(&points)
        } else {
            None
        };
        Self {
            metric,
            points,
            trend,
        }
    }

    /// `[min, max]` over the series and its trend, padded by 5 % of the span.
    ///
    /// A flat series gets a ±1 band so the axis never collapses.
    pub fn y_bounds(&self) -> [f64; 2] {
        let ys = self
            .points
            .iter()
            .chain(self.trend.iter().flatten())
            .map(|&(_, y)| y);
        let (lo, hi) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
        if !lo.is_finite() || !hi.is_finite() {
            return [0.0, 1.0];
        }
        if hi - lo < f64::EPSILON {
            return [lo - 1.0, hi + 1.0];
        }
        let pad = (hi - lo) * 0.05;
        [lo - pad, hi + pad]
    }
}

/// Left edge of the x axis: the window start, or the first bucket start when
/// a weekly or monthly bucket begins before the window.
pub fn chart_origin(view: &DashboardView) -> NaiveDate {
    let start = view.window.start();
    view.buckets
        .first()
        .map_or(start, |b| b.bucket_start.min(start))
}

/// `[0, days from the origin to the window end]`, at least one day wide.
pub fn x_bounds(view: &DashboardView) -> [f64; 2] {
    [0.0, day_offset(chart_origin(view), view.window.end()).max(1.0)]
}

fn day_offset(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

/// Ordinary least-squares line through `points`, evaluated at the first and
/// last x.
pub fn trend_line(points: &[(f64, f64)]) -> Option<[(f64, f64); 2]> {
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (slope, intercept) = Statistics::linear_fit(&xs, &ys)?;
    let x0 = Statistics::min(&xs)?;
    let x1 = Statistics::max(&xs)?;
    Some([
        (x0, slope * x0 + intercept),
        (x1, slope * x1 + intercept),
    ])
}

/// Metrics drawn for a selection, one facet each.
pub fn facets(selection: MetricSelection) -> Vec<Metric> {
    match selection {
        MetricSelection::Single(m) => vec![m],
        MetricSelection::All => Metric::ALL.to_vec(),
    }
}

fn marker_and_graph(chart_type: ChartType) -> (Marker, GraphType) {
    match chart_type {
        ChartType::Line => (Marker::Braille, GraphType::Line),
        ChartType::Area => (Marker::Braille, GraphType::Bar),
        ChartType::Bar => (Marker::HalfBlock, GraphType::Bar),
    }
}

// ── Render ────────────────────────────────────────────────────────────────────

/// Render one chart per selected metric, stacked vertically.
pub fn render_trends(
    frame: &mut Frame,
    area: Rect,
    view: &DashboardView,
    request: &DashboardRequest,
    theme: &Theme,
) {
    let metrics = facets(request.metric);
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, metrics.len() as u32); metrics.len()])
        .split(area);

    for (metric, chunk) in metrics.into_iter().zip(areas.iter()) {
        let series = MetricSeries::from_view(view, metric, request.show_trends);
        render_metric_chart(frame, *chunk, view, &series, request, theme);
    }
}

fn render_metric_chart(
    frame: &mut Frame,
    area: Rect,
    view: &DashboardView,
    series: &MetricSeries,
    request: &DashboardRequest,
    theme: &Theme,
) {
    let title = format!(
        " {} over time ({}) ",
        series.metric.label(),
        request.granularity.label()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(title);

    if series.points.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No values for this metric in the selected range.",
            theme.dim,
        )))
        .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let (marker, graph_type) = marker_and_graph(request.chart_type);
    let series_style = theme.metric_style(series.metric);

    let trend_points: Vec<(f64, f64)> = series.trend.map(|t| t.to_vec()).unwrap_or_default();

    let mut datasets = vec![ChartDataset::default()
        .name(series.metric.key())
        .marker(marker)
        .graph_type(graph_type)
        .style(series_style)
        .data(&series.points)];
    if !trend_points.is_empty() {
        datasets.push(
            ChartDataset::default()
                .name("trend")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.trend)
                .data(&trend_points),
        );
    }

    let x_labels = vec![
        chart_origin(view).format("%Y-%m-%d").to_string(),
        view.window.end().format("%Y-%m-%d").to_string(),
    ];
    let [y_lo, y_hi] = series.y_bounds();
    let y_labels = vec![
        format_number(y_lo, 1),
        format_number((y_lo + y_hi) / 2.0, 1),
        format_number(y_hi, 1),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(theme.dim)
                .bounds(x_bounds(view))
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.dim)
                .bounds([y_lo, y_hi])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
