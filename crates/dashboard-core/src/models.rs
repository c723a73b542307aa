use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DashboardError, Result};
use crate::time_utils;

// ── Metric ────────────────────────────────────────────────────────────────────

/// How a metric is reduced when several rows fall into one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Mean,
}

/// One of the four numeric columns of a [`Dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Consumption,
    Price,
    Temperature,
    Bill,
}

impl Metric {
    /// Column order used by the correlation matrix and the long chart form.
    pub const ALL: [Metric; 4] = [
        Metric::Consumption,
        Metric::Price,
        Metric::Temperature,
        Metric::Bill,
    ];

    /// Display label including the unit.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Consumption => "Consumption (kWh)",
            Metric::Price => "Price (cents/kWh)",
            Metric::Temperature => "Temperature (°C)",
            Metric::Bill => "Bill (€)",
        }
    }

    /// Short lowercase key, as accepted on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Consumption => "consumption",
            Metric::Price => "price",
            Metric::Temperature => "temperature",
            Metric::Bill => "bill",
        }
    }

    /// Consumption and bill are additive; price and temperature are averaged.
    pub fn reduction(self) -> Reduction {
        match self {
            Metric::Consumption | Metric::Bill => Reduction::Sum,
            Metric::Price | Metric::Temperature => Reduction::Mean,
        }
    }

    /// Position of this metric in [`Metric::ALL`].
    pub fn index(self) -> usize {
        match self {
            Metric::Consumption => 0,
            Metric::Price => 1,
            Metric::Temperature => 2,
            Metric::Bill => 3,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── TimeSeriesRow ─────────────────────────────────────────────────────────────

/// Bill in euros for `kwh` consumed at `cents_per_kwh`.
pub fn compute_bill(kwh: f64, cents_per_kwh: f64) -> f64 {
    kwh * (cents_per_kwh / 100.0)
}

/// One fully-populated hourly observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    /// Hour the observation belongs to.
    pub timestamp: NaiveDateTime,
    /// Energy consumed during the hour.
    pub consumption_kwh: f64,
    /// Spot price; may be negative.
    pub price_cents_per_kwh: f64,
    /// Outdoor temperature.
    pub temperature_c: f64,
    /// Derived: `consumption_kwh * price_cents_per_kwh / 100`.
    pub bill_eur: f64,
}

impl TimeSeriesRow {
    /// Build a row and derive its bill.
    pub fn new(
        timestamp: NaiveDateTime,
        consumption_kwh: f64,
        price_cents_per_kwh: f64,
        temperature_c: f64,
    ) -> Self {
        Self {
            timestamp,
            consumption_kwh,
            price_cents_per_kwh,
            temperature_c,
            bill_eur: compute_bill(consumption_kwh, price_cents_per_kwh),
        }
    }

    /// Calendar date of the observation.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Value of a single metric column.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Consumption => self.consumption_kwh,
            Metric::Price => self.price_cents_per_kwh,
            Metric::Temperature => self.temperature_c,
            Metric::Bill => self.bill_eur,
        }
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// Rows strictly ascending by timestamp, no duplicates.
///
/// The only way to build one is through [`Dataset::from_rows`], which sorts
/// and collapses repeated timestamps (first occurrence wins).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    rows: Vec<TimeSeriesRow>,
}

impl Dataset {
    /// An empty dataset.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a dataset, enforcing ordering and timestamp uniqueness.
    pub fn from_rows(mut rows: Vec<TimeSeriesRow>) -> Self {
        // Stable sort keeps the first occurrence of a duplicate in front.
        rows.sort_by_key(|r| r.timestamp);
        rows.dedup_by_key(|r| r.timestamp);
        Self { rows }
    }

    pub fn rows(&self) -> &[TimeSeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSeriesRow> {
        self.rows.iter()
    }

    /// Date of the earliest row.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(TimeSeriesRow::date)
    }

    /// Date of the latest row.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(TimeSeriesRow::date)
    }

    /// `(min_date, max_date)` or `None` for an empty dataset.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.first_date()?, self.last_date()?))
    }

    /// Copy one metric column out, in row order.
    pub fn column(&self, metric: Metric) -> Vec<f64> {
        self.rows.iter().map(|r| r.value(metric)).collect()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a TimeSeriesRow;
    type IntoIter = std::slice::Iter<'a, TimeSeriesRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ── DateWindow ────────────────────────────────────────────────────────────────

/// Inclusive calendar-date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Validate and build a window.
    ///
    /// Returns [`DashboardError::InvalidWindow`] when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `true` when `date` lies within the window (both ends inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Nominal number of days in the window, both ends counted.
    pub fn day_count(&self) -> i64 {
        time_utils::inclusive_day_count(self.start, self.end)
    }

    /// The same window moved by `months` calendar months.
    ///
    /// An end on the last day of its month stays on the last day of the
    /// target month, so whole-month windows remain whole months.
    pub fn shift_months(&self, months: i32) -> Self {
        let end = time_utils::add_months(self.end, months);
        let end = if self.end.day() == time_utils::days_in_month(self.end.year(), self.end.month()) {
            end.with_day(time_utils::days_in_month(end.year(), end.month()))
                .unwrap_or(end)
        } else {
            end
        };
        Self {
            start: time_utils::add_months(self.start, months),
            end,
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

// ── Presentation selectors ────────────────────────────────────────────────────

/// Resampling granularity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    /// ISO weeks, Monday through Sunday.
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn label(self) -> &'static str {
        match self {
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
        }
    }

    /// Next option in cycling order.
    pub fn next(self) -> Self {
        match self {
            Granularity::Daily => Granularity::Weekly,
            Granularity::Weekly => Granularity::Monthly,
            Granularity::Monthly => Granularity::Daily,
        }
    }

    /// Left edge of the bucket that `date` belongs to.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date,
            Granularity::Weekly => time_utils::week_start(date),
            Granularity::Monthly => time_utils::month_start(date),
        }
    }

    /// Left edge of the bucket following the one starting at `bucket_start`.
    pub fn next_bucket(self, bucket_start: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => bucket_start + chrono::Duration::days(1),
            Granularity::Weekly => bucket_start + chrono::Duration::days(7),
            Granularity::Monthly => time_utils::add_months(bucket_start, 1),
        }
    }
}

/// Chart style; opaque to the data pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Area,
    Bar,
}

impl ChartType {
    pub fn label(self) -> &'static str {
        match self {
            ChartType::Line => "Line Chart",
            ChartType::Area => "Area Chart",
            ChartType::Bar => "Bar Chart",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ChartType::Line => ChartType::Area,
            ChartType::Area => ChartType::Bar,
            ChartType::Bar => ChartType::Line,
        }
    }
}

/// Which metric(s) the trend chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MetricSelection {
    Single(Metric),
    /// Every metric, one facet each.
    All,
}

impl Default for MetricSelection {
    fn default() -> Self {
        MetricSelection::Single(Metric::Consumption)
    }
}

impl MetricSelection {
    /// Cycling order, matching the metric picker of the dashboard.
    pub const OPTIONS: [MetricSelection; 5] = [
        MetricSelection::Single(Metric::Consumption),
        MetricSelection::Single(Metric::Bill),
        MetricSelection::Single(Metric::Price),
        MetricSelection::Single(Metric::Temperature),
        MetricSelection::All,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetricSelection::Single(m) => m.label(),
            MetricSelection::All => "All (Faceted)",
        }
    }

    pub fn includes(self, metric: Metric) -> bool {
        match self {
            MetricSelection::Single(m) => m == metric,
            MetricSelection::All => true,
        }
    }

    pub fn next(self) -> Self {
        let pos = Self::OPTIONS.iter().position(|o| *o == self).unwrap_or(0);
        Self::OPTIONS[(pos + 1) % Self::OPTIONS.len()]
    }
}

impl FromStr for MetricSelection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consumption" => Ok(MetricSelection::Single(Metric::Consumption)),
            "bill" => Ok(MetricSelection::Single(Metric::Bill)),
            "price" => Ok(MetricSelection::Single(Metric::Price)),
            "temperature" => Ok(MetricSelection::Single(Metric::Temperature)),
            "all" => Ok(MetricSelection::All),
            other => Err(format!(
                "unknown metric '{}' (expected consumption, bill, price, temperature or all)",
                other
            )),
        }
    }
}

impl From<MetricSelection> for String {
    fn from(sel: MetricSelection) -> Self {
        match sel {
            MetricSelection::Single(m) => m.key().to_string(),
            MetricSelection::All => "all".to_string(),
        }
    }
}

impl TryFrom<String> for MetricSelection {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for MetricSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the aggregator does with calendar buckets that received no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyBuckets {
    /// Leave them out of the output.
    #[default]
    Omit,
    /// Emit them with zero sums and undefined means.
    Fill,
}

// ── Aggregation output ────────────────────────────────────────────────────────

/// One resampled interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedBucket {
    /// Left edge of the day / ISO week / month.
    pub bucket_start: NaiveDate,
    /// Rows that contributed to this bucket.
    pub row_count: usize,
    /// Summed.
    pub consumption_kwh: f64,
    /// Summed.
    pub bill_eur: f64,
    /// Averaged; `None` for an empty bucket.
    pub price_cents_per_kwh: Option<f64>,
    /// Averaged; `None` for an empty bucket.
    pub temperature_c: Option<f64>,
}

impl AggregatedBucket {
    /// Reduced value for `metric`, `None` when it is undefined.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Consumption => Some(self.consumption_kwh),
            Metric::Bill => Some(self.bill_eur),
            Metric::Price => self.price_cents_per_kwh,
            Metric::Temperature => self.temperature_c,
        }
    }
}

/// Long-form `(date, metric, value)` triple consumed by charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub metric: Metric,
    pub value: f64,
}

// ── Metrics output ────────────────────────────────────────────────────────────

/// Scalar summary of a dataset slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_consumption: f64,
    pub total_bill: f64,
    pub avg_price: f64,
    pub avg_temperature: f64,
    pub max_consumption: f64,
    pub min_consumption: f64,
    /// Sample standard deviation of price; `None` below two rows.
    pub price_volatility: Option<f64>,
    pub temperature_range: f64,
    /// `total_consumption / num_days_in_filter`.
    pub daily_avg_consumption: f64,
    /// `daily_avg_consumption / avg_price`, or 0 when `avg_price <= 0`.
    pub efficiency_score: f64,
    /// Nominal day count of the window, not the days actually covered.
    pub num_days_in_filter: i64,
}

/// Pairwise Pearson correlations over [`Metric::ALL`].
///
/// A cell is `None` when the coefficient is undefined (a constant column or
/// fewer than two rows).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    metrics: [Metric; 4],
    values: [[Option<f64>; 4]; 4],
}

/// One cell of a [`CorrelationMatrix`] in long form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationCell {
    pub row: Metric,
    pub column: Metric,
    pub value: Option<f64>,
}

impl CorrelationMatrix {
    /// Wrap a value grid laid out in [`Metric::ALL`] order.
    pub fn from_values(values: [[Option<f64>; 4]; 4]) -> Self {
        Self {
            metrics: Metric::ALL,
            values,
        }
    }

    pub fn metrics(&self) -> &[Metric; 4] {
        &self.metrics
    }

    pub fn get(&self, a: Metric, b: Metric) -> Option<f64> {
        self.values[a.index()][b.index()]
    }

    /// All sixteen cells, row-major.
    pub fn cells(&self) -> Vec<CorrelationCell> {
        let mut out = Vec::with_capacity(16);
        for row in self.metrics {
            for column in self.metrics {
                out.push(CorrelationCell {
                    row,
                    column,
                    value: self.get(row, column),
                });
            }
        }
        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
