//! Calendar resampling of hourly rows into daily, weekly and monthly buckets.
//!
//! Consumption and bill are summed; price and temperature are averaged.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use dashboard_core::models::{
    AggregatedBucket, ChartPoint, Dataset, EmptyBuckets, Granularity, Metric, MetricSelection,
    Reduction, TimeSeriesRow,
};

// ── BucketAccumulator ─────────────────────────────────────────────────────────

/// Running totals for one bucket.
#[derive(Debug, Clone, Default)]
struct BucketAccumulator {
    count: usize,
    /// Column sums in [`Metric::ALL`] order.
    sums: [f64; 4],
}

impl BucketAccumulator {
    fn add_row(&mut self, row: &TimeSeriesRow) {
        self.count += 1;
        for metric in Metric::ALL {
            self.sums[metric.index()] += row.value(metric);
        }
    }

    /// Reduced value of `metric`; a mean over no rows is undefined.
    fn reduce(&self, metric: Metric) -> Option<f64> {
        let sum = self.sums[metric.index()];
        match metric.reduction() {
            Reduction::Sum => Some(sum),
            Reduction::Mean => (self.count > 0).then(|| sum / self.count as f64),
        }
    }

    fn into_bucket(self, bucket_start: NaiveDate) -> AggregatedBucket {
        AggregatedBucket {
            bucket_start,
            row_count: self.count,
            consumption_kwh: self.reduce(Metric::Consumption).unwrap_or(0.0),
            bill_eur: self.reduce(Metric::Bill).unwrap_or(0.0),
            price_cents_per_kwh: self.reduce(Metric::Price),
            temperature_c: self.reduce(Metric::Temperature),
        }
    }
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Stateless helper that groups rows into calendar buckets.
pub struct Aggregator;

impl Aggregator {
    /// Resample `dataset` at `granularity`.
    ///
    /// Buckets are ascending by start date. With [`EmptyBuckets::Fill`],
    /// calendar buckets between the first and last populated one that
    /// received no rows are emitted with zero sums and `None` means.
    pub fn aggregate(
        dataset: &Dataset,
        granularity: Granularity,
        empty: EmptyBuckets,
    ) -> Vec<AggregatedBucket> {
        let mut map: BTreeMap<NaiveDate, BucketAccumulator> = BTreeMap::new();

        for row in dataset {
            map.entry(granularity.bucket_start(row.date()))
                .or_default()
                .add_row(row);
        }

        if empty == EmptyBuckets::Fill {
            Self::fill_gaps(&mut map, granularity);
        }

        map.into_iter()
            .map(|(start, acc)| acc.into_bucket(start))
            .collect()
    }

    /// Melt buckets into `(date, metric, value)` triples in [`Metric::ALL`]
    /// order per bucket. Undefined means are skipped.
    pub fn to_long_form(buckets: &[AggregatedBucket]) -> Vec<ChartPoint> {
        buckets
            .iter()
            .flat_map(|b| {
                Metric::ALL.into_iter().filter_map(move |metric| {
                    b.value(metric).map(|value| ChartPoint {
                        date: b.bucket_start,
                        metric,
                        value,
                    })
                })
            })
            .collect()
    }

    /// Keep the points belonging to `selection`; `All` keeps everything.
    pub fn select_metric(points: &[ChartPoint], selection: MetricSelection) -> Vec<ChartPoint> {
        points
            .iter()
            .filter(|p| selection.includes(p.metric))
            .copied()
            .collect()
    }

    /// Points of a single metric as `(date, value)` pairs.
    pub fn series(points: &[ChartPoint], metric: Metric) -> Vec<(NaiveDate, f64)> {
        points
            .iter()
            .filter(|p| p.metric == metric)
            .map(|p| (p.date, p.value))
            .collect()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn fill_gaps(map: &mut BTreeMap<NaiveDate, BucketAccumulator>, granularity: Granularity) {
        let (Some(&first), Some(&last)) = (map.keys().next(), map.keys().next_back()) else {
            return;
        };
        let mut cursor = granularity.next_bucket(first);
        while cursor < last {
            map.entry(cursor).or_default();
            cursor = granularity.next_bucket(cursor);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
