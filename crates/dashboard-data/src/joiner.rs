//! Inner join of the consumption and price tables on the hourly timestamp.

use std::cmp::Ordering;

use dashboard_core::models::{Dataset, TimeSeriesRow};
use serde::Serialize;
use tracing::{info, warn};

use crate::reader::{ConsumptionRecord, PriceRecord, SourceTable, Timestamped};

/// Bookkeeping produced by [`join_sources`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    /// Lines read from the consumption file.
    pub consumption_rows: usize,
    /// Lines read from the price file.
    pub price_rows: usize,
    /// Rows in the resulting dataset.
    pub joined_rows: usize,
    /// Consumption hours with no price line.
    pub unmatched_consumption: usize,
    /// Price hours with no consumption line.
    pub unmatched_price: usize,
    /// Matched hours dropped because a value was missing on either side.
    pub incomplete_rows: usize,
    /// Repeated timestamps within one file (later occurrences discarded).
    pub duplicate_timestamps: usize,
}

impl JoinReport {
    /// Hours present in at least one file that did not make it into the dataset.
    pub fn dropped_rows(&self) -> usize {
        self.unmatched_consumption + self.unmatched_price + self.incomplete_rows
    }
}

/// Join both tables on the exact hourly timestamp, keeping only hours where
/// consumption, price and temperature are all present, and derive the bill.
pub fn join_sources(
    consumption: SourceTable<ConsumptionRecord>,
    prices: SourceTable<PriceRecord>,
) -> (Dataset, JoinReport) {
    let mut report = JoinReport {
        consumption_rows: consumption.len(),
        price_rows: prices.len(),
        ..Default::default()
    };

    let (cons, cons_dups) = dedup_sorted(consumption.records);
    let (price, price_dups) = dedup_sorted(prices.records);
    report.duplicate_timestamps = cons_dups + price_dups;

    let mut rows = Vec::with_capacity(cons.len().min(price.len()));
    let mut i = 0;
    let mut j = 0;

    while i < cons.len() && j < price.len() {
        let c = &cons[i];
        let p = &price[j];
        match c.timestamp.cmp(&p.timestamp) {
            Ordering::Less => {
                report.unmatched_consumption += 1;
                i += 1;
            }
            Ordering::Greater => {
                report.unmatched_price += 1;
                j += 1;
            }
            Ordering::Equal => {
                match (c.kwh, p.price_cents_per_kwh, p.temperature_c) {
                    (Some(kwh), Some(cents), Some(temp)) => {
                        rows.push(TimeSeriesRow::new(c.timestamp, kwh, cents, temp));
                    }
                    _ => report.incomplete_rows += 1,
                }
                i += 1;
                j += 1;
            }
        }
    }
    report.unmatched_consumption += cons.len() - i;
    report.unmatched_price += price.len() - j;

    let dataset = Dataset::from_rows(rows);
    report.joined_rows = dataset.len();

    if report.duplicate_timestamps > 0 {
        warn!(
            "Discarded {} duplicate timestamps (first occurrence kept)",
            report.duplicate_timestamps
        );
    }
    if report.dropped_rows() > 0 {
        warn!(
            "Dropped {} hours during join: {} without price, {} without consumption, {} incomplete",
            report.dropped_rows(),
            report.unmatched_consumption,
            report.unmatched_price,
            report.incomplete_rows
        );
    }
    info!(
        "Joined {} hourly rows from {} consumption and {} price lines",
        report.joined_rows, report.consumption_rows, report.price_rows
    );

    (dataset, report)
}

/// Drop repeated timestamps from an already sorted vector, keeping the
/// first occurrence. Returns the survivors and the number removed.
fn dedup_sorted<T: Timestamped>(mut records: Vec<T>) -> (Vec<T>, usize) {
    let before = records.len();
    records.dedup_by_key(|r| r.timestamp());
    let removed = before - records.len();
    (records, removed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn cons(entries: &[(u32, Option<f64>)]) -> SourceTable<ConsumptionRecord> {
        SourceTable {
            records: entries
                .iter()
                .map(|&(h, kwh)| ConsumptionRecord {
                    timestamp: ts(h),
                    kwh,
                })
                .collect(),
            incomplete_rows: 0,
            skipped_rows: 0,
        }
    }

    fn prices(entries: &[(u32, Option<f64>, Option<f64>)]) -> SourceTable<PriceRecord> {
        SourceTable {
            records: entries
                .iter()
                .map(|&(h, p, t)| PriceRecord {
                    timestamp: ts(h),
                    price_cents_per_kwh: p,
                    temperature_c: t,
                })
                .collect(),
            incomplete_rows: 0,
            skipped_rows: 0,
        }
    }

    #[test]
    fn test_join_keeps_only_shared_hours() {
        let (ds, report) = join_sources(
            cons(&[(0, Some(1.0)), (1, Some(2.0)), (2, Some(3.0))]),
            prices(&[
                (1, Some(10.0), Some(0.0)),
                (2, Some(20.0), Some(0.0)),
                (3, Some(30.0), Some(0.0)),
            ]),
        );

        let hours: Vec<_> = ds.iter().map(|r| r.timestamp).collect();
        assert_eq!(hours, vec![ts(1), ts(2)]);
        assert_eq!(report.joined_rows, 2);
        assert_eq!(report.unmatched_consumption, 1);
        assert_eq!(report.unmatched_price, 1);
        assert_eq!(report.dropped_rows(), 2);
    }

    #[test]
    fn test_join_derives_bill() {
        let (ds, _) = join_sources(
            cons(&[(0, Some(2.0))]),
            prices(&[(0, Some(10.0), Some(5.0))]),
        );
        let row = ds.rows()[0];
        assert!((row.bill_eur - 0.2).abs() < 1e-9);
        assert_eq!(row.temperature_c, 5.0);
    }

    #[test]
    fn test_join_drops_incomplete_rows() {
        let (ds, report) = join_sources(
            cons(&[(0, None), (1, Some(1.0)), (2, Some(1.0))]),
            prices(&[
                (0, Some(10.0), Some(0.0)),
                (1, None, Some(0.0)),
                (2, Some(10.0), Some(0.0)),
            ]),
        );
        assert_eq!(ds.len(), 1);
        assert_eq!(report.incomplete_rows, 2);
    }

    #[test]
    fn test_join_duplicate_timestamp_keeps_first() {
        let (ds, report) = join_sources(
            cons(&[(0, Some(1.0)), (0, Some(9.0))]),
            prices(&[(0, Some(10.0), Some(0.0))]),
        );
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.rows()[0].consumption_kwh, 1.0);
        assert_eq!(report.duplicate_timestamps, 1);
        assert_eq!(report.consumption_rows, 2);
    }

    #[test]
    fn test_join_no_overlap_yields_empty_dataset() {
        let (ds, report) = join_sources(
            cons(&[(0, Some(1.0))]),
            prices(&[(5, Some(10.0), Some(0.0))]),
        );
        assert!(ds.is_empty());
        assert_eq!(report.joined_rows, 0);
    }
}
