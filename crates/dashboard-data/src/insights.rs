//! Derived insight figures shown next to the headline metrics.

use chrono::NaiveDate;
use dashboard_core::models::{Dataset, DateWindow, Metric, MetricsSummary};
use dashboard_core::statistics::Statistics;
use dashboard_core::time_utils;
use serde::Serialize;

use crate::filter;

// ── QuickStats ────────────────────────────────────────────────────────────────

/// Selection-summary figures computed straight from the raw picker dates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuickStats {
    /// `(end - start) + 1`; zero or negative for an inverted selection.
    pub total_days: i64,
    /// Mean hourly consumption of the slice; `None` when it is empty or the
    /// selection is inverted.
    pub avg_consumption: Option<f64>,
}

/// Quick stats for an unvalidated `start`/`end` pair.
pub fn quick_stats(dataset: &Dataset, start: NaiveDate, end: NaiveDate) -> QuickStats {
    let avg_consumption = DateWindow::new(start, end).ok().and_then(|window| {
        let slice = filter::slice_rows(dataset.rows(), &window);
        let values: Vec<f64> = slice.iter().map(|r| r.consumption_kwh).collect();
        Statistics::mean(&values)
    });

    QuickStats {
        total_days: time_utils::inclusive_day_count(start, end),
        avg_consumption,
    }
}

// ── KeyStatistics ─────────────────────────────────────────────────────────────

/// Extremes and spreads of a slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyStatistics {
    pub peak_consumption: f64,
    pub lowest_consumption: f64,
    pub price_range: f64,
    pub temperature_range: f64,
    pub efficiency_score: f64,
}

impl KeyStatistics {
    /// `(label, value)` pairs in display order.
    pub fn labelled(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Peak Consumption", format!("{:.1} kWh", self.peak_consumption)),
            ("Lowest Consumption", format!("{:.1} kWh", self.lowest_consumption)),
            ("Price Range", format!("{:.2} cents", self.price_range)),
            ("Temp Range", format!("{:.1}°C", self.temperature_range)),
            ("Efficiency", format!("{:.1}", self.efficiency_score)),
        ]
    }
}

/// Key statistics of `slice`, or `None` when it is empty.
pub fn key_statistics(slice: &Dataset, efficiency_score: f64) -> Option<KeyStatistics> {
    let consumption = slice.column(Metric::Consumption);
    Some(KeyStatistics {
        peak_consumption: Statistics::max(&consumption)?,
        lowest_consumption: Statistics::min(&consumption)?,
        price_range: Statistics::range(&slice.column(Metric::Price))?,
        temperature_range: Statistics::range(&slice.column(Metric::Temperature))?,
        efficiency_score,
    })
}

// ── Temperature classification ────────────────────────────────────────────────

/// Heating demand implied by the average temperature of a northern climate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureImpact {
    ExtremeCold,
    VeryCold,
    Cold,
    Cool,
    Mild,
    Warm,
}

impl TemperatureImpact {
    pub fn classify(avg_temperature: f64) -> Self {
        if avg_temperature < -15.0 {
            TemperatureImpact::ExtremeCold
        } else if avg_temperature < -5.0 {
            TemperatureImpact::VeryCold
        } else if avg_temperature < 5.0 {
            TemperatureImpact::Cold
        } else if avg_temperature < 15.0 {
            TemperatureImpact::Cool
        } else if avg_temperature < 25.0 {
            TemperatureImpact::Mild
        } else {
            TemperatureImpact::Warm
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemperatureImpact::ExtremeCold => "Extreme Cold (High Heating)",
            TemperatureImpact::VeryCold => "Very Cold (High Heating)",
            TemperatureImpact::Cold => "Cold (Moderate Heating)",
            TemperatureImpact::Cool => "Cool (Low Heating)",
            TemperatureImpact::Mild => "Mild (Minimal Heating)",
            TemperatureImpact::Warm => "Warm (No Heating)",
        }
    }
}

/// Spread of temperatures over the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureVariation {
    High,
    Moderate,
    Low,
}

impl TemperatureVariation {
    pub fn classify(temperature_range: f64) -> Self {
        if temperature_range > 25.0 {
            TemperatureVariation::High
        } else if temperature_range > 15.0 {
            TemperatureVariation::Moderate
        } else {
            TemperatureVariation::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemperatureVariation::High => "High Seasonal Variation",
            TemperatureVariation::Moderate => "Moderate Variation",
            TemperatureVariation::Low => "Low Variation",
        }
    }
}

// ── BillingHighlights ─────────────────────────────────────────────────────────

/// Secondary figures attached to the bill and price cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillingHighlights {
    /// Total bill divided by the nominal day count.
    pub bill_per_day: f64,
    /// The bill is negative (money received).
    pub is_credit: bool,
    pub negative_avg_price: bool,
    /// Hourly rows in the slice.
    pub data_points: usize,
    /// `data_points / 24`.
    pub data_days: f64,
    pub temperature_impact: TemperatureImpact,
    pub temperature_variation: TemperatureVariation,
    /// The hourly peak exceeds the average daily consumption.
    pub peak_above_daily_avg: bool,
}

impl BillingHighlights {
    pub fn from_summary(summary: &MetricsSummary, data_points: usize) -> Self {
        Self {
            bill_per_day: summary.total_bill / summary.num_days_in_filter as f64,
            is_credit: summary.total_bill < 0.0,
            negative_avg_price: summary.avg_price < 0.0,
            data_points,
            data_days: data_points as f64 / 24.0,
            temperature_impact: TemperatureImpact::classify(summary.avg_temperature),
            temperature_variation: TemperatureVariation::classify(summary.temperature_range),
            peak_above_daily_avg: summary.max_consumption > summary.daily_avg_consumption,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;
    use dashboard_core::models::TimeSeriesRow;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Dataset {
        let d = date(2024, 1, 2);
        Dataset::from_rows(vec![
            TimeSeriesRow::new(d.and_hms_opt(0, 0, 0).unwrap(), 1.0, 4.0, -20.0),
            TimeSeriesRow::new(d.and_hms_opt(1, 0, 0).unwrap(), 3.0, 10.0, -10.0),
        ])
    }

    #[test]
    fn test_quick_stats_valid_selection() {
        let q = quick_stats(&sample(), date(2024, 1, 1), date(2024, 1, 3));
        assert_eq!(q.total_days, 3);
        assert_eq!(q.avg_consumption, Some(2.0));
    }

    #[test]
    fn test_quick_stats_inverted_selection() {
        let q = quick_stats(&sample(), date(2024, 1, 3), date(2024, 1, 1));
        assert_eq!(q.total_days, -1);
        assert!(q.avg_consumption.is_none());
    }

    #[test]
    fn test_quick_stats_empty_slice() {
        let q = quick_stats(&sample(), date(2023, 1, 1), date(2023, 1, 1));
        assert_eq!(q.total_days, 1);
        assert!(q.avg_consumption.is_none());
    }

    #[test]
    fn test_key_statistics_labels() {
        let ks = key_statistics(&sample(), 0.34).unwrap();
        let labelled = ks.labelled();
        assert_eq!(labelled[0], ("Peak Consumption", "3.0 kWh".to_string()));
        assert_eq!(labelled[1], ("Lowest Consumption", "1.0 kWh".to_string()));
        assert_eq!(labelled[2], ("Price Range", "6.00 cents".to_string()));
        assert_eq!(labelled[3], ("Temp Range", "10.0°C".to_string()));
        assert_eq!(labelled[4], ("Efficiency", "0.3".to_string()));
    }

    #[test]
    fn test_key_statistics_empty() {
        assert!(key_statistics(&Dataset::empty(), 0.0).is_none());
    }

    #[test]
    fn test_temperature_impact_thresholds() {
        assert_eq!(TemperatureImpact::classify(-16.0), TemperatureImpact::ExtremeCold);
        assert_eq!(TemperatureImpact::classify(-15.0), TemperatureImpact::VeryCold);
        assert_eq!(TemperatureImpact::classify(0.0), TemperatureImpact::Cold);
        assert_eq!(TemperatureImpact::classify(5.0), TemperatureImpact::Cool);
        assert_eq!(TemperatureImpact::classify(20.0), TemperatureImpact::Mild);
        assert_eq!(TemperatureImpact::classify(25.0), TemperatureImpact::Warm);
    }

    #[test]
    fn test_temperature_variation_thresholds() {
        assert_eq!(TemperatureVariation::classify(30.0), TemperatureVariation::High);
        assert_eq!(TemperatureVariation::classify(25.0), TemperatureVariation::Moderate);
        assert_eq!(TemperatureVariation::classify(15.0), TemperatureVariation::Low);
    }

    #[test]
    fn test_billing_highlights() {
        let ds = sample();
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 2)).unwrap();
        let summary = metrics::summarize(&ds, &window).unwrap();
        let h = BillingHighlights::from_summary(&summary, ds.len());

        // bill = 0.04 + 0.30 over 2 nominal days
        assert!((h.bill_per_day - 0.17).abs() < 1e-9);
        assert!(!h.is_credit);
        assert!(!h.negative_avg_price);
        assert_eq!(h.data_points, 2);
        assert!((h.data_days - 2.0 / 24.0).abs() < 1e-12);
        assert_eq!(h.temperature_impact, TemperatureImpact::VeryCold);
        assert_eq!(h.temperature_variation, TemperatureVariation::Low);
    }
}
