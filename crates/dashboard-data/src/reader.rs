//! CSV ingestion for the two hourly source exports.
//!
//! The consumption file is comma-delimited with columns `time` and `kWh`.
//! The price file is semicolon-delimited, uses decimal commas, and has
//! columns `timestamp` (`%H:%M %m/%d/%Y`), `Price` and `Temperature`.
//!
//! Unparseable or empty numeric cells are kept as missing values so the
//! joiner can drop the row; an unparseable timestamp aborts the load.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::settings::SourcePaths;
use tracing::{debug, warn};

/// Header of the consumption timestamp column.
pub const CONSUMPTION_TIME_COLUMN: &str = "time";
/// Header of the consumption value column.
pub const CONSUMPTION_KWH_COLUMN: &str = "kWh";
/// Header of the price timestamp column.
pub const PRICE_TIME_COLUMN: &str = "timestamp";
pub const PRICE_COLUMN: &str = "Price";
pub const TEMPERATURE_COLUMN: &str = "Temperature";

/// Timestamp layout of the price file (hour:minute month/day/year).
pub const PRICE_TIMESTAMP_FORMAT: &str = "%H:%M %m/%d/%Y";

/// Naive layouts tried, in order, for consumption timestamps that are not
/// RFC 3339.
const CONSUMPTION_TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Human-readable description used in `DateParse` errors.
const CONSUMPTION_TIMESTAMP_DESCRIPTION: &str = "ISO 8601 date-time (e.g. 2015-01-01 00:00:00)";

// ── Records ───────────────────────────────────────────────────────────────────

/// A record keyed by the hour it describes.
pub trait Timestamped {
    fn timestamp(&self) -> NaiveDateTime;
}

/// One line of the consumption file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumptionRecord {
    pub timestamp: NaiveDateTime,
    /// `None` when the cell was empty or not a number.
    pub kwh: Option<f64>,
}

/// One line of the price file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRecord {
    pub timestamp: NaiveDateTime,
    pub price_cents_per_kwh: Option<f64>,
    pub temperature_c: Option<f64>,
}

impl Timestamped for ConsumptionRecord {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

impl Timestamped for PriceRecord {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

impl ConsumptionRecord {
    pub fn is_complete(&self) -> bool {
        self.kwh.is_some()
    }
}

impl PriceRecord {
    pub fn is_complete(&self) -> bool {
        self.price_cents_per_kwh.is_some() && self.temperature_c.is_some()
    }
}

/// Records read from one file, ascending by timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable<T> {
    pub records: Vec<T>,
    /// Lines with at least one missing or unparseable value.
    pub incomplete_rows: usize,
    /// Lines skipped because the timestamp cell was empty.
    pub skipped_rows: usize,
}

impl<T: Timestamped> SourceTable<T> {
    fn sorted(mut records: Vec<T>, incomplete_rows: usize, skipped_rows: usize) -> Self {
        records.sort_by_key(Timestamped::timestamp);
        Self {
            records,
            incomplete_rows,
            skipped_rows,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read both source files.
pub fn read_sources(
    paths: &SourcePaths,
) -> Result<(SourceTable<ConsumptionRecord>, SourceTable<PriceRecord>)> {
    let consumption = read_consumption(&paths.consumption)?;
    let prices = read_prices(&paths.price)?;
    Ok((consumption, prices))
}

/// Read the comma-delimited consumption file.
pub fn read_consumption(path: &Path) -> Result<SourceTable<ConsumptionRecord>> {
    let mut reader = open_csv(path, b',')?;
    let headers = read_headers(&mut reader, path)?;
    let time_idx = column_index(&headers, path, CONSUMPTION_TIME_COLUMN)?;
    let kwh_idx = column_index(&headers, path, CONSUMPTION_KWH_COLUMN)?;

    let mut records = Vec::new();
    let mut incomplete = 0usize;
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result.map_err(|source| csv_error(path, source))?;

        let raw_ts = record.get(time_idx).unwrap_or("");
        if raw_ts.is_empty() {
            skipped += 1;
            continue;
        }
        let timestamp = parse_consumption_timestamp(raw_ts)?;

        let kwh = parse_number(record.get(kwh_idx), false);
        if kwh.is_none() {
            incomplete += 1;
            log_missing_value(path, &record, CONSUMPTION_KWH_COLUMN);
        }

        records.push(ConsumptionRecord { timestamp, kwh });
    }

    debug!(
        "Consumption file {}: {} rows, {} incomplete, {} without timestamp",
        path.display(),
        records.len(),
        incomplete,
        skipped
    );

    Ok(SourceTable::sorted(records, incomplete, skipped))
}

/// Read the semicolon-delimited, decimal-comma price file.
pub fn read_prices(path: &Path) -> Result<SourceTable<PriceRecord>> {
    let mut reader = open_csv(path, b';')?;
    let headers = read_headers(&mut reader, path)?;
    let time_idx = column_index(&headers, path, PRICE_TIME_COLUMN)?;
    let price_idx = column_index(&headers, path, PRICE_COLUMN)?;
    let temp_idx = column_index(&headers, path, TEMPERATURE_COLUMN)?;

    let mut records = Vec::new();
    let mut incomplete = 0usize;
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result.map_err(|source| csv_error(path, source))?;

        let raw_ts = record.get(time_idx).unwrap_or("");
        if raw_ts.is_empty() {
            skipped += 1;
            continue;
        }
        let timestamp = parse_price_timestamp(raw_ts)?;

        let price_cents_per_kwh = parse_number(record.get(price_idx), true);
        let temperature_c = parse_number(record.get(temp_idx), true);
        if price_cents_per_kwh.is_none() {
            log_missing_value(path, &record, PRICE_COLUMN);
        }
        if temperature_c.is_none() {
            log_missing_value(path, &record, TEMPERATURE_COLUMN);
        }

        let row = PriceRecord {
            timestamp,
            price_cents_per_kwh,
            temperature_c,
        };
        if !row.is_complete() {
            incomplete += 1;
        }
        records.push(row);
    }

    debug!(
        "Price file {}: {} rows, {} incomplete, {} without timestamp",
        path.display(),
        records.len(),
        incomplete,
        skipped
    );

    Ok(SourceTable::sorted(records, incomplete, skipped))
}

/// Parse a consumption timestamp.
///
/// RFC 3339 values with an offset keep their wall-clock time; naive values
/// are tried against the common ISO layouts, and a bare date means midnight.
pub fn parse_consumption_timestamp(value: &str) -> Result<NaiveDateTime> {
    let s = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.naive_local());
    }
    for fmt in CONSUMPTION_TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d.and_time(NaiveTime::MIN));
    }

    Err(DashboardError::DateParse {
        value: s.to_string(),
        format: CONSUMPTION_TIMESTAMP_DESCRIPTION.to_string(),
    })
}

/// Parse a price-file timestamp (`%H:%M %m/%d/%Y`).
pub fn parse_price_timestamp(value: &str) -> Result<NaiveDateTime> {
    let s = value.trim();
    NaiveDateTime::parse_from_str(s, PRICE_TIMESTAMP_FORMAT).map_err(|_| {
        DashboardError::DateParse {
            value: s.to_string(),
            format: PRICE_TIMESTAMP_FORMAT.to_string(),
        }
    })
}

/// Parse a numeric cell. Empty, non-numeric and non-finite cells are `None`.
///
/// With `decimal_comma`, `"12,5"` reads as `12.5`.
pub fn parse_number(cell: Option<&str>, decimal_comma: bool) -> Option<f64> {
    let s = cell?.trim();
    if s.is_empty() {
        return None;
    }
    let parsed = if decimal_comma {
        s.replace(',', ".").parse::<f64>()
    } else {
        s.parse::<f64>()
    };
    parsed.ok().filter(|v| v.is_finite())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn open_csv(path: &Path, delimiter: u8) -> Result<csv::Reader<File>> {
    if !path.exists() {
        return Err(DashboardError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| DashboardError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file))
}

fn read_headers(reader: &mut csv::Reader<File>, path: &Path) -> Result<StringRecord> {
    reader
        .headers()
        .cloned()
        .map_err(|source| csv_error(path, source))
}

fn column_index(headers: &StringRecord, path: &Path, column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| DashboardError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}

fn csv_error(path: &Path, source: csv::Error) -> DashboardError {
    DashboardError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn log_missing_value(path: &Path, record: &StringRecord, column: &str) {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    warn!(
        "{}:{}: missing or unparseable '{}' value",
        path.display(),
        line,
        column
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
