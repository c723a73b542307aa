use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the energy dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A source CSV file does not exist.
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// A source file exists but could not be opened or read.
    #[error("Failed to read file {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected a record or header line.
    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required header column is absent from a source file.
    #[error("Column '{column}' not found in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A timestamp string did not match the expected format.
    #[error("Invalid timestamp '{value}' (expected format {format})")]
    DateParse { value: String, format: String },

    /// The requested window starts after it ends.
    #[error("Invalid date window: start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    /// The window is valid but contains no rows.
    #[error("No data available between {start} and {end}")]
    EmptySlice { start: NaiveDate, end: NaiveDate },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    /// `true` for errors that abort the whole session (ingestion failures).
    ///
    /// `InvalidWindow` and `EmptySlice` are scoped to a single render and
    /// leave the cached dataset untouched.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DashboardError::InvalidWindow { .. } | DashboardError::EmptySlice { .. }
        )
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
