//! Core types for the energy dashboard.
//!
//! Holds the domain model (hourly rows, date windows, aggregation and metric
//! outputs), the error type, command-line settings and the small numeric and
//! calendar helpers shared by the data, runtime and UI crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod statistics;
pub mod time_utils;
