//! Data layer for the energy dashboard.
//!
//! Reads the hourly consumption and price/temperature CSV exports, joins them
//! into a single [`Dataset`](dashboard_core::models::Dataset), and provides
//! the window filter, calendar aggregation, summary metrics and insight
//! helpers computed over it.

pub mod aggregator;
pub mod filter;
pub mod insights;
pub mod joiner;
pub mod metrics;
pub mod pipeline;
pub mod reader;

pub use dashboard_core as core;
