//! Terminal presentation layer for the energy dashboard.
//!
//! Provides themes, the header and metric-card components, the overview,
//! trend, correlation and raw-data views, and the application event loop
//! built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod heatmap_view;
pub mod metrics_view;
pub mod table_view;
pub mod themes;

pub use dashboard_core as core;
