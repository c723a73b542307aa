//! Runtime layer for the energy dashboard.
//!
//! Owns the one-time dataset initialisation and turns typed user requests
//! into fully computed dashboard views.

pub mod dashboard;
pub mod store;

pub use dashboard_core as core;
pub use dashboard_data as data;
