//! Load pipeline: read both sources, join them, and record timings.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use dashboard_core::error::Result;
use dashboard_core::models::Dataset;
use dashboard_core::settings::SourcePaths;
use serde::Serialize;
use tracing::info;

use crate::joiner::{join_sources, JoinReport};
use crate::reader::read_sources;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the loaded dataset.
#[derive(Debug, Clone, Serialize)]
pub struct LoadMetadata {
    /// RFC 3339 timestamp of when the load finished.
    pub generated_at: String,
    /// Wall-clock seconds spent reading both CSV files.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent joining.
    pub join_time_seconds: f64,
    pub consumption_path: PathBuf,
    pub price_path: PathBuf,
}

/// The complete output of [`load_dataset`].
#[derive(Debug, Clone, Serialize)]
pub struct LoadedDataset {
    #[serde(skip)]
    pub dataset: Dataset,
    pub report: JoinReport,
    pub metadata: LoadMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full load.
///
/// 1. Read the consumption and price files.
/// 2. Inner-join them on the hourly timestamp and derive the bill.
/// 3. Return the dataset with its [`JoinReport`] and timings.
///
/// Any ingestion error aborts the load; nothing partial is returned.
pub fn load_dataset(paths: &SourcePaths) -> Result<LoadedDataset> {
    // ── Step 1: Read ──────────────────────────────────────────────────────────
    let load_start = Instant::now();
    let (consumption, prices) = read_sources(paths)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Join ──────────────────────────────────────────────────────────
    let join_start = Instant::now();
    let (dataset, report) = join_sources(consumption, prices);
    let join_time = join_start.elapsed().as_secs_f64();

    info!(
        "Loaded {} hourly rows in {:.3}s (join {:.3}s)",
        dataset.len(),
        load_time,
        join_time
    );

    // ── Step 3: Build result ──────────────────────────────────────────────────
    Ok(LoadedDataset {
        dataset,
        report,
        metadata: LoadMetadata {
            generated_at: Utc::now().to_rfc3339(),
            load_time_seconds: load_time,
            join_time_seconds: join_time,
            consumption_path: paths.consumption.clone(),
            price_path: paths.price.clone(),
        },
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
