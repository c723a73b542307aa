//! Load-once dataset store shared by every render.
//!
//! The CSV sources are read and joined at most once per store; afterwards
//! every caller receives the same immutable [`LoadedDataset`] behind an
//! [`Arc`], so per-request computations can run concurrently without
//! further synchronisation. A failed load is reported to the caller and not
//! remembered, so the next call tries again.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use dashboard_core::error::Result;
use dashboard_core::settings::SourcePaths;
use dashboard_data::pipeline::{load_dataset, LoadedDataset};

type Loader = Box<dyn Fn(&SourcePaths) -> Result<LoadedDataset> + Send + Sync>;

// ── DatasetStore ──────────────────────────────────────────────────────────────

/// Lazily initialised, thread-safe holder of the joined dataset.
///
/// # Example
/// ```no_run
/// use dashboard_core::settings::SourcePaths;
/// use dashboard_runtime::store::DatasetStore;
///
/// let store = DatasetStore::new(SourcePaths::new("data/cons.csv", "data/price.csv"));
/// let loaded = store.get_or_load()?;
/// println!("{} hourly rows", loaded.dataset.len());
/// # Ok::<(), dashboard_core::error::DashboardError>(())
/// ```
pub struct DatasetStore {
    paths: SourcePaths,
    loader: Loader,
    /// Populated after the first successful load.
    slot: Mutex<Option<Arc<LoadedDataset>>>,
    /// Number of times the loader actually ran (successful or not).
    loads: AtomicUsize,
    /// Description of the most recent failed load.
    last_error: Mutex<Option<String>>,
}

impl DatasetStore {
    /// Store backed by the CSV load pipeline.
    pub fn new(paths: SourcePaths) -> Self {
        Self::with_loader(paths, load_dataset)
    }

    /// Store with a custom loader.
    pub fn with_loader<F>(paths: SourcePaths, loader: F) -> Self
    where
        F: Fn(&SourcePaths) -> Result<LoadedDataset> + Send + Sync + 'static,
    {
        Self {
            paths,
            loader: Box::new(loader),
            slot: Mutex::new(None),
            loads: AtomicUsize::new(0),
            last_error: Mutex::new(None),
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the dataset, loading it first if no load has succeeded yet.
    ///
    /// Concurrent callers block on the same lock, so the loader runs at most
    /// once per successful initialisation.
    pub fn get_or_load(&self) -> Result<Arc<LoadedDataset>> {
        let mut slot = lock(&self.slot);
        if let Some(loaded) = slot.as_ref() {
            tracing::debug!("returning cached dataset");
            return Ok(Arc::clone(loaded));
        }

        let started = Instant::now();
        self.loads.fetch_add(1, Ordering::SeqCst);
        match (self.loader)(&self.paths) {
            Ok(loaded) => {
                let loaded = Arc::new(loaded);
                tracing::info!(
                    rows = loaded.dataset.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "dataset loaded"
                );
                *slot = Some(Arc::clone(&loaded));
                *lock(&self.last_error) = None;
                Ok(loaded)
            }
            Err(e) => {
                tracing::warn!(error = %e, "dataset load failed");
                *lock(&self.last_error) = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Already-loaded dataset, without triggering a load.
    pub fn get(&self) -> Option<Arc<LoadedDataset>> {
        lock(&self.slot).clone()
    }

    /// Drop the cached dataset so the next [`get_or_load`](Self::get_or_load)
    /// reads the sources again.
    pub fn invalidate(&self) {
        *lock(&self.slot) = None;
        tracing::debug!("dataset cache invalidated");
    }

    pub fn is_loaded(&self) -> bool {
        lock(&self.slot).is_some()
    }

    /// How many times the loader has run.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Description of the last failed load, cleared by a later success.
    pub fn last_error(&self) -> Option<String> {
        lock(&self.last_error).clone()
    }

    pub fn paths(&self) -> &SourcePaths {
        &self.paths
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::error::DashboardError;
    use dashboard_core::models::{Dataset, TimeSeriesRow};
    use dashboard_data::joiner::JoinReport;
    use dashboard_data::pipeline::LoadMetadata;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;

    fn paths() -> SourcePaths {
        SourcePaths::new("cons.csv", "price.csv")
    }

    fn fake_loaded(paths: &SourcePaths) -> LoadedDataset {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        LoadedDataset {
            dataset: Dataset::from_rows(vec![TimeSeriesRow::new(ts, 1.0, 10.0, 0.0)]),
            report: JoinReport::default(),
            metadata: LoadMetadata {
                generated_at: String::new(),
                load_time_seconds: 0.0,
                join_time_seconds: 0.0,
                consumption_path: paths.consumption.clone(),
                price_path: paths.price.clone(),
            },
        }
    }

    #[test]
    fn test_first_call_loads() {
        let store = DatasetStore::with_loader(paths(), |p| Ok(fake_loaded(p)));
        assert!(!store.is_loaded());
        assert!(store.get().is_none());

        let loaded = store.get_or_load().unwrap();
        assert_eq!(loaded.dataset.len(), 1);
        assert!(store.is_loaded());
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn test_second_call_reuses_cached_dataset() {
        let store = DatasetStore::with_loader(paths(), |p| Ok(fake_loaded(p)));
        let a = store.get_or_load().unwrap();
        let b = store.get_or_load().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn test_concurrent_callers_load_once() {
        let store = DatasetStore::with_loader(paths(), |p| {
            thread::sleep(Duration::from_millis(20));
            Ok(fake_loaded(p))
        });

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let loaded = store.get_or_load().unwrap();
                    assert_eq!(loaded.dataset.len(), 1);
                });
            }
        });

        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let fail = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&fail);
        let store = DatasetStore::with_loader(paths(), move |p| {
            if flag.load(Ordering::SeqCst) {
                Err(DashboardError::SourceNotFound {
                    path: p.price.clone(),
                })
            } else {
                Ok(fake_loaded(p))
            }
        });

        let err = store.get_or_load().unwrap_err();
        assert!(matches!(err, DashboardError::SourceNotFound { .. }));
        assert!(!store.is_loaded());
        assert!(store.last_error().unwrap().contains("price.csv"));

        fail.store(false, Ordering::SeqCst);
        assert!(store.get_or_load().is_ok());
        assert_eq!(store.load_count(), 2);
        assert!(store.last_error().is_none());
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let store = DatasetStore::with_loader(paths(), |p| Ok(fake_loaded(p)));
        store.get_or_load().unwrap();
        store.invalidate();
        assert!(!store.is_loaded());

        store.get_or_load().unwrap();
        assert_eq!(store.load_count(), 2);
    }

    #[test]
    fn test_default_loader_reports_missing_files() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let store = DatasetStore::new(SourcePaths::in_dir(dir.path(), "c.csv", "p.csv"));

        let err = store.get_or_load().unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(store.paths().consumption, PathBuf::from(dir.path().join("c.csv")));
    }
}
