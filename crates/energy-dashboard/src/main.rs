mod bootstrap;

use std::sync::Arc;

use anyhow::{Context, Result};
use dashboard_core::error::DashboardError;
use dashboard_core::settings::{LastUsedParams, Settings, ViewKind};
use dashboard_data::pipeline::LoadedDataset;
use dashboard_runtime::dashboard::{build_view, DashboardRequest};
use dashboard_runtime::store::DatasetStore;
use dashboard_ui::app::{self, App};
use dashboard_ui::themes::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    let (settings, preference_warnings) = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| (settings.view == ViewKind::Tui).then(bootstrap::default_log_file));
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;
    for warning in &preference_warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!("Energy Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {:?}, Group by: {}, Metric: {}, Theme: {}",
        settings.view,
        settings.group_by.label(),
        settings.metric,
        settings.theme
    );

    let store = Arc::new(DatasetStore::new(settings.source_paths()));
    let loaded = {
        let store = Arc::clone(&store);
        tokio::task::spawn_blocking(move || store.get_or_load())
            .await
            .context("dataset load task failed")?
    };

    match settings.view {
        ViewKind::Report => run_report(&settings, loaded?),
        ViewKind::Tui => run_tui(settings, loaded).await,
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Print the computed view as pretty JSON on stdout.
fn run_report(settings: &Settings, loaded: Arc<LoadedDataset>) -> Result<()> {
    let request = DashboardRequest::from_settings(settings, &loaded.dataset)?;

    let document = match build_view(&loaded.dataset, &request) {
        Ok(view) => serde_json::json!({
            "load": &*loaded,
            "request": request,
            "view": view,
        }),
        Err(e @ DashboardError::EmptySlice { .. }) => {
            tracing::warn!(error = %e, "empty selection");
            serde_json::json!({
                "load": &*loaded,
                "request": request,
                "view": null,
                "message": "No data available for the selected date range.",
            })
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

// ── TUI ───────────────────────────────────────────────────────────────────────

async fn run_tui(
    settings: Settings,
    loaded: dashboard_core::error::Result<Arc<LoadedDataset>>,
) -> Result<()> {
    let theme = Theme::from_name(&settings.theme);

    let prepared = loaded.and_then(|loaded| {
        let request = DashboardRequest::from_settings(&settings, &loaded.dataset)?;
        Ok((loaded, request))
    });
    let (loaded, request) = match prepared {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(error = %e, "cannot start dashboard");
            let message = e.to_string();
            tokio::task::spawn_blocking(move || app::run_error_screen(&theme, &message))
                .await
                .context("error screen task failed")??;
            return Err(e.into());
        }
    };

    let dashboard = App::new(theme, loaded, request);
    let handle = tokio::task::spawn_blocking(move || dashboard.run());

    // The loop exits on 'q' / Ctrl+C inside the TUI. The OS-level handler
    // covers signals delivered outside raw mode.
    tokio::select! {
        result = handle => {
            let final_request = result.context("TUI task failed")??;
            if !settings.clear {
                persist_selections(&settings, &final_request);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
            app::restore_terminal()?;
            std::process::exit(130);
        }
    }

    Ok(())
}

/// Save the selections the user ended the session with.
fn persist_selections(settings: &Settings, request: &DashboardRequest) {
    let params = LastUsedParams {
        group_by: Some(request.granularity),
        chart_type: Some(request.chart_type),
        metric: Some(request.metric),
        show_trends: Some(request.show_trends),
        ..LastUsedParams::from(settings)
    };
    match params.save() {
        Ok(()) => tracing::debug!("preferences saved"),
        Err(e) => tracing::warn!("Failed to persist preferences: {}", e),
    }
}
