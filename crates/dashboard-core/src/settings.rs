use chrono::NaiveDate;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{ChartType, EmptyBuckets, Granularity, MetricSelection};
use crate::time_utils::parse_date_arg;

/// File name of the hourly consumption export inside the data directory.
pub const DEFAULT_CONSUMPTION_FILE: &str = "Electricity_consumption_2015-2025.csv";

/// File name of the hourly price/temperature export inside the data directory.
pub const DEFAULT_PRICE_FILE: &str = "Electricity_price_2015-2025.csv";

/// Directory under `$HOME` holding persisted preferences and logs.
pub const APP_DIR_NAME: &str = ".energy-dashboard";

// ── ViewKind ───────────────────────────────────────────────────────────────────

/// How the dashboard is presented.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Interactive terminal dashboard.
    #[default]
    Tui,
    /// Print the computed view as JSON and exit.
    Report,
}

// ── SourcePaths ────────────────────────────────────────────────────────────────

/// Locations of the two source CSV files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub consumption: PathBuf,
    pub price: PathBuf,
}

impl SourcePaths {
    pub fn new(consumption: impl Into<PathBuf>, price: impl Into<PathBuf>) -> Self {
        Self {
            consumption: consumption.into(),
            price: price.into(),
        }
    }

    /// Both files resolved inside `dir`.
    pub fn in_dir(dir: &Path, consumption_file: &str, price_file: &str) -> Self {
        Self::new(dir.join(consumption_file), dir.join(price_file))
    }
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Electricity consumption, price and temperature analytics dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "energy-dashboard",
    about = "Electricity consumption, price and temperature analytics dashboard",
    version
)]
pub struct Settings {
    /// Directory holding the source CSV files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Consumption CSV file name (comma-delimited, columns `time`, `kWh`)
    #[arg(long, default_value = DEFAULT_CONSUMPTION_FILE)]
    pub consumption_file: String,

    /// Price CSV file name (semicolon-delimited, columns `timestamp`, `Price`, `Temperature`)
    #[arg(long, default_value = DEFAULT_PRICE_FILE)]
    pub price_file: String,

    /// First day of the analysis window (YYYY-MM-DD); defaults to the last whole month
    #[arg(long, value_parser = parse_date_arg)]
    pub start: Option<NaiveDate>,

    /// Last day of the analysis window (YYYY-MM-DD), inclusive
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,

    /// Grouping interval for the trend chart
    #[arg(long, value_enum, default_value_t = Granularity::Daily)]
    pub group_by: Granularity,

    /// Chart type
    #[arg(long, value_enum, default_value_t = ChartType::Line)]
    pub chart_type: ChartType,

    /// Metric to display: consumption, bill, price, temperature or all
    #[arg(long, default_value = "consumption")]
    pub metric: MetricSelection,

    /// Show trend lines, overriding a saved `--no-trends`
    #[arg(long, overrides_with = "no_trends")]
    pub trends: bool,

    /// Hide trend lines
    #[arg(long, overrides_with = "trends")]
    pub no_trends: bool,

    /// Emit empty calendar buckets (zero sums, undefined means) instead of omitting them
    #[arg(long)]
    pub fill_empty_buckets: bool,

    /// Presentation mode
    #[arg(long, value_enum, default_value_t = ViewKind::Tui)]
    pub view: ViewKind,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved preferences
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted display preferences saved to `~/.energy-dashboard/last_used.json`.
///
/// The date window is deliberately absent: it depends on the data on disk.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Granularity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_trends: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewKind>,
}

impl LastUsedParams {
    /// `~/.energy-dashboard/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn config_path_in(home: &Path) -> PathBuf {
        home.join(APP_DIR_NAME).join("last_used.json")
    }

    /// Saved preferences at `path`; empty when the file is missing.
    pub fn load_from(path: &Path) -> serde_json::Result<Self> {
        match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn save(&self) -> io::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Write through a sibling `.json.tmp` file and rename it into place.
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let staged = path.with_extension("json.tmp");
        std::fs::write(&staged, serde_json::to_vec_pretty(self)?)?;
        std::fs::rename(&staged, path)
    }

    /// Remove the file at `path`; a missing file is not an error.
    pub fn clear_at(path: &Path) -> io::Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and fill every preference not given on
    /// the command line from `~/.energy-dashboard/last_used.json`.
    ///
    /// Logging is not set up yet at this point, so problems with the
    /// preference file are returned as messages for the caller to log.
    pub fn load_with_last_used() -> (Self, Vec<String>) {
        Self::load_with_last_used_from(std::env::args_os(), &LastUsedParams::config_path())
    }

    /// [`Settings::load_with_last_used`] over explicit arguments and
    /// preference file.
    pub fn load_with_last_used_from<I, T>(args: I, config_path: &Path) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Settings::command().get_matches_from(args);
        let mut settings = match Settings::from_arg_matches(&matches) {
            Ok(settings) => settings,
            Err(e) => e.exit(),
        };
        let mut warnings = Vec::new();

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                warnings.push(format!("failed to clear preferences: {e}"));
            }
            return (settings.apply_debug_flag(), warnings);
        }

        let saved = LastUsedParams::load_from(config_path).unwrap_or_else(|e| {
            warnings.push(format!(
                "ignoring unreadable preferences at {}: {e}",
                config_path.display()
            ));
            LastUsedParams::default()
        });

        let trends_typed = typed_on_command_line(&matches, "trends")
            || typed_on_command_line(&matches, "no_trends");
        if let (false, Some(show)) = (trends_typed, saved.show_trends) {
            settings.no_trends = !show;
        }

        fill_unset(&matches, "group_by", saved.group_by, &mut settings.group_by);
        fill_unset(&matches, "chart_type", saved.chart_type, &mut settings.chart_type);
        fill_unset(&matches, "metric", saved.metric, &mut settings.metric);
        fill_unset(&matches, "theme", saved.theme, &mut settings.theme);
        fill_unset(&matches, "view", saved.view, &mut settings.view);

        let settings = settings.apply_debug_flag();
        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            warnings.push(format!("failed to persist preferences: {e}"));
        }
        (settings, warnings)
    }

    /// Paths of the two source files.
    pub fn source_paths(&self) -> SourcePaths {
        SourcePaths::in_dir(&self.data_dir, &self.consumption_file, &self.price_file)
    }

    pub fn show_trends(&self) -> bool {
        !self.no_trends
    }

    pub fn empty_buckets(&self) -> EmptyBuckets {
        if self.fill_empty_buckets {
            EmptyBuckets::Fill
        } else {
            EmptyBuckets::Omit
        }
    }

    /// `--debug` overrides the log level.
    fn apply_debug_flag(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            group_by: Some(s.group_by),
            chart_type: Some(s.chart_type),
            metric: Some(s.metric),
            show_trends: Some(s.show_trends()),
            theme: Some(s.theme.clone()),
            view: Some(s.view),
        }
    }
}

/// Overwrite `slot` with the saved value unless `--<id>` was typed on the
/// command line. Defaults and environment values yield to saved ones.
fn fill_unset<T>(matches: &ArgMatches, id: &str, saved: Option<T>, slot: &mut T) {
    if let (false, Some(value)) = (typed_on_command_line(matches, id), saved) {
        *slot = value;
    }
}

fn typed_on_command_line(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
