use dashboard_core::models::Metric;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Classify the terminal background from `COLORFGBG` (`"fg;bg"` or
/// `"fg;default;bg"`): colour indices 0–6 are dark, higher ones light.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .map(|val| background_from_colorfgbg(&val))
        .unwrap_or(BackgroundType::Unknown)
}

fn background_from_colorfgbg(val: &str) -> BackgroundType {
    match val.split(';').next_back().map(str::parse::<u8>) {
        Some(Ok(bg)) if bg <= 6 => BackgroundType::Dark,
        Some(Ok(_)) => BackgroundType::Light,
        _ => BackgroundType::Unknown,
    }
}

/// Every style used by the dashboard views.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Tabs ─────────────────────────────────────────────────────────────────
    pub tab_active: Style,
    pub tab_inactive: Style,

    // ── Metrics ──────────────────────────────────────────────────────────────
    pub metric_consumption: Style,
    pub metric_price: Style,
    pub metric_temperature: Style,
    pub metric_bill: Style,
    /// Fitted trend line drawn over a series.
    pub trend: Style,
    /// Negative bill or price figures.
    pub credit: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,

    // ── Correlation heatmap ──────────────────────────────────────────────────
    pub corr_strong_positive: Style,
    pub corr_weak_positive: Style,
    pub corr_neutral: Style,
    pub corr_weak_negative: Style,
    pub corr_strong_negative: Style,
    pub corr_undefined: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Amber-on-black palette for dark terminals (default).
    pub fn dark() -> Self {
        let bold = Modifier::BOLD;
        Self {
            header: Style::new().fg(Color::Yellow).add_modifier(bold),
            header_accent: Style::new().fg(Color::LightYellow),
            separator: Style::new().fg(Color::DarkGray),

            text: Style::new().fg(Color::White),
            dim: Style::new().fg(Color::DarkGray),
            bold: Style::new().fg(Color::White).add_modifier(bold),
            label: Style::new().fg(Color::Gray),
            value: Style::new().fg(Color::LightYellow).add_modifier(bold),

            info: Style::new().fg(Color::LightCyan),
            success: Style::new().fg(Color::LightGreen),
            warning: Style::new().fg(Color::Yellow),
            error: Style::new().fg(Color::LightRed).add_modifier(bold),

            tab_active: Style::new().fg(Color::Black).bg(Color::Yellow).add_modifier(bold),
            tab_inactive: Style::new().fg(Color::Gray),

            metric_consumption: Style::new().fg(Color::LightCyan),
            metric_price: Style::new().fg(Color::Yellow),
            metric_temperature: Style::new().fg(Color::LightRed),
            metric_bill: Style::new().fg(Color::LightGreen),
            trend: Style::new().fg(Color::LightMagenta),
            credit: Style::new().fg(Color::LightGreen).add_modifier(bold | Modifier::ITALIC),

            table_header: Style::new().fg(Color::Yellow).add_modifier(bold | Modifier::UNDERLINED),
            table_border: Style::new().fg(Color::DarkGray),
            table_row: Style::new().fg(Color::White),
            table_row_alt: Style::new().fg(Color::Gray),
            table_total: Style::new().fg(Color::LightYellow).add_modifier(bold),

            corr_strong_positive: Style::new().fg(Color::Black).bg(Color::Red),
            corr_weak_positive: Style::new().fg(Color::Black).bg(Color::LightRed),
            corr_neutral: Style::new().fg(Color::White).bg(Color::DarkGray),
            corr_weak_negative: Style::new().fg(Color::Black).bg(Color::LightBlue),
            corr_strong_negative: Style::new().fg(Color::White).bg(Color::Blue),
            corr_undefined: Style::new().fg(Color::DarkGray),
        }
    }

    /// Palette for white or pale terminal backgrounds.
    pub fn light() -> Self {
        let bold = Modifier::BOLD;
        Self {
            header: Style::new().fg(Color::Magenta).add_modifier(bold),
            header_accent: Style::new().fg(Color::Blue),
            separator: Style::new().fg(Color::Gray),

            text: Style::new().fg(Color::Black),
            dim: Style::new().fg(Color::Gray),
            bold: Style::new().fg(Color::Black).add_modifier(bold),
            label: Style::new().fg(Color::DarkGray),
            value: Style::new().fg(Color::Blue).add_modifier(bold),

            info: Style::new().fg(Color::Blue),
            success: Style::new().fg(Color::Green),
            warning: Style::new().fg(Color::Rgb(176, 96, 0)),
            error: Style::new().fg(Color::Red).add_modifier(bold),

            tab_active: Style::new().fg(Color::White).bg(Color::Magenta).add_modifier(bold),
            tab_inactive: Style::new().fg(Color::DarkGray),

            metric_consumption: Style::new().fg(Color::Blue),
            metric_price: Style::new().fg(Color::Magenta),
            metric_temperature: Style::new().fg(Color::Red),
            metric_bill: Style::new().fg(Color::Green),
            trend: Style::new().fg(Color::DarkGray),
            credit: Style::new().fg(Color::Green).add_modifier(bold | Modifier::ITALIC),

            table_header: Style::new().fg(Color::Magenta).add_modifier(bold | Modifier::UNDERLINED),
            table_border: Style::new().fg(Color::Gray),
            table_row: Style::new().fg(Color::Black),
            table_row_alt: Style::new().fg(Color::DarkGray),
            table_total: Style::new().fg(Color::Blue).add_modifier(bold),

            corr_strong_positive: Style::new().fg(Color::White).bg(Color::Red),
            corr_weak_positive: Style::new().fg(Color::Black).bg(Color::LightRed),
            corr_neutral: Style::new().fg(Color::Black).bg(Color::Gray),
            corr_weak_negative: Style::new().fg(Color::Black).bg(Color::LightBlue),
            corr_strong_negative: Style::new().fg(Color::White).bg(Color::Blue),
            corr_undefined: Style::new().fg(Color::Gray),
        }
    }

    /// Eight ANSI colours, no modifiers and no background fills.
    pub fn classic() -> Self {
        let plain = |c: Color| Style::new().fg(c);
        Self {
            header: plain(Color::Yellow),
            header_accent: plain(Color::White),
            separator: plain(Color::White),

            text: plain(Color::White),
            dim: plain(Color::White),
            bold: plain(Color::White),
            label: plain(Color::White),
            value: plain(Color::Yellow),

            info: plain(Color::Cyan),
            success: plain(Color::Green),
            warning: plain(Color::Yellow),
            error: plain(Color::Red),

            tab_active: plain(Color::Yellow),
            tab_inactive: plain(Color::White),

            metric_consumption: plain(Color::Cyan),
            metric_price: plain(Color::Yellow),
            metric_temperature: plain(Color::Red),
            metric_bill: plain(Color::Green),
            trend: plain(Color::Magenta),
            credit: plain(Color::Green),

            table_header: plain(Color::Yellow),
            table_border: plain(Color::White),
            table_row: plain(Color::White),
            table_row_alt: plain(Color::White),
            table_total: plain(Color::Green),

            corr_strong_positive: plain(Color::Red),
            corr_weak_positive: plain(Color::Magenta),
            corr_neutral: plain(Color::White),
            corr_weak_negative: plain(Color::Cyan),
            corr_strong_negative: plain(Color::Blue),
            corr_undefined: plain(Color::White),
        }
    }

    /// Light palette on a detected light background, dark otherwise.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Theme for a `--theme` value; `auto` and unknown names detect.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Series colour for a metric.
    pub fn metric_style(&self, metric: Metric) -> Style {
        match metric {
            Metric::Consumption => self.metric_consumption,
            Metric::Price => self.metric_price,
            Metric::Temperature => self.metric_temperature,
            Metric::Bill => self.metric_bill,
        }
    }

    /// Heatmap cell style for a correlation coefficient.
    ///
    /// | r            | Tier            |
    /// |--------------|-----------------|
    /// | ≥ 0.5        | strong positive |
    /// | ≥ 0.1        | weak positive   |
    /// | > -0.1       | neutral         |
    /// | > -0.5       | weak negative   |
    /// | ≤ -0.5       | strong negative |
    /// | undefined    | undefined       |
    pub fn correlation_style(&self, r: Option<f64>) -> Style {
        match r {
            None => self.corr_undefined,
            Some(r) if r >= 0.5 => self.corr_strong_positive,
            Some(r) if r >= 0.1 => self.corr_weak_positive,
            Some(r) if r > -0.1 => self.corr_neutral,
            Some(r) if r > -0.5 => self.corr_weak_negative,
            Some(_) => self.corr_strong_negative,
        }
    }

    /// `credit` for negative amounts, `value` otherwise.
    pub fn amount_style(&self, amount: f64) -> Style {
        if amount < 0.0 {
            self.credit
        } else {
            self.value
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
