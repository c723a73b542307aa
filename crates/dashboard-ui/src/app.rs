//! Main application state and TUI event loop for the energy dashboard.
//!
//! [`App`] owns the theme, the shared dataset, the current
//! [`DashboardRequest`] and the view computed for it. Every key press that
//! changes a selection rebuilds the view synchronously.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::formatting::format_number;
use dashboard_core::models::DateWindow;
use dashboard_runtime::dashboard::{build_view, DashboardRequest, DashboardView};
use dashboard_runtime::data::filter;
use dashboard_runtime::data::pipeline::LoadedDataset;

use crate::chart_view;
use crate::components::header::Header;
use crate::heatmap_view;
use crate::metrics_view;
use crate::table_view;
use crate::themes::Theme;

const TICK_RATE: Duration = Duration::from_millis(250);
const PAGE: usize = 20;

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Which part of the dashboard the body shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Trends,
    Correlation,
    Data,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Trends, Tab::Correlation, Tab::Data];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Trends => "Trends",
            Tab::Correlation => "Correlation",
            Tab::Data => "Data",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    loaded: Arc<LoadedDataset>,
    pub request: DashboardRequest,
    /// Window restored by `r`.
    default_window: DateWindow,
    pub tab: Tab,
    /// First visible row of the Data tab.
    pub scroll: usize,
    /// Height of the body area at the last draw, for scroll clamping.
    body_height: u16,
    view: Result<DashboardView>,
    pub should_quit: bool,
}

impl App {
    pub fn new(theme: Theme, loaded: Arc<LoadedDataset>, request: DashboardRequest) -> Self {
        let default_window =
            filter::default_window(&loaded.dataset).unwrap_or(request.window);
        let view = build_view(&loaded.dataset, &request);
        Self {
            theme,
            loaded,
            request,
            default_window,
            tab: Tab::Overview,
            scroll: 0,
            body_height: 0,
            view,
            should_quit: false,
        }
    }

    /// The view for the current request, or the error that prevented it.
    pub fn view(&self) -> &Result<DashboardView> {
        &self.view
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Apply one key press to the state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('g') => {
                self.request.granularity = self.request.granularity.next();
                self.rebuild();
            }
            KeyCode::Char('c') => self.request.chart_type = self.request.chart_type.next(),
            KeyCode::Char('m') => {
                self.request.metric = self.request.metric.next();
                self.rebuild();
            }
            KeyCode::Char('t') => self.request.show_trends = !self.request.show_trends,
            KeyCode::Char('[') => self.set_window(self.request.window.shift_months(-1)),
            KeyCode::Char(']') => self.set_window(self.request.window.shift_months(1)),
            KeyCode::Char('r') => self.set_window(self.default_window),
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::BackTab => self.tab = self.tab.previous(),
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll_to(self.scroll + 1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(PAGE),
            KeyCode::PageDown => self.scroll_to(self.scroll + PAGE),
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
    }

    fn set_window(&mut self, window: DateWindow) {
        self.request.window = window;
        self.scroll = 0;
        self.rebuild();
    }

    fn scroll_to(&mut self, target: usize) {
        let rows = match &self.view {
            Ok(view) => view.row_count,
            Err(_) => 0,
        };
        self.scroll = target.min(table_view::max_scroll(rows, self.body_height));
    }

    fn rebuild(&mut self) {
        self.view = build_view(&self.loaded.dataset, &self.request);
        if let Err(e) = &self.view {
            tracing::debug!(error = %e, window = %self.request.window, "no view for request");
        }
    }

    // ── Event loops ───────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Q` or `Ctrl+C`.
    ///
    /// Returns the final selections so the caller can persist them.
    pub fn run(mut self) -> io::Result<DashboardRequest> {
        with_terminal(|terminal| {
            while !self.should_quit {
                terminal.draw(|frame| self.render(frame))?;

                if event::poll(TICK_RATE)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Press {
                            self.handle_key(key);
                        }
                    }
                }
            }
            Ok(self.request)
        })
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current state into `frame`.
    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let header = Header::new(&self.request, &self.theme).to_lines();
        frame.render_widget(Paragraph::new(Text::from(header)), chunks[0]);

        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active)
            .divider(" | ");
        frame.render_widget(tabs, chunks[1]);

        self.body_height = chunks[2].height;
        self.render_body(frame, chunks[2]);

        frame.render_widget(Paragraph::new(self.footer_line()), chunks[3]);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        match &self.view {
            Err(DashboardError::EmptySlice { .. }) => {
                table_view::render_no_data(frame, area, &self.theme);
            }
            Err(e) => table_view::render_error(frame, area, &e.to_string(), &self.theme),
            Ok(view) => match self.tab {
                Tab::Overview => metrics_view::render_overview(frame, area, view, &self.theme),
                Tab::Trends => {
                    chart_view::render_trends(frame, area, view, &self.request, &self.theme)
                }
                Tab::Correlation => {
                    heatmap_view::render_heatmap(frame, area, &view.correlation, &self.theme)
                }
                Tab::Data => table_view::render_table_view(
                    frame,
                    area,
                    view.rows.rows(),
                    self.scroll,
                    &view.summary,
                    &self.theme,
                ),
            },
        }
    }

    /// Key hints plus the load report.
    pub fn footer_line(&self) -> Line<'_> {
        let report = &self.loaded.report;
        Line::from(vec![
            Span::styled(
                "g group  c chart  m metric  t trend  [ ] month  r reset  Tab view  q quit",
                self.theme.dim,
            ),
            Span::styled("  │  ", self.theme.separator),
            Span::styled(
                format!(
                    "{} joined, {} dropped",
                    format_number(report.joined_rows as f64, 0),
                    format_number(report.dropped_rows() as f64, 0)
                ),
                if report.dropped_rows() > 0 {
                    self.theme.warning
                } else {
                    self.theme.info
                },
            ),
        ])
    }
}

// ── Error screen ──────────────────────────────────────────────────────────────

/// Show `message` full-screen until the user quits.
pub fn run_error_screen(theme: &Theme, message: &str) -> io::Result<()> {
    with_terminal(|terminal| loop {
        terminal.draw(|frame| {
            let area = frame.area();
            table_view::render_error(frame, area, message, theme);
        })?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(());
                    }
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                    _ => {}
                }
            }
        }
    })
}

/// Leave raw mode and the alternate screen from outside the event loop.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)
}

/// Enter the alternate screen, run `f`, and restore the terminal whatever
/// `f` returned.
fn with_terminal<T, F>(f: F) -> io::Result<T>
where
    F: FnOnce(&mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<T>,
{
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = f(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::{
        ChartType, Dataset, Granularity, Metric, MetricSelection, TimeSeriesRow,
    };
    use dashboard_runtime::data::joiner::JoinReport;
    use dashboard_runtime::data::pipeline::LoadMetadata;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Rows at 00:00 and 12:00 for every day of Jan 1 – Mar 15 2025.
    fn loaded() -> Arc<LoadedDataset> {
        let mut rows = Vec::new();
        let mut d = date(2025, 1, 1);
        let mut i = 0.0;
        while d <= date(2025, 3, 15) {
            for h in [0, 12] {
                i += 1.0;
                rows.push(TimeSeriesRow::new(
                    d.and_hms_opt(h, 0, 0).unwrap(),
                    1.0 + (i % 5.0),
                    4.0 + (i % 9.0),
                    -6.0 + (i % 13.0),
                ));
            }
            d = d.succ_opt().unwrap();
        }
        let dataset = Dataset::from_rows(rows);
        Arc::new(LoadedDataset {
            report: JoinReport {
                joined_rows: dataset.len(),
                unmatched_price: 3,
                ..JoinReport::default()
            },
            dataset,
            metadata: LoadMetadata {
                generated_at: String::new(),
                load_time_seconds: 0.0,
                join_time_seconds: 0.0,
                consumption_path: PathBuf::from("c.csv"),
                price_path: PathBuf::from("p.csv"),
            },
        })
    }

    fn app() -> App {
        let loaded = loaded();
        let request = DashboardRequest::default_for(&loaded.dataset).unwrap();
        App::new(Theme::dark(), loaded, request)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn draw(app: &mut App, width: u16, height: u16) {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_starts_on_default_window() {
        let app = app();
        assert_eq!(app.request.window.start(), date(2025, 2, 1));
        assert_eq!(app.request.window.end(), date(2025, 2, 28));
        assert!(app.view().is_ok());
    }

    #[test]
    fn test_quit_keys() {
        let mut a = app();
        press(&mut a, KeyCode::Char('q'));
        assert!(a.should_quit);

        let mut b = app();
        b.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(b.should_quit);
        // Plain `c` cycles the chart type instead.
        let mut c = app();
        press(&mut c, KeyCode::Char('c'));
        assert!(!c.should_quit);
        assert_eq!(c.request.chart_type, ChartType::Area);
    }

    #[test]
    fn test_granularity_key_rebuilds_view() {
        let mut app = app();
        assert_eq!(app.view().as_ref().unwrap().buckets.len(), 28);

        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.request.granularity, Granularity::Weekly);
        // Feb 2025 spans ISO weeks starting Jan 27, Feb 3, 10, 17 and 24.
        assert_eq!(app.view().as_ref().unwrap().buckets.len(), 5);
    }

    #[test]
    fn test_metric_key_cycles_selection() {
        let mut app = app();
        for _ in 0..4 {
            press(&mut app, KeyCode::Char('m'));
        }
        assert_eq!(app.request.metric, MetricSelection::All);
        let view = app.view().as_ref().unwrap();
        assert!(Metric::ALL
            .iter()
            .all(|m| view.chart_points.iter().any(|p| p.metric == *m)));
    }

    #[test]
    fn test_trend_toggle() {
        let mut app = app();
        assert!(app.request.show_trends);
        press(&mut app, KeyCode::Char('t'));
        assert!(!app.request.show_trends);
    }

    #[test]
    fn test_window_shift_and_reset() {
        let mut app = app();
        press(&mut app, KeyCode::Char('['));
        assert_eq!(app.request.window.start(), date(2025, 1, 1));
        assert_eq!(app.request.window.end(), date(2025, 1, 31));
        assert!(app.view().is_ok());

        // December 2024 precedes the data: the slice is empty, not fatal.
        press(&mut app, KeyCode::Char('['));
        assert!(matches!(app.view(), Err(DashboardError::EmptySlice { .. })));

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.request.window.start(), date(2025, 2, 1));
        assert!(app.view().is_ok());
    }

    #[test]
    fn test_tab_cycles() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, Tab::Trends);
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.tab, Tab::Data);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, Tab::Overview);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut app = app();
        press(&mut app, KeyCode::Up);
        assert_eq!(app.scroll, 0);

        for _ in 0..1000 {
            press(&mut app, KeyCode::Down);
        }
        // 56 rows with no draw yet: clamp at the last row.
        assert_eq!(app.scroll, 55);

        press(&mut app, KeyCode::Home);
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_footer_reports_dropped_rows() {
        let app = app();
        let text: String = app
            .footer_line()
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.ends_with("148 joined, 3 dropped"), "got: {text}");
    }

    // ── Render (does not panic) ───────────────────────────────────────────────

    #[test]
    fn test_render_every_tab_does_not_panic() {
        let mut app = app();
        for _ in Tab::ALL {
            draw(&mut app, 120, 40);
            press(&mut app, KeyCode::Tab);
        }
    }

    #[test]
    fn test_render_records_body_height() {
        let mut app = app();
        draw(&mut app, 120, 40);
        // 40 rows minus header, tabs and footer.
        assert_eq!(app.body_height, 34);
    }

    #[test]
    fn test_render_empty_slice_does_not_panic() {
        let mut app = app();
        press(&mut app, KeyCode::Char('['));
        press(&mut app, KeyCode::Char('['));
        draw(&mut app, 80, 24);
    }

    #[test]
    fn test_render_faceted_trends_does_not_panic() {
        let mut app = app();
        app.request.metric = MetricSelection::All;
        app.rebuild();
        app.tab = Tab::Trends;
        draw(&mut app, 100, 50);
    }
}
