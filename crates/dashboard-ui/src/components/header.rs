use crate::themes::Theme;
use dashboard_runtime::dashboard::DashboardRequest;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the application title.
pub const BOLTS: &str = "⚡";

pub const TITLE: &str = " ENERGY CONSUMPTION DASHBOARD ";

/// Dashboard header rendering four lines:
///
/// 1. Application title (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. The active selections in `[ window | granularity | metric | chart ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    pub request: &'a DashboardRequest,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(request: &'a DashboardRequest, theme: &'a Theme) -> Self {
        Self { request, theme }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let req = self.request;
        let chart = if req.show_trends {
            format!("{} + trend", req.chart_type.label().to_lowercase())
        } else {
            req.chart_type.label().to_lowercase()
        };

        vec![
            Line::from(vec![
                Span::styled(BOLTS, self.theme.header_accent),
                Span::styled(TITLE, self.theme.header),
                Span::styled(BOLTS, self.theme.header_accent),
            ]),
            Line::from(Span::styled("=".repeat(60), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(req.window.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(req.granularity.label().to_lowercase(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(String::from(req.metric), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(chart, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::{DateWindow, Granularity, MetricSelection};

    fn request() -> DashboardRequest {
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
        )
        .unwrap();
        DashboardRequest::with_window(window)
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let req = request();
        assert_eq!(Header::new(&req, &theme).to_lines().len(), 4);
    }

    #[test]
    fn test_header_title_line_content() {
        let theme = Theme::dark();
        let req = request();
        let lines = Header::new(&req, &theme).to_lines();
        let title = text(&lines[0]);
        assert!(title.contains("ENERGY CONSUMPTION DASHBOARD"), "got: {title}");
        assert!(title.starts_with(BOLTS));
    }

    #[test]
    fn test_header_separator_line() {
        let theme = Theme::dark();
        let req = request();
        let lines = Header::new(&req, &theme).to_lines();
        let sep = text(&lines[1]);
        assert_eq!(sep.chars().count(), 60);
        assert!(sep.chars().all(|c| c == '='));
    }

    #[test]
    fn test_header_info_line_reflects_request() {
        let theme = Theme::dark();
        let mut req = request();
        req.granularity = Granularity::Weekly;
        req.metric = MetricSelection::All;
        req.show_trends = false;
        let lines = Header::new(&req, &theme).to_lines();
        let info = text(&lines[2]);

        assert_eq!(
            info,
            "[ 2025-02-01 to 2025-02-28 | weekly | all | line chart ]"
        );
    }

    #[test]
    fn test_header_info_line_marks_trend() {
        let theme = Theme::dark();
        let req = request();
        let lines = Header::new(&req, &theme).to_lines();
        assert!(text(&lines[2]).contains("line chart + trend"));
    }

    #[test]
    fn test_header_empty_fourth_line() {
        let theme = Theme::dark();
        let req = request();
        let lines = Header::new(&req, &theme).to_lines();
        assert!(text(&lines[3]).is_empty());
    }
}
