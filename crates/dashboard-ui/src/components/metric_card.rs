use crate::themes::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Pad `s` with trailing spaces to `width` display columns.
///
/// Emoji and other wide glyphs count as two columns. Strings already at or
/// beyond `width` get a single trailing space.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    let padding = if w < width { width - w } else { 1 };
    format!("{}{}", s, " ".repeat(padding))
}

// ── MetricCard ────────────────────────────────────────────────────────────────

/// A bordered card with an icon title, a headline figure and detail lines.
///
/// ```text
/// ┌──────────────────────────┐
/// │⚡ Total Consumption       │
/// │1,234.5 kWh               │
/// │Daily avg: 41.2 kWh       │
/// └──────────────────────────┘
/// ```
pub struct MetricCard<'a> {
    pub icon: &'a str,
    pub title: &'a str,
    pub value: String,
    pub value_style: Style,
    pub details: Vec<Line<'a>>,
    pub theme: &'a Theme,
}

impl<'a> MetricCard<'a> {
    pub fn new(icon: &'a str, title: &'a str, value: String, theme: &'a Theme) -> Self {
        Self {
            icon,
            title,
            value,
            value_style: theme.value,
            details: Vec::new(),
            theme,
        }
    }

    pub fn value_style(mut self, style: Style) -> Self {
        self.value_style = style;
        self
    }

    /// Append a `label: value` detail line.
    pub fn detail(mut self, label: &'a str, value: String, style: Style) -> Self {
        self.details.push(Line::from(vec![
            Span::styled(label, self.theme.label),
            Span::styled(": ", self.theme.label),
            Span::styled(value, style),
        ]));
        self
    }

    /// Append a free-form dimmed note.
    pub fn note(mut self, text: impl Into<String>) -> Self {
        self.details
            .push(Line::from(Span::styled(text.into(), self.theme.dim)));
        self
    }

    /// Title line, headline value, then the detail lines.
    pub fn to_lines(&self, width: usize) -> Vec<Line<'a>> {
        let title = format!("{} {}", self.icon, self.title);
        let mut lines = vec![
            Line::from(Span::styled(pad_to_width(&title, width), self.theme.bold)),
            Line::from(Span::styled(self.value.clone(), self.value_style)),
        ];
        lines.extend(self.details.iter().cloned());
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(2) as usize;
        let paragraph = Paragraph::new(Text::from(self.to_lines(inner_width))).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.table_border),
        );
        frame.render_widget(paragraph, area);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
