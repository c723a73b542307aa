//! Raw hourly data table for the Data tab, plus the placeholder panels shown
//! when there is nothing to draw.
//!
//! Renders a bordered [`ratatui::widgets::Table`] of the rows inside the
//! selected window with a highlighted totals row at the bottom.

use std::ops::Range;

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use dashboard_core::formatting;
use dashboard_core::models::{MetricsSummary, TimeSeriesRow};

use crate::themes::Theme;

/// Borders, header and totals rows.
const CHROME_ROWS: u16 = 4;

/// Rows of `len` visible in a table `height` rows tall after scrolling by
/// `scroll`. The scroll offset is clamped so the last page stays full.
pub fn visible_range(len: usize, scroll: usize, height: u16) -> Range<usize> {
    let page = height.saturating_sub(CHROME_ROWS) as usize;
    if page == 0 || len == 0 {
        return 0..0;
    }
    let start = scroll.min(len.saturating_sub(page));
    start..(start + page).min(len)
}

/// Largest useful scroll offset for `len` rows.
pub fn max_scroll(len: usize, height: u16) -> usize {
    let page = height.saturating_sub(CHROME_ROWS) as usize;
    len.saturating_sub(page.max(1))
}

/// Render the hourly rows of the window into `area`.
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    rows: &[TimeSeriesRow],
    scroll: usize,
    summary: &MetricsSummary,
    theme: &Theme,
) {
    let header_cells = [
        "Timestamp",
        "Consumption (kWh)",
        "Price (c/kWh)",
        "Temperature (°C)",
        "Bill (€)",
    ]
    .iter()
    .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let range = visible_range(rows.len(), scroll, area.height);
    let first = range.start;
    let data_rows: Vec<Row> = rows[range]
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if (first + i) % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(row.timestamp.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(format!("{:.3}", row.consumption_kwh)),
                Cell::from(format!("{:.2}", row.price_cents_per_kwh)),
                Cell::from(format!("{:.1}", row.temperature_c)),
                Cell::from(format!("{:.4}", row.bill_eur)).style(theme.amount_style(row.bill_eur)),
            ])
            .style(style)
        })
        .collect();

    let total_row = Row::new(vec![
        Cell::from("TOTAL").style(theme.table_total),
        Cell::from(formatting::format_number(summary.total_consumption, 1)),
        Cell::from(format!("avg {:.2}", summary.avg_price)),
        Cell::from(format!("avg {:.1}", summary.avg_temperature)),
        Cell::from(formatting::format_currency(summary.total_bill)),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(18),
        Constraint::Length(18),
        Constraint::Length(15),
        Constraint::Length(18),
        Constraint::Length(12),
    ];

    let title = format!(
        " Raw Data ({} rows{}) ",
        formatting::format_number(rows.len() as f64, 0),
        if rows.is_empty() {
            String::new()
        } else {
            format!(", ↑/↓ scroll {}", first + 1)
        }
    );

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Placeholder for a window with no rows.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No data available for the selected date range.",
            theme.warning,
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Use [ and ] to move the window or r to reset it.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Energy Dashboard "),
        ),
        area,
    );
}

/// Full-screen error panel for a failed load.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Error loading data", theme.error)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.text)),
        Line::from(""),
        Line::from(Span::styled(
            "Check --data-dir, --consumption-file and --price-file.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.error)
                    .title(" Energy Dashboard "),
            ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
