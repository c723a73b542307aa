//! Correlation tab: the 4×4 Pearson matrix drawn as a coloured grid.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use dashboard_core::models::{CorrelationMatrix, Metric};

use crate::themes::Theme;

/// `"+0.53"` style coefficient, `"N/A"` when undefined.
pub fn cell_text(r: Option<f64>) -> String {
    match r {
        Some(r) => format!("{:+.2}", r),
        None => "N/A".to_string(),
    }
}

/// Off-diagonal pair with the largest absolute coefficient.
pub fn strongest_pair(matrix: &CorrelationMatrix) -> Option<(Metric, Metric, f64)> {
    let metrics = matrix.metrics();
    let mut best: Option<(Metric, Metric, f64)> = None;
    for (i, &a) in metrics.iter().enumerate() {
        for &b in &metrics[i + 1..] {
            if let Some(r) = matrix.get(a, b) {
                if best.map_or(true, |(_, _, cur)| r.abs() > cur.abs()) {
                    best = Some((a, b, r));
                }
            }
        }
    }
    best
}

fn summary_lines<'a>(matrix: &CorrelationMatrix, theme: &'a Theme) -> Vec<Line<'a>> {
    let strongest = match strongest_pair(matrix) {
        Some((a, b, r)) => Line::from(vec![
            Span::styled("Strongest relationship: ", theme.label),
            Span::styled(format!("{} ↔ {}", a.key(), b.key()), theme.value),
            Span::styled(format!(" ({})", cell_text(Some(r))), theme.correlation_style(Some(r))),
        ]),
        None => Line::from(Span::styled(
            "Not enough variation to correlate metrics.",
            theme.dim,
        )),
    };

    vec![
        strongest,
        Line::from(""),
        Line::from(vec![
            Span::styled(" +1 ", theme.corr_strong_positive),
            Span::styled(" +0.1 ", theme.corr_weak_positive),
            Span::styled(" 0 ", theme.corr_neutral),
            Span::styled(" -0.1 ", theme.corr_weak_negative),
            Span::styled(" -1 ", theme.corr_strong_negative),
            Span::styled("  N/A = constant column", theme.dim),
        ]),
    ]
}

pub fn render_heatmap(frame: &mut Frame, area: Rect, matrix: &CorrelationMatrix, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(area);

    let metrics = matrix.metrics();
    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(metrics.iter().map(|m| Cell::from(m.key()).style(theme.table_header))),
    );

    let rows: Vec<Row> = metrics
        .iter()
        .map(|&row| {
            let cells = std::iter::once(Cell::from(row.key()).style(theme.table_header)).chain(
                metrics.iter().map(|&col| {
                    let r = matrix.get(row, col);
                    Cell::from(cell_text(r)).style(theme.correlation_style(r))
                }),
            );
            Row::new(cells).height(1)
        })
        .collect();

    let widths = [
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Length(13),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" 📊 Correlation Analysis "),
        );
    frame.render_widget(table, chunks[0]);

    let summary = Paragraph::new(Text::from(summary_lines(matrix, theme)))
        .block(Block::default().borders(Borders::ALL).border_style(theme.table_border));
    frame.render_widget(summary, chunks[1]);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
