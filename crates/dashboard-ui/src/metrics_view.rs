//! Overview tab: headline metric cards, key statistics and quick stats.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use dashboard_core::formatting::{
    format_currency, format_energy, format_number, format_optional, format_price,
    format_temperature,
};
use dashboard_runtime::dashboard::DashboardView;

use crate::components::metric_card::MetricCard;
use crate::themes::Theme;

// ── Cards ─────────────────────────────────────────────────────────────────────

pub fn consumption_card<'a>(view: &DashboardView, theme: &'a Theme) -> MetricCard<'a> {
    let s = &view.summary;
    let card = MetricCard::new(
        "🔋",
        "Energy Consumption",
        format_energy(s.total_consumption, 0),
        theme,
    )
    .detail("Daily avg", format_energy(s.daily_avg_consumption, 1), theme.value);

    if view.highlights.peak_above_daily_avg {
        card.detail("Peak", format!("{:.1} kWh", s.max_consumption), theme.warning)
    } else {
        card
    }
}

pub fn financial_card<'a>(view: &DashboardView, theme: &'a Theme) -> MetricCard<'a> {
    let s = &view.summary;
    let h = &view.highlights;

    let mut bill = format_currency(s.total_bill);
    if h.is_credit {
        bill.push_str(" (Credit)");
    }
    let mut price = format_price(s.avg_price);
    if h.negative_avg_price {
        price.push_str(" (Negative)");
    }
    let volatility = match s.price_volatility {
        Some(v) => format!("±{:.2} std", v),
        None => "±N/A std".to_string(),
    };

    MetricCard::new("💰", "Financial Impact", bill, theme)
        .value_style(theme.amount_style(s.total_bill))
        .detail("Per day", format!("€{:.2}/day", h.bill_per_day), theme.amount_style(h.bill_per_day))
        .detail("Avg price", price, theme.amount_style(s.avg_price))
        .note(volatility)
}

pub fn environmental_card<'a>(view: &DashboardView, theme: &'a Theme) -> MetricCard<'a> {
    let s = &view.summary;
    let h = &view.highlights;
    MetricCard::new("🌡️", "Environmental", format_temperature(s.avg_temperature), theme)
        .detail("Range", format!("{:.1}°C", s.temperature_range), theme.value)
        .detail("Impact", h.temperature_impact.label().to_string(), theme.info)
        .note(h.temperature_variation.label())
}

pub fn efficiency_card<'a>(view: &DashboardView, theme: &'a Theme) -> MetricCard<'a> {
    let h = &view.highlights;
    MetricCard::new(
        "📈",
        "Efficiency",
        format!("{:.1}", view.summary.efficiency_score),
        theme,
    )
    .detail("Data points", format_number(h.data_points as f64, 0), theme.value)
    .note(format!("{:.1} days", h.data_days))
}

// ── Side panels ───────────────────────────────────────────────────────────────

/// Selection summary lines.
pub fn quick_stats_lines<'a>(view: &DashboardView, theme: &'a Theme) -> Vec<Line<'a>> {
    let q = &view.quick_stats;
    vec![
        Line::from(vec![
            Span::styled("Selected period: ", theme.label),
            Span::styled(format!("{} days", q.total_days), theme.value),
        ]),
        Line::from(vec![
            Span::styled("Avg consumption: ", theme.label),
            Span::styled(
                format!("{} kWh/h", format_optional(q.avg_consumption, 2)),
                theme.value,
            ),
        ]),
        Line::from(vec![
            Span::styled("Hourly rows: ", theme.label),
            Span::styled(format_number(view.row_count as f64, 0), theme.value),
        ]),
    ]
}

fn render_key_statistics(frame: &mut Frame, area: Rect, view: &DashboardView, theme: &Theme) {
    let rows: Vec<Row> = view
        .key_statistics
        .labelled()
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![Cell::from(label), Cell::from(value)]).style(style)
        })
        .collect();

    let header = Row::new(
        ["Metric", "Value"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    );

    let table = Table::new(rows, [Constraint::Length(22), Constraint::Min(12)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" 📈 Key Statistics "),
        )
        .style(theme.text);
    frame.render_widget(table, area);
}

// ── Main render ───────────────────────────────────────────────────────────────

pub fn render_overview(frame: &mut Frame, area: Rect, view: &DashboardView, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(rows[0]);

    consumption_card(view, theme).render(frame, cards[0]);
    financial_card(view, theme).render(frame, cards[1]);
    environmental_card(view, theme).render(frame, cards[2]);
    efficiency_card(view, theme).render(frame, cards[3]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    render_key_statistics(frame, bottom[0], view, theme);

    let quick = Paragraph::new(Text::from(quick_stats_lines(view, theme))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.table_border)
            .title(" Quick Stats "),
    );
    frame.render_widget(quick, bottom[1]);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
