//! Chart rendering for dashboard panels.
//!
//! One renderer per [`ChartKind`]: a ratatui [`BarChart`] for categorical
//! bars, a [`Chart`] line for ordered trends, [`ShareBar`] rows for parts
//! of a whole and a [`Chart`] scatter for clustered points.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use rides_core::formatting::{format_count, format_number};
use rides_data::analysis::{ChartKind, Panel};

use crate::components::share_bar::{fit_label, ShareBar};
use crate::themes::Theme;

/// Height used for the tallest bar; bar heights are scaled against it so
/// fractional means still render.
const BAR_SCALE: f64 = 1000.0;

/// Render `panel` into `area`: a bordered block with the chart and a caption
/// line underneath.
pub fn render_panel(frame: &mut Frame, area: Rect, panel: &Panel, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.separator)
        .title(Span::styled(format!(" {} ", panel.title), theme.header));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [chart_area, caption_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    match panel.kind {
        ChartKind::Bar => render_bars(frame, chart_area, panel, theme),
        ChartKind::Line => render_line(frame, chart_area, panel, theme),
        ChartKind::Share => render_shares(frame, chart_area, panel, theme),
        ChartKind::Scatter => render_scatter(frame, chart_area, panel, theme),
    }

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(panel.caption.clone(), theme.dim))),
        caption_area,
    );
}

/// Scaled bar height for `value` against the panel maximum.
fn bar_height(value: f64, max: f64) -> u64 {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    ((value / max) * BAR_SCALE).round() as u64
}

fn render_bars(frame: &mut Frame, area: Rect, panel: &Panel, theme: &Theme) {
    let n = panel.rows.len().max(1) as u16;
    let gap: u16 = 1;
    let bar_width = (area.width.saturating_sub(gap * n) / n).clamp(1, 16);
    let max = panel.peak().value;

    let bars: Vec<Bar> = panel
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = theme.bar_style(i == panel.peak_index);
            Bar::default()
                .value(bar_height(row.value, max))
                .text_value(format_count(row.value))
                .label(Line::from(fit_label(&row.label, bar_width as usize).trim_end().to_string()))
                .style(style)
                .value_style(style.reversed())
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(gap)
        .label_style(theme.label);
    frame.render_widget(chart, area);
}

fn render_line(frame: &mut Frame, area: Rect, panel: &Panel, theme: &Theme) {
    let points: Vec<(f64, f64)> = panel
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| (i as f64, row.value))
        .collect();
    let peak = panel.peak();
    let peak_point = [(panel.peak_index as f64, peak.value)];

    let y_min = panel.rows.iter().map(|r| r.value).fold(0.0_f64, f64::min);
    let y_max = if peak.value > y_min { peak.value * 1.1 } else { y_min + 1.0 };
    let x_max = (panel.rows.len().saturating_sub(1)).max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name(panel.y_label.clone())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.line)
            .data(&points),
        Dataset::default()
            .name(format!("peak: {} ({})", peak.label, format_count(peak.value)))
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(theme.peak)
            .data(&peak_point),
    ];

    let x_labels: Vec<Line> = panel
        .rows
        .iter()
        .map(|r| Line::from(r.label.clone()))
        .collect();
    let y_labels: Vec<Line> = [y_min, (y_min + y_max) / 2.0, y_max]
        .into_iter()
        .map(|v| Line::from(format_count(v.round())))
        .collect();

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(panel.x_label.clone())
                .style(theme.axis)
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(panel.y_label.clone())
                .style(theme.axis)
                .bounds([y_min, y_max])
                .labels(y_labels),
        );
    frame.render_widget(chart, area);
}

fn render_shares(frame: &mut Frame, area: Rect, panel: &Panel, theme: &Theme) {
    let whole = panel.total();
    // label (12) + percentage and value (~20)
    let width = (area.width as usize).saturating_sub(32).max(1);

    let mut lines = vec![Line::from("")];
    for (i, row) in panel.rows.iter().enumerate() {
        let bar = ShareBar::new(&row.label, row.value, whole, theme.share_style(i), theme)
            .with_width(width);
        lines.push(bar.to_line());
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

/// `[min, max]` of `values`, widened to a unit span when degenerate.
fn axis_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if hi > lo {
        [lo, hi]
    } else {
        [lo, lo + 1.0]
    }
}

fn render_scatter(frame: &mut Frame, area: Rect, panel: &Panel, theme: &Theme) {
    let all_points = || panel.series.iter().flat_map(|s| s.points.iter());
    let x_bounds = axis_bounds(all_points().map(|(x, _)| *x));
    let [_, y_top] = axis_bounds(all_points().map(|(_, y)| *y));
    let y_bounds = [0.0, y_top.max(1.0) * 1.05];

    let datasets: Vec<Dataset> = panel
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| {
            Dataset::default()
                .name(series.label.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Scatter)
                .style(theme.share_style(i))
                .data(&series.points)
        })
        .collect();

    let x_labels: Vec<Line> = [x_bounds[0], (x_bounds[0] + x_bounds[1]) / 2.0, x_bounds[1]]
        .into_iter()
        .map(|v| Line::from(format_number(v, 2)))
        .collect();
    let y_labels: Vec<Line> = [y_bounds[0], y_bounds[1] / 2.0, y_bounds[1]]
        .into_iter()
        .map(|v| Line::from(format_count(v.round())))
        .collect();

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(panel.x_label.clone())
                .style(theme.axis)
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(panel.y_label.clone())
                .style(theme.axis)
                .bounds(y_bounds)
                .labels(y_labels),
        )
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));
    frame.render_widget(chart, area);
}

/// Render the placeholder shown when no record matched the filters.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No records match the current filters", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Relax --season / --weather / --holiday / --time-of-day and try again.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Bike Sharing Dashboard "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
