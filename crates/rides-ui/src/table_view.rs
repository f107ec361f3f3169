//! Table views for the dashboard TUI.
//!
//! Renders the active panel's rows with a highlighted totals row, and a
//! preview of the selected records.

use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use rides_core::categories::{label_for, Dimension};
use rides_core::formatting::{format_count, format_number, format_share};
use rides_core::models::Observation;
use rides_core::summary::Reducer;
use rides_data::analysis::{ChartKind, Panel};

use crate::themes::Theme;

/// Render `panel.rows` as `Label | Value | Records | Share` plus a totals row.
///
/// Means do not add up, so mean panels leave the share column and the total
/// value blank.
pub fn render_panel_table(frame: &mut Frame, area: Rect, panel: &Panel, theme: &Theme) {
    let header = Row::new(
        ["Label", "Value", "Records", "Share"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let whole = panel.total();
    let additive = panel.reducer == Reducer::Sum;

    let mut rows: Vec<Row> = panel
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == panel.peak_index {
                theme.peak
            } else {
                theme.row_style(i)
            };
            let share = if additive {
                format_share(row.value, whole)
            } else {
                "-".to_string()
            };
            Row::new(vec![
                Cell::from(row.label.clone()),
                Cell::from(format_count(row.value)),
                Cell::from(format_number(row.count as f64, 0)),
                Cell::from(share),
            ])
            .style(style)
        })
        .collect();

    let records: usize = if panel.kind == ChartKind::Share {
        panel.rows.first().map_or(0, |r| r.count)
    } else {
        panel.rows.iter().map(|r| r.count).sum()
    };
    rows.push(
        Row::new(vec![
            Cell::from("TOTAL"),
            Cell::from(if additive { format_count(whole) } else { String::new() }),
            Cell::from(format_number(records as f64, 0)),
            Cell::from(""),
        ])
        .style(theme.value),
    );

    let widths = [
        Constraint::Min(10),
        Constraint::Length(12),
        Constraint::Length(9),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", panel.y_label)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Label for a code, or the raw code when it has no label.
fn label_or_code(dimension: Dimension, code: u8) -> String {
    label_for(dimension, code).map_or_else(|_| code.to_string(), str::to_string)
}

/// Cells of one record row.
pub fn record_cells(obs: &Observation) -> Vec<String> {
    vec![
        obs.date.format("%Y-%m-%d").to_string(),
        format!("{:02}", obs.hour),
        label_or_code(Dimension::Season, obs.season),
        label_or_code(Dimension::Weather, obs.weather),
        label_or_code(Dimension::Holiday, obs.holiday),
        format_number(obs.temperature, 2),
        format_number(obs.windspeed, 2),
        format_count(obs.casual),
        format_count(obs.registered),
        format_count(obs.total),
        obs.cluster.map_or_else(|| "-".to_string(), |c| c.to_string()),
    ]
}

/// Rows of `area` available for records, inside the border and header.
pub fn visible_record_rows(area: Rect) -> usize {
    area.height.saturating_sub(3) as usize
}

/// Render the records starting at `offset`, as many as fit in `area`.
pub fn render_records_table(
    frame: &mut Frame,
    area: Rect,
    records: &[Observation],
    offset: usize,
    theme: &Theme,
) {
    let header = Row::new(
        [
            "Date", "Hr", "Season", "Weather", "Holiday", "Temp", "Wind", "Casual", "Reg.",
            "Total", "Cluster",
        ]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let offset = offset.min(records.len().saturating_sub(1));
    let rows: Vec<Row> = records
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_record_rows(area))
        .map(|(i, obs)| Row::new(record_cells(obs)).style(theme.row_style(i)))
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(3),
        Constraint::Length(7),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
    ];

    let title = records_title(records.len(), offset, rows.len());

    let table = Table::new(rows, widths)
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

/// Block title naming the visible slice, e.g. `" Records 11-15 of 17,379 "`.
fn records_title(total: usize, offset: usize, shown: usize) -> String {
    if shown == 0 {
        return " Records (0) ".to_string();
    }
    format!(
        " Records {}-{} of {} ",
        format_number((offset + 1) as f64, 0),
        format_number((offset + shown) as f64, 0),
        format_number(total as f64, 0)
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────
