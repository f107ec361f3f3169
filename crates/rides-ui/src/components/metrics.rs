use crate::themes::Theme;
use ratatui::text::{Line, Span};
use rides_core::formatting::{format_count, format_number, format_share};
use rides_data::analysis::DashboardMetrics;

// ── MetricsLine ───────────────────────────────────────────────────────────────

/// Headline numbers for the selected records on one line:
///
/// `"Records 8,734 │ Rentals 1,061,129 │ Mean 121.49 │ Temp 0.71 │ Casual 18.8% │ Registered 81.2%"`
pub struct MetricsLine<'a> {
    pub metrics: &'a DashboardMetrics,
    pub theme: &'a Theme,
}

impl<'a> MetricsLine<'a> {
    pub fn new(metrics: &'a DashboardMetrics, theme: &'a Theme) -> Self {
        Self { metrics, theme }
    }

    /// `(label, formatted value)` pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let m = self.metrics;
        let users = m.casual + m.registered;
        vec![
            ("Records", format_number(m.records as f64, 0)),
            ("Rentals", format_count(m.total_rentals)),
            ("Mean", format_number(m.mean_rentals, 2)),
            ("Temp", format_number(m.mean_temperature, 2)),
            ("Casual", format_share(m.casual, users)),
            ("Registered", format_share(m.registered, users)),
        ]
    }

    pub fn to_line(&self) -> Line<'a> {
        let mut spans = Vec::new();
        for (i, (label, value)) in self.entries().into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", self.theme.separator));
            }
            spans.push(Span::styled(format!("{label} "), self.theme.label));
            spans.push(Span::styled(value, self.theme.value));
        }
        Line::from(spans)
    }
}

// ── SelectionIndicator ────────────────────────────────────────────────────────

/// How many of the loaded records survived filtering, with a warning style
/// when none did.
pub struct SelectionIndicator<'a> {
    pub selected: usize,
    pub loaded: usize,
    pub theme: &'a Theme,
}

impl<'a> SelectionIndicator<'a> {
    pub fn new(selected: usize, loaded: usize, theme: &'a Theme) -> Self {
        Self {
            selected,
            loaded,
            theme,
        }
    }

    /// Format: `"Selected 8,734 of 17,379 records"`
    pub fn to_line(&self) -> Line<'a> {
        let style = if self.selected == 0 {
            self.theme.warning
        } else {
            self.theme.value
        };
        Line::from(vec![
            Span::styled("Selected ", self.theme.label),
            Span::styled(format_number(self.selected as f64, 0), style),
            Span::styled(
                format!(" of {} records", format_number(self.loaded as f64, 0)),
                self.theme.dim,
            ),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
