use ratatui::style::Style;
use ratatui::text::{Line, Span};
use rides_core::formatting::{format_count, percentage};
use unicode_width::UnicodeWidthStr;

use crate::themes::Theme;

/// Visual configuration of a share bar.
pub struct ShareBarConfig {
    /// Columns reserved for the label, padded or truncated to fit.
    pub label_width: usize,
    /// Columns of the bar portion.
    pub width: usize,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for ShareBarConfig {
    fn default() -> Self {
        Self {
            label_width: 12,
            width: 40,
            filled_char: '\u{2588}', // █
            empty_char: '\u{2591}',  // ░
        }
    }
}

/// One slice of a share chart: a label, a horizontal bar proportional to the
/// slice's share of the whole, and the percentage and raw value.
///
/// ```text
/// Casual      ███████░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░  18.8%  620,017
/// ```
pub struct ShareBar<'a> {
    pub label: &'a str,
    pub value: f64,
    /// Percentage of the whole, clamped to `[0.0, 100.0]`.
    pub percentage: f64,
    pub style: Style,
    pub theme: &'a Theme,
    pub config: ShareBarConfig,
}

impl<'a> ShareBar<'a> {
    /// Construct a bar for `value` out of `whole`. A zero whole gives 0 %.
    pub fn new(label: &'a str, value: f64, whole: f64, style: Style, theme: &'a Theme) -> Self {
        Self {
            label,
            value,
            percentage: percentage(value, whole, 1).clamp(0.0, 100.0),
            style,
            theme,
            config: ShareBarConfig::default(),
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.config.width = width;
        self
    }

    pub fn to_line(&self) -> Line<'a> {
        let filled = ((self.percentage / 100.0) * self.config.width as f64).round() as usize;
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String = std::iter::repeat_n(self.config.filled_char, filled).collect();
        let empty_str: String = std::iter::repeat_n(self.config.empty_char, empty).collect();

        Line::from(vec![
            Span::styled(fit_label(self.label, self.config.label_width), self.theme.label),
            Span::styled(filled_str, self.style),
            Span::styled(empty_str, self.theme.dim),
            Span::styled(format!(" {:>5.1}%", self.percentage), self.theme.value),
            Span::styled(format!("  {}", format_count(self.value)), self.theme.dim),
        ])
    }
}

/// Pad or truncate `label` to exactly `width` display columns.
pub fn fit_label(label: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in label.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(&" ".repeat(width.saturating_sub(out.width())));
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_bar_to_line() {
        let theme = Theme::dark();
        let bar = ShareBar::new("Casual", 250.0, 1000.0, theme.share_style(0), &theme);
        let line = bar.to_line();

        assert_eq!(line.spans.len(), 5);
        assert_eq!(line.spans[0].content, "Casual      ");
        // 25% of 40 columns.
        assert_eq!(line.spans[1].content.chars().count(), 10);
        assert!(line.spans[1].content.chars().all(|c| c == '█'));
        assert_eq!(line.spans[2].content.chars().count(), 30);
        assert!(line.spans[3].content.contains("25.0%"));
        assert!(line.spans[4].content.contains("250"));
    }

    #[test]
    fn test_share_bar_full_and_zero_whole() {
        let theme = Theme::dark();
        let full = ShareBar::new("All", 10.0, 10.0, theme.bar, &theme).to_line();
        assert_eq!(full.spans[1].content.chars().count(), 40);
        assert_eq!(full.spans[2].content.len(), 0);

        let none = ShareBar::new("None", 10.0, 0.0, theme.bar, &theme);
        assert_eq!(none.percentage, 0.0);
        assert_eq!(none.to_line().spans[2].content.chars().count(), 40);
    }

    #[test]
    fn test_share_bar_custom_width() {
        let theme = Theme::classic();
        let line = ShareBar::new("Registered", 3.0, 4.0, theme.bar, &theme)
            .with_width(20)
            .to_line();
        assert_eq!(line.spans[1].content.chars().count(), 15);
        assert_eq!(line.spans[2].content.chars().count(), 5);
    }

    #[test]
    fn test_fit_label_pads_and_truncates() {
        assert_eq!(fit_label("Fall", 6), "Fall  ");
        assert_eq!(fit_label("Non-Holiday", 6), "Non-Ho");
        assert_eq!(fit_label("", 3), "   ");
        // Wide characters count double.
        assert_eq!(fit_label("日本語", 5), "日本 ");
    }
}
