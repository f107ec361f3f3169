use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decorative string placed either side of the application title.
pub const WHEELS: &str = "◎ ◉ ◎";

/// Width of the `=` separator under the title.
const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering four lines:
///
/// 1. Application title with decorations.
/// 2. A 60-column `=` separator.
/// 3. Active filters and data source in `[ filters | source ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Active filters, e.g. `"season = Summer"`. Empty means no filtering.
    pub filters: &'a [String],
    /// File name of the loaded dataset.
    pub source: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(filters: &'a [String], source: &'a str, theme: &'a Theme) -> Self {
        Self {
            filters,
            source,
            theme,
        }
    }

    /// Text of the filter section.
    pub fn filter_text(&self) -> String {
        if self.filters.is_empty() {
            "all records".to_string()
        } else {
            self.filters.join(", ")
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(vec![
                Span::styled(WHEELS, self.theme.dim),
                Span::styled(" BIKE SHARING DASHBOARD ", self.theme.header),
                Span::styled(WHEELS, self.theme.dim),
            ]),
            Line::from(Span::styled(
                "=".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.filter_text(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.source.to_string(), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
