//! Application state and TUI event loop for the bike-sharing dashboard.
//!
//! [`App`] owns the theme, the built [`Dashboard`] and the index of the panel
//! on screen. [`App::run`] drives the synchronous event loop.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use tracing::debug;

use rides_data::analysis::Dashboard;

use crate::chart_view;
use crate::components::header::Header;
use crate::components::metrics::{MetricsLine, SelectionIndicator};
use crate::table_view;
use crate::themes::Theme;

/// Poll timeout of the event loop.
const TICK_RATE: Duration = Duration::from_millis(250);

/// Records skipped by one PageUp / PageDown.
const RECORD_PAGE: usize = 5;

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub dashboard: Dashboard,
    /// Dataset file name shown in the header.
    pub source: String,
    /// Index into `dashboard.panels` of the panel on screen.
    pub selected: usize,
    /// Index of the first record shown in the records table.
    pub record_offset: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, dashboard: Dashboard, source: impl Into<String>) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            dashboard,
            source: source.into(),
            selected: 0,
            record_offset: 0,
            should_quit: false,
        }
    }

    // ── Navigation ────────────────────────────────────────────────────────────

    pub fn next_panel(&mut self) {
        let n = self.dashboard.panels.len();
        if n > 0 {
            self.selected = (self.selected + 1) % n;
        }
    }

    pub fn previous_panel(&mut self) {
        let n = self.dashboard.panels.len();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    /// Move the records table by `delta` rows, clamped to the selection.
    pub fn scroll_records(&mut self, delta: isize) {
        let last = self.dashboard.records.len().saturating_sub(1);
        self.record_offset = self.record_offset.saturating_add_signed(delta).min(last);
    }

    /// Apply one key press. `q`, `Q` and `Ctrl+C` quit; `←`/`→`, `Tab` and
    /// `Shift+Tab` switch panels; `↑`/`↓`, `PgUp`/`PgDn` and `Home` scroll
    /// the records table.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Right | KeyCode::Tab => self.next_panel(),
            KeyCode::Left | KeyCode::BackTab => self.previous_panel(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_records(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_records(-1),
            KeyCode::PageDown => self.scroll_records(RECORD_PAGE as isize),
            KeyCode::PageUp => self.scroll_records(-(RECORD_PAGE as isize)),
            KeyCode::Home => self.record_offset = 0,
            _ => {}
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the TUI until the user quits.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                    debug!(panel = self.selected, "Key handled");
                }
            }
        }
        Ok(())
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let theme = &self.theme;
        let meta = &self.dashboard.metadata;

        let [header_area, metrics_area, tabs_area, body_area, records_area, footer_area] =
            Layout::vertical([
                Constraint::Length(4),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(8),
                Constraint::Length(1),
            ])
            .areas(area);

        let header = Header::new(&meta.filters, &self.source, theme);
        frame.render_widget(Paragraph::new(header.to_lines()), header_area);

        let mut metric_lines = vec![
            SelectionIndicator::new(meta.records_selected, meta.records_loaded, theme).to_line(),
        ];
        if let Some(metrics) = &self.dashboard.metrics {
            metric_lines.push(MetricsLine::new(metrics, theme).to_line());
        }
        frame.render_widget(Paragraph::new(metric_lines), metrics_area);

        let Some(panel) = self.dashboard.panels.get(self.selected) else {
            chart_view::render_no_data(frame, body_area, theme);
            return;
        };

        let titles: Vec<Line> = self
            .dashboard
            .panels
            .iter()
            .map(|p| Line::from(p.title.clone()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.selected)
            .style(theme.tab_inactive)
            .highlight_style(theme.tab_active)
            .divider(Span::styled("│", theme.separator));
        frame.render_widget(tabs, tabs_area);

        let [chart_area, table_area] =
            Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
                .areas(body_area);
        chart_view::render_panel(frame, chart_area, panel, theme);
        table_view::render_panel_table(frame, table_area, panel, theme);
        table_view::render_records_table(
            frame,
            records_area,
            &self.dashboard.records,
            self.record_offset,
            theme,
        );

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "←/→ Tab: switch panel   ↑/↓ PgUp/PgDn: scroll records   q / Ctrl+C: quit",
                theme.dim,
            ))),
            footer_area,
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use rides_core::categories::{time_bucket_for, Dimension};
    use rides_core::models::Observation;
    use rides_data::filter::Predicates;

    fn obs(season: u8, hour: u8, total: f64) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2011, 6, 1).unwrap(),
            hour,
            season,
            weather: 1,
            holiday: 0,
            temperature: 0.6,
            windspeed: 0.2,
            casual: total / 2.0,
            registered: total / 2.0,
            total,
            time_bucket: time_bucket_for(i64::from(hour)).unwrap(),
            cluster: Some(0),
        }
    }

    fn make_dashboard(predicates: &Predicates) -> Dashboard {
        let records = vec![obs(1, 8, 10.0), obs(2, 14, 30.0), obs(3, 20, 20.0)];
        Dashboard::build(&records, predicates).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    // ── Construction ──────────────────────────────────────────────────────────

    #[test]
    fn test_app_creation_defaults() {
        let app = App::new("dark", make_dashboard(&Predicates::new()), "bike.csv");
        assert_eq!(app.selected, 0);
        assert!(!app.should_quit);
        assert_eq!(app.source, "bike.csv");
        assert_eq!(app.dashboard.panels.len(), 7);
    }

    #[test]
    fn test_app_creation_unknown_theme_falls_back() {
        let app = App::new("nope", make_dashboard(&Predicates::new()), "bike.csv");
        assert!(app.theme.header.fg.is_some());
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_quit_keys() {
        for k in [
            key(KeyCode::Char('q')),
            key(KeyCode::Char('Q')),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = App::new("dark", make_dashboard(&Predicates::new()), "bike.csv");
            app.handle_key(k);
            assert!(app.should_quit);
        }
    }

    #[test]
    fn test_plain_c_does_not_quit() {
        let mut app = App::new("dark", make_dashboard(&Predicates::new()), "bike.csv");
        app.handle_key(key(KeyCode::Char('c')));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_panel_navigation_wraps() {
        let mut app = App::new("dark", make_dashboard(&Predicates::new()), "bike.csv");
        let n = app.dashboard.panels.len();

        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.selected, n - 1);
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.selected, 0);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.selected, 1);
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_navigation_without_panels_is_noop() {
        let preds = Predicates::new().with(Dimension::Season, 4);
        let mut app = App::new("dark", make_dashboard(&preds), "bike.csv");
        assert!(app.dashboard.panels.is_empty());
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_record_scrolling_is_clamped() {
        let mut app = App::new("dark", make_dashboard(&Predicates::new()), "bike.csv");
        assert_eq!(app.dashboard.records.len(), 3);

        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.record_offset, 0);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.record_offset, 1);
        app.handle_key(key(KeyCode::PageDown));
        assert_eq!(app.record_offset, 2);
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.record_offset, 1);
        app.handle_key(key(KeyCode::Home));
        assert_eq!(app.record_offset, 0);
    }

    #[test]
    fn test_scrolling_without_records_stays_at_top() {
        let preds = Predicates::new().with(Dimension::Season, 4);
        let mut app = App::new("dark", make_dashboard(&preds), "bike.csv");
        app.handle_key(key(KeyCode::PageDown));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.record_offset, 0);
    }

    #[test]
    fn test_render_after_scrolling_shows_offset() {
        let mut app = App::new("dark", make_dashboard(&Predicates::new()), "bike.csv");
        app.scroll_records(2);
        let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("Records 3-3 of 3"));
    }

    // ── Render (does not panic) ───────────────────────────────────────────────

    #[test]
    fn test_render_every_panel_does_not_panic() {
        let mut app = App::new("dark", make_dashboard(&Predicates::new()), "bike.csv");
        let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();
        for _ in 0..app.dashboard.panels.len() {
            terminal.draw(|frame| app.render(frame)).unwrap();
            app.next_panel();
        }
    }

    #[test]
    fn test_render_empty_selection_does_not_panic() {
        let preds = Predicates::new().with(Dimension::Season, 4);
        let app = App::new("light", make_dashboard(&preds), "bike.csv");
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("No records match"));
    }

    #[test]
    fn test_render_small_terminal_does_not_panic() {
        let app = App::new("classic", make_dashboard(&Predicates::new()), "bike.csv");
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
    }
}
