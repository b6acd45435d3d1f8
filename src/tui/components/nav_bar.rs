//! # NavBar Component
//!
//! Top bar: the "RAG Home" link, the current route path and the status.
//!
//! Purely presentational. All three pieces arrive as props:
//! - `route`: Core App state (which page is on screen)
//! - `status_message`: Core App state ("Ready", "Thinking...")
//! - `spinner_frame`: TUI animation clock, shown only while busy
//!
//! ```text
//! RAG Home │ /chat/3                                  ⠹ Thinking...
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::route::Route;
use crate::tui::component::Component;

const HOME_LABEL: &str = "RAG Home";
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Top navigation bar.
///
/// # Props
///
/// - `route`: the page on screen, shown as its path
/// - `status_message`: transient status from the core
/// - `busy`: a request is in flight (adds a spinner)
pub struct NavBar<'a> {
    pub route: &'a Route,
    pub status_message: &'a str,
    pub busy: bool,
    pub spinner_frame: usize,
}

impl<'a> NavBar<'a> {
    pub fn new(route: &'a Route, status_message: &'a str, busy: bool, spinner_frame: usize) -> Self {
        Self {
            route,
            status_message,
            busy,
            spinner_frame,
        }
    }

    /// Whether a click at `column` on the bar's row lands on "RAG Home".
    pub fn home_hit(area: Rect, column: u16, row: u16) -> bool {
        let home = Rect::new(area.x, area.y, HOME_LABEL.len() as u16, 1);
        home.contains(Position { x: column, y: row })
    }
}

impl<'a> Component for NavBar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let status = if self.busy {
            format!(
                "{} {}",
                SPINNER[self.spinner_frame % SPINNER.len()],
                self.status_message
            )
        } else {
            self.status_message.to_string()
        };
        let status_width = status.chars().count() as u16;
        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(status_width)]).areas(area);

        let links = Line::from(vec![
            Span::styled(
                HOME_LABEL,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::raw(self.route.path()),
        ]);
        frame.render_widget(Paragraph::new(links), left);

        let status_style = if self.busy {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        frame.render_widget(Paragraph::new(Span::styled(status, status_style)), right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(route: &Route, status: &str, busy: bool) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 1)).unwrap();
        terminal
            .draw(|f| NavBar::new(route, status, busy, 0).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_nav_bar_shows_home_and_path() {
        let text = render_text(&Route::chat("3"), "Ready", false);
        assert!(text.starts_with("RAG Home"));
        assert!(text.contains("/chat/3"));
        assert!(text.trim_end().ends_with("Ready"));
    }

    #[test]
    fn test_nav_bar_busy_shows_spinner() {
        let text = render_text(&Route::new_chat(), "Thinking...", true);
        assert!(text.contains("/chat"));
        assert!(text.contains("⠋ Thinking..."));
    }

    #[test]
    fn test_nav_bar_home_route() {
        let text = render_text(&Route::Home, "Ready", false);
        assert!(text.contains("RAG Home │ /"));
    }

    #[test]
    fn test_home_hit() {
        let area = Rect::new(0, 0, 60, 1);
        assert!(NavBar::home_hit(area, 0, 0));
        assert!(NavBar::home_hit(area, 7, 0));
        assert!(!NavBar::home_hit(area, 8, 0));
        assert!(!NavBar::home_hit(area, 2, 1));
    }
}
