//! # Landing Page Component
//!
//! The page at `/`: a greeting, the rate-limit notice and a "Start Chat"
//! button that opens a new conversation.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const TITLE: &str = "Welcome to the RAG chat";
const RATE_LIMIT_NOTICE: &str = "Each conversation has a rate limit of 10 requests per minute.";
const BUTTON_LABEL: &str = " Start Chat ⏎ ";

#[derive(Debug, Clone, PartialEq)]
pub enum LandingEvent {
    StartChat,
}

/// Where the button was drawn, for click hit testing.
#[derive(Debug, Default)]
pub struct LandingState {
    button: Rect,
}

impl LandingState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventHandler for LandingState {
    type Event = LandingEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<LandingEvent> {
        match event {
            TuiEvent::Submit => Some(LandingEvent::StartChat),
            TuiEvent::MouseClick(column, row)
                if self.button.contains(Position { x: *column, y: *row }) =>
            {
                Some(LandingEvent::StartChat)
            }
            _ => None,
        }
    }
}

pub struct LandingPage<'a> {
    pub state: &'a mut LandingState,
}

impl<'a> LandingPage<'a> {
    pub fn new(state: &'a mut LandingState) -> Self {
        Self { state }
    }
}

impl<'a> Component for LandingPage<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [title_area, _, notice_area, _, button_row] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .flex(Flex::Center)
        .areas(area);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                TITLE,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center),
            title_area,
        );
        frame.render_widget(
            Paragraph::new(RATE_LIMIT_NOTICE)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            notice_area,
        );

        let button_width = BUTTON_LABEL.chars().count() as u16 + 2;
        let [button] = Layout::horizontal([Constraint::Length(button_width)])
            .flex(Flex::Center)
            .areas(button_row);
        frame.render_widget(
            Paragraph::new(BUTTON_LABEL)
                .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
                .block(
                    Block::bordered()
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(Color::Green)),
                ),
            button,
        );
        self.state.button = button;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_landing_renders_welcome_and_notice() {
        let mut state = LandingState::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|f| LandingPage::new(&mut state).render(f, f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains(TITLE));
        assert!(text.contains(RATE_LIMIT_NOTICE));
        assert!(text.contains("Start Chat"));
    }

    #[test]
    fn test_enter_and_button_click_start_chat() {
        let mut state = LandingState::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|f| LandingPage::new(&mut state).render(f, f.area()))
            .unwrap();

        assert_eq!(state.handle_event(&TuiEvent::Submit), Some(LandingEvent::StartChat));
        let button = state.button;
        assert!(button.width > 0);
        assert_eq!(
            state.handle_event(&TuiEvent::MouseClick(button.x + 1, button.y + 1)),
            Some(LandingEvent::StartChat)
        );
        assert_eq!(state.handle_event(&TuiEvent::MouseClick(0, 0)), None);
        assert_eq!(state.handle_event(&TuiEvent::InputChar('x')), None);
    }
}
