//! # History Panel Component
//!
//! Left-hand list of known conversations plus a "New chat" action.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `HistoryPanelState` lives in `TuiState`
//! - `HistoryPanel` is created each frame with the directory listing and
//!   the current route as props
//!
//! Whether an entry is highlighted as active is decided by
//! `route::is_active` alone, so the panel never needs to be told which
//! conversation is open.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::core::history::ConversationSummary;
use crate::core::route::{Route, is_active};
use crate::tui::component::Component;
use crate::tui::event::TuiEvent;

/// Titles wrap to at most this many rows before being cut with an ellipsis.
const MAX_TITLE_ROWS: usize = 2;
const ACTIVE_MARKER: &str = "● ";
const INACTIVE_MARKER: &str = "  ";

/// Events emitted by the history panel.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    /// Open `/chat/{id}`
    Open(String),
    /// Open `/chat`
    NewConversation,
}

/// What a rendered row leads to when activated.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    NewChat,
    Entry(usize),
}

/// Persistent state for the history panel.
#[derive(Debug, Default)]
pub struct HistoryPanelState {
    /// 0 is "New chat"; `n` is conversation `n - 1`
    pub selected: usize,
    offset: usize,
    /// Area of the last render (for hit testing)
    area: Rect,
    /// Target of each visible row, top to bottom, from the last render
    row_targets: Vec<Option<Target>>,
}

impl HistoryPanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles keyboard selection and clicks. `conversations` is the
    /// listing the panel was last rendered with.
    pub fn handle_event_with(
        &mut self,
        event: &TuiEvent,
        conversations: &[ConversationSummary],
    ) -> Option<HistoryEvent> {
        match event {
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                self.selected = (self.selected + 1).min(conversations.len());
                None
            }
            TuiEvent::Submit => activate(self.selected_target(), conversations),
            TuiEvent::MouseClick(column, row) => {
                if !self.area.contains(Position { x: *column, y: *row }) {
                    return None;
                }
                let target = self
                    .row_targets
                    .get((*row - self.area.y) as usize)
                    .copied()
                    .flatten()?;
                self.selected = match target {
                    Target::NewChat => 0,
                    Target::Entry(i) => i + 1,
                };
                activate(target, conversations)
            }
            _ => None,
        }
    }

    /// Whether a screen position falls inside the panel.
    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area.contains(Position { x: column, y: row })
    }

    fn selected_target(&self) -> Target {
        match self.selected {
            0 => Target::NewChat,
            n => Target::Entry(n - 1),
        }
    }
}

fn activate(target: Target, conversations: &[ConversationSummary]) -> Option<HistoryEvent> {
    match target {
        Target::NewChat => Some(HistoryEvent::NewConversation),
        Target::Entry(i) => conversations
            .get(i)
            .map(|summary| HistoryEvent::Open(summary.id.clone())),
    }
}

/// One conversation link. Marked active when the route points at it.
pub struct HistoryEntry<'a> {
    pub summary: &'a ConversationSummary,
    pub active: bool,
    pub selected: bool,
}

impl<'a> HistoryEntry<'a> {
    pub fn new(summary: &'a ConversationSummary, route: &Route, selected: bool) -> Self {
        Self {
            summary,
            active: is_active(&summary.id, route),
            selected,
        }
    }

    /// The entry's rows at `width`, title wrapped and capped.
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let marker_width = ACTIVE_MARKER.chars().count();
        let title_width = (width as usize).saturating_sub(marker_width).max(1);
        let mut rows: Vec<String> = textwrap::wrap(&self.summary.title, title_width)
            .into_iter()
            .map(|row| row.into_owned())
            .collect();
        if rows.is_empty() {
            rows.push(String::new());
        }
        if rows.len() > MAX_TITLE_ROWS {
            rows.truncate(MAX_TITLE_ROWS);
            if let Some(last) = rows.last_mut() {
                truncate_with_ellipsis(last, title_width);
            }
        }

        let mut style = if self.active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        if self.selected {
            style = style.add_modifier(Modifier::REVERSED);
        }

        rows.into_iter()
            .enumerate()
            .map(|(i, row)| {
                let marker = if i == 0 && self.active {
                    ACTIVE_MARKER
                } else {
                    INACTIVE_MARKER
                };
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Cyan)),
                    Span::styled(row, style),
                ])
            })
            .collect()
    }
}

fn truncate_with_ellipsis(row: &mut String, width: usize) {
    let keep = width.saturating_sub(1);
    if row.chars().count() >= width {
        *row = row.chars().take(keep).collect();
    }
    row.push('…');
}

/// Transient render wrapper for the history panel.
pub struct HistoryPanel<'a> {
    pub state: &'a mut HistoryPanelState,
    pub conversations: &'a [ConversationSummary],
    pub route: &'a Route,
    pub focused: bool,
}

impl<'a> HistoryPanel<'a> {
    pub fn new(
        state: &'a mut HistoryPanelState,
        conversations: &'a [ConversationSummary],
        route: &'a Route,
        focused: bool,
    ) -> Self {
        Self {
            state,
            conversations,
            route,
            focused,
        }
    }

    /// All rows of the panel, each paired with what it activates.
    fn rows(&self, width: u16) -> Vec<(Line<'static>, Option<Target>)> {
        let new_chat_style = if self.focused && self.state.selected == 0 {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        };
        let mut rows = vec![
            (Line::styled("+ New chat", new_chat_style), Some(Target::NewChat)),
            (Line::default(), None),
            (
                Line::styled(
                    "Chats",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                ),
                None,
            ),
        ];
        for (i, summary) in self.conversations.iter().enumerate() {
            let selected = self.focused && self.state.selected == i + 1;
            let entry = HistoryEntry::new(summary, self.route, selected);
            rows.extend(
                entry
                    .lines(width)
                    .into_iter()
                    .map(|line| (line, Some(Target::Entry(i)))),
            );
        }
        rows
    }

    /// Keep the selected item's first row on screen.
    fn scroll_to_selected(&mut self, rows: &[(Line<'static>, Option<Target>)], visible: usize) {
        let target = self.state.selected_target();
        let Some(first) = rows.iter().position(|(_, t)| *t == Some(target)) else {
            return;
        };
        if first < self.state.offset {
            self.state.offset = first;
        } else if visible > 0 && first >= self.state.offset + visible {
            self.state.offset = first + 1 - visible;
        }
    }
}

impl<'a> Component for HistoryPanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.selected = self.state.selected.min(self.conversations.len());

        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(border_style)
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.state.area = inner;

        let rows = self.rows(inner.width);
        let visible = inner.height as usize;
        self.scroll_to_selected(&rows, visible);
        let max_offset = rows.len().saturating_sub(visible);
        self.state.offset = self.state.offset.min(max_offset);

        let (lines, targets): (Vec<_>, Vec<_>) = rows
            .into_iter()
            .skip(self.state.offset)
            .take(visible)
            .unzip();
        self.state.row_targets = targets;
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::default_seed;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(
        state: &mut HistoryPanelState,
        conversations: &[ConversationSummary],
        route: &Route,
        width: u16,
        height: u16,
    ) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| HistoryPanel::new(state, conversations, route, true).render(f, f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect())
            .collect()
    }

    #[test]
    fn test_entry_active_only_for_exact_route() {
        let summary = ConversationSummary::new("3", "This is chat 3");
        assert!(HistoryEntry::new(&summary, &Route::chat("3"), false).active);
        assert!(!HistoryEntry::new(&summary, &Route::chat("4"), false).active);
        assert!(!HistoryEntry::new(&summary, &Route::chat("13"), false).active);
        assert!(!HistoryEntry::new(&summary, &Route::new_chat(), false).active);
    }

    #[test]
    fn test_long_titles_wrap_to_two_rows() {
        let summary = ConversationSummary::new("1", "This is chat 1, It's a long name for a chat");
        let entry = HistoryEntry::new(&summary, &Route::Home, false);
        let lines = entry.lines(14);
        assert_eq!(lines.len(), MAX_TITLE_ROWS);
        let last: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(last.ends_with('…'), "got {last:?}");
    }

    #[test]
    fn test_short_title_is_one_row() {
        let summary = ConversationSummary::new("2", "This is chat 2");
        let entry = HistoryEntry::new(&summary, &Route::chat("2"), false);
        let lines = entry.lines(30);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans[0].content, ACTIVE_MARKER);
    }

    #[test]
    fn test_render_lists_new_chat_and_entries() {
        let conversations = default_seed();
        let mut state = HistoryPanelState::new();
        let rows = render(&mut state, &conversations, &Route::chat("3"), 30, 20);
        let text = rows.join("\n");
        assert!(text.contains("+ New chat"));
        assert!(text.contains("Chats"));
        assert!(text.contains("This is chat 2"));
        let active_row = rows.iter().find(|r| r.contains("This is chat 3")).unwrap();
        assert!(active_row.contains('●'));
    }

    #[test]
    fn test_keyboard_selection_opens_entries() {
        let conversations = default_seed();
        let mut state = HistoryPanelState::new();
        assert_eq!(
            state.handle_event_with(&TuiEvent::Submit, &conversations),
            Some(HistoryEvent::NewConversation)
        );
        state.handle_event_with(&TuiEvent::CursorDown, &conversations);
        state.handle_event_with(&TuiEvent::CursorDown, &conversations);
        assert_eq!(
            state.handle_event_with(&TuiEvent::Submit, &conversations),
            Some(HistoryEvent::Open("2".to_string()))
        );
    }

    #[test]
    fn test_selection_is_clamped() {
        let conversations = vec![ConversationSummary::new("a", "A")];
        let mut state = HistoryPanelState::new();
        for _ in 0..5 {
            state.handle_event_with(&TuiEvent::CursorDown, &conversations);
        }
        assert_eq!(state.selected, 1);
        for _ in 0..5 {
            state.handle_event_with(&TuiEvent::CursorUp, &conversations);
        }
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_click_hits_rendered_rows() {
        let conversations = vec![
            ConversationSummary::new("a", "First"),
            ConversationSummary::new("b", "Second"),
        ];
        let mut state = HistoryPanelState::new();
        render(&mut state, &conversations, &Route::Home, 20, 10);

        // Row 0 is "New chat", row 3 the first entry, row 4 the second
        assert_eq!(
            state.handle_event_with(&TuiEvent::MouseClick(3, 0), &conversations),
            Some(HistoryEvent::NewConversation)
        );
        assert_eq!(
            state.handle_event_with(&TuiEvent::MouseClick(3, 4), &conversations),
            Some(HistoryEvent::Open("b".to_string()))
        );
        assert_eq!(state.selected, 2);
        // The blank spacer and header do nothing
        assert_eq!(
            state.handle_event_with(&TuiEvent::MouseClick(3, 1), &conversations),
            None
        );
        // Outside the panel
        assert_eq!(
            state.handle_event_with(&TuiEvent::MouseClick(25, 0), &conversations),
            None
        );
    }
}
