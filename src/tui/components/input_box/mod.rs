//! # InputBox Component
//!
//! Multi-line editor for the session draft, with a Submit affordance.
//!
//! ## Responsibilities
//!
//! - Edit the draft (typing, paste, backspace/delete, cursor movement)
//! - Emit `Submit` on Enter, but only for a non-blank draft and never while busy
//! - Grow between `MIN_VISIBLE_LINES` and `MAX_VISIBLE_LINES`, then scroll
//!
//! ## State Management
//!
//! The text belongs to the session (`Session::draft_mut`) and arrives as a
//! prop, so clearing it after a submission needs no coordination here.
//! Cursor and scroll position persist in `InputBoxState`; the cursor is
//! clamped every time in case the draft shrank underneath it.

mod layout;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use layout::{
    CONTENT_OFFSET_X, VERTICAL_OVERHEAD, cursor_position, inner_width, next_char_boundary,
    offset_at_column, prev_char_boundary, visual_rows,
};

/// Visible rows before the box stops growing and starts scrolling.
const MIN_VISIBLE_LINES: u16 = 3;
const MAX_VISIBLE_LINES: u16 = 7;
const PLACEHOLDER: &str = "Enter chat ....";

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User asked to send the draft (Enter on a non-blank draft, not busy)
    Submit,
    /// Text or cursor changed
    ContentChanged,
}

/// Cursor and scroll position. Must be persisted in the parent TuiState.
#[derive(Debug, Default)]
pub struct InputBoxState {
    /// Cursor position as byte offset into the draft
    cursor: usize,
    /// First visible row when the draft is taller than the box
    scroll_offset: u16,
    /// Inner width from the last render (used for vertical movement)
    last_width: u16,
}

impl InputBoxState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box height for `draft` at `area_width`, borders included.
    pub fn calculate_height(draft: &str, area_width: u16) -> u16 {
        let rows = visual_rows(draft, inner_width(area_width)).len() as u16;
        rows.clamp(MIN_VISIBLE_LINES, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    fn clamp_cursor(&mut self, draft: &str) {
        self.cursor = self.cursor.min(draft.len());
        while !draft.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }

    fn keep_row_visible(&mut self, row: u16, visible: u16) {
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if visible > 0 && row >= self.scroll_offset + visible {
            self.scroll_offset = row + 1 - visible;
        }
    }
}

/// Transient wrapper: persistent state plus this frame's props.
///
/// # Props
///
/// - `draft`: the session's input buffer
/// - `busy`: a request is in flight; Submit is disabled
/// - `focused`: whether keystrokes land here (shows the cursor)
pub struct InputBox<'a> {
    pub state: &'a mut InputBoxState,
    pub draft: &'a mut String,
    pub busy: bool,
    pub focused: bool,
}

impl<'a> InputBox<'a> {
    pub fn new(state: &'a mut InputBoxState, draft: &'a mut String, busy: bool, focused: bool) -> Self {
        Self {
            state,
            draft,
            busy,
            focused,
        }
    }

    fn can_submit(&self) -> bool {
        !self.busy && !self.draft.trim().is_empty()
    }

    fn move_vertically(&mut self, down: bool) -> bool {
        let rows = visual_rows(self.draft, self.state.last_width);
        let (row, col) = cursor_position(self.draft, &rows, self.state.cursor);
        let target = if down {
            row + 1
        } else if row == 0 {
            return false;
        } else {
            row - 1
        };
        let Some(target_row) = rows.get(target) else {
            return false;
        };
        self.state.cursor = offset_at_column(self.draft, target_row, col);
        true
    }

    fn insert(&mut self, text: &str) {
        self.draft.insert_str(self.state.cursor, text);
        self.state.cursor += text.len();
    }
}

impl<'a> Component for InputBox<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.clamp_cursor(self.draft);
        let width = inner_width(area.width);
        self.state.last_width = width;

        let rows = visual_rows(self.draft, width);
        let visible = area.height.saturating_sub(VERTICAL_OVERHEAD);
        let (cursor_row, cursor_col) = cursor_position(self.draft, &rows, self.state.cursor);
        self.state.keep_row_visible(cursor_row as u16, visible);

        let text_style = if self.busy {
            Style::default().fg(Color::Green).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(Color::Green)
        };
        let lines: Vec<Line> = if self.draft.is_empty() {
            vec![Line::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))]
        } else {
            rows.iter()
                .skip(self.state.scroll_offset as usize)
                .take(visible as usize)
                .map(|r| Line::styled(&self.draft[r.clone()], text_style))
                .collect()
        };

        let (submit_label, submit_style) = if self.busy {
            (" Sending... ", Style::default().fg(Color::DarkGray))
        } else if self.can_submit() {
            (
                " Submit ⏎ ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )
        } else {
            (" Submit ⏎ ", Style::default().fg(Color::DarkGray))
        };
        let border_style = if self.focused {
            Style::default()
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(" Message ")
            .title_bottom(Line::styled(submit_label, submit_style).right_aligned())
            .padding(Padding::horizontal(1));

        frame.render_widget(Paragraph::new(lines).block(block), area);

        if self.focused {
            let visible_row = (cursor_row as u16).saturating_sub(self.state.scroll_offset);
            frame.set_cursor_position((
                area.x + CONTENT_OFFSET_X + cursor_col.min(width),
                area.y + 1 + visible_row,
            ));
        }
    }
}

impl<'a> EventHandler for InputBox<'a> {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        self.state.clamp_cursor(self.draft);
        let cursor = self.state.cursor;
        match event {
            TuiEvent::InputChar(c) => {
                let mut buf = [0u8; 4];
                self.insert(c.encode_utf8(&mut buf));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Normalize CRLF from some terminals
                self.insert(&text.replace("\r\n", "\n"));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (cursor > 0).then(|| {
                let prev = prev_char_boundary(self.draft, cursor);
                self.draft.drain(prev..cursor);
                self.state.cursor = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (cursor < self.draft.len()).then(|| {
                let next = next_char_boundary(self.draft, cursor);
                self.draft.drain(cursor..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (cursor > 0).then(|| {
                self.state.cursor = prev_char_boundary(self.draft, cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (cursor < self.draft.len()).then(|| {
                self.state.cursor = next_char_boundary(self.draft, cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorHome => {
                let line_start = self.draft[..cursor].rfind('\n').map_or(0, |i| i + 1);
                (cursor != line_start).then(|| {
                    self.state.cursor = line_start;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.draft[cursor..]
                    .find('\n')
                    .map_or(self.draft.len(), |i| cursor + i);
                (cursor != line_end).then(|| {
                    self.state.cursor = line_end;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorUp => self
                .move_vertically(false)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::CursorDown => self
                .move_vertically(true)
                .then_some(InputEvent::ContentChanged),
            TuiEvent::Submit => self.can_submit().then_some(InputEvent::Submit),
            _ => None,
        }
    }
}
