//! # MessageList Component
//!
//! Scrollable view of the session's exchanges.
//!
//! ## Responsibilities
//!
//! - Display the message log, oldest first
//! - Glide to the newest exchange when the log grows
//! - Keyboard selection and `+`/`-` feedback on the selected card
//! - Hit testing for clicks on the feedback affordances
//! - Layout caching (card heights)
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the `MessageLog` (props).
//!
//! Exchanges never change once appended, so a cached height stays valid
//! until the width changes or the log is replaced by a new session.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::exchange::{FeedbackKind, MessageLog};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{CONTENT_INSET, Message};
use crate::tui::event::TuiEvent;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
/// Rows reserved under the last card while a request is in flight.
const PENDING_ROW_HEIGHT: u16 = 1;
/// Fraction of the remaining distance covered per animation frame.
const GLIDE_DIVISOR: u16 = 3;

/// High-level events emitted by the message list
#[derive(Debug, Clone, PartialEq)]
pub enum MessageListEvent {
    /// Thumbs up/down on the exchange at `index`.
    Feedback { index: usize, kind: FeedbackKind },
}

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// When true, stay pinned to the bottom as the view resizes
    pub stick_to_bottom: bool,
    /// True while gliding towards the newest exchange
    pub animating: bool,
    /// Currently selected exchange (keyboard navigation or click)
    pub selected_index: Option<usize>,
    /// Area of the last render (for hit testing)
    pub area: Rect,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            animating: false,
            selected_index: None,
            area: Rect::default(),
        }
    }

    /// Start gliding to the newest exchange. Scrolling by hand interrupts it.
    pub fn scroll_to_latest(&mut self) {
        self.animating = true;
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    fn max_offset(&self, canvas_height: u16) -> u16 {
        canvas_height.saturating_sub(self.area.height)
    }

    /// Advance one animation frame towards `target`.
    fn step_towards(&mut self, target: u16) {
        let current = self.scroll_state.offset().y;
        if current >= target {
            self.scroll_state.set_offset(Position { x: 0, y: target });
            self.animating = false;
            self.stick_to_bottom = true;
            return;
        }
        let step = ((target - current) / GLIDE_DIVISOR).max(1);
        self.scroll_state.set_offset(Position {
            x: 0,
            y: current + step,
        });
    }

    fn interrupt(&mut self) {
        self.animating = false;
        self.stick_to_bottom = false;
    }

    /// Re-engage auto-follow if the user has scrolled back to the bottom.
    fn repin_if_at_bottom(&mut self) {
        let total = self.layout.total_height();
        let max_y = total.saturating_sub(self.area.height);
        if self.scroll_state.offset().y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: 0, y: max_y });
        }
    }

    /// Scroll the viewport so the selected card is fully visible.
    /// If the card is taller than the viewport, align its top edge.
    fn scroll_to_selected(&mut self) {
        let Some((top, bottom)) = self.selected_index.and_then(|i| self.layout.bounds(i)) else {
            return;
        };
        let offset_y = self.scroll_state.offset().y;
        if top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: top });
        } else if bottom > offset_y + self.area.height {
            let new_y = bottom.saturating_sub(self.area.height).min(top);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
        }
        self.animating = false;
        self.stick_to_bottom = false;
    }

    /// Feedback affordance under a screen position, if any.
    pub fn feedback_at(&self, column: u16, row: u16) -> Option<(usize, FeedbackKind)> {
        let area = self.area;
        if !area.contains(Position { x: column, y: row }) {
            return None;
        }
        let content_y = (row - area.y).saturating_add(self.scroll_state.offset().y);
        let index = self.layout.index_at(content_y)?;
        let (_, bottom) = self.layout.bounds(index)?;
        // The feedback row sits just above the bottom border
        if content_y != bottom.saturating_sub(2) {
            return None;
        }
        let inset_x = area.x + CONTENT_INSET;
        let column = column.checked_sub(inset_x)?;
        Message::feedback_at(column).map(|kind| (index, kind))
    }

    /// Like `handle_event`, plus selection and feedback, which need the
    /// number of exchanges on screen.
    pub fn handle_event_with(&mut self, event: &TuiEvent, count: usize) -> Option<MessageListEvent> {
        match event {
            TuiEvent::CursorUp => {
                self.select_previous(count);
                None
            }
            TuiEvent::CursorDown => {
                self.select_next(count);
                None
            }
            TuiEvent::InputChar(c @ ('+' | '-')) => {
                let index = self.selected_index.filter(|&i| i < count)?;
                let kind = if *c == '+' {
                    FeedbackKind::Up
                } else {
                    FeedbackKind::Down
                };
                Some(MessageListEvent::Feedback { index, kind })
            }
            TuiEvent::MouseClick(column, row) => {
                let (index, kind) = self.feedback_at(*column, *row)?;
                self.selected_index = Some(index);
                Some(MessageListEvent::Feedback { index, kind })
            }
            _ => self.handle_event(event),
        }
    }

    fn select_previous(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        let idx = self
            .selected_index
            .map(|i| i.saturating_sub(1))
            .unwrap_or(count - 1);
        self.selected_index = Some(idx);
        self.scroll_to_selected();
    }

    fn select_next(&mut self, count: usize) {
        if let Some(idx) = self.selected_index
            && idx + 1 < count
        {
            self.selected_index = Some(idx + 1);
            self.scroll_to_selected();
        }
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    // Mutable reference to persistent state
    pub state: &'a mut MessageListState,
    pub messages: &'a MessageLog,
    pub is_busy: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a MessageLog,
        is_busy: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            is_busy,
            spinner_frame,
        }
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect) {
        let hint = if self.is_busy {
            format!("{} Waiting for the first answer...", self.spinner())
        } else {
            "Ask anything to get started.".to_string()
        };
        let y = area.y + area.height / 2;
        let line_area = Rect::new(area.x, y.min(area.bottom().saturating_sub(1)), area.width, 1);
        frame.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            line_area,
        );
    }

    fn spinner(&self) -> &'static str {
        SPINNER[self.spinner_frame % SPINNER.len()]
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.area = area;
        if self.messages.is_empty() {
            self.state.layout.clear();
            self.render_empty(frame, area);
            return;
        }

        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area

        // 1. Update Layout Cache (Internal Mutation)
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(self.messages.len(), content_width);
        layout.heights.truncate(reusable);
        for exchange in self.messages.iter().skip(layout.heights.len()) {
            layout
                .heights
                .push(Message::calculate_height(exchange, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(self.messages.len(), content_width);

        let total_height = self.state.layout.total_height();
        let pending = if self.is_busy { PENDING_ROW_HEIGHT } else { 0 };
        let canvas_height = total_height.saturating_add(pending);

        // 2. Scroll: glide, follow, or clamp
        let max_y = self.state.max_offset(canvas_height);
        if self.state.animating {
            self.state.step_towards(max_y);
        } else if self.state.stick_to_bottom {
            self.state
                .scroll_state
                .set_offset(Position { x: 0, y: max_y });
        } else if self.state.scroll_state.offset().y > max_y {
            self.state
                .scroll_state
                .set_offset(Position { x: 0, y: max_y });
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible cards into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible_range {
            let (Some(exchange), Some((top, bottom))) =
                (self.messages.get(i), self.state.layout.bounds(i))
            else {
                continue;
            };
            let rect = Rect::new(0, top, content_width, bottom - top);
            let is_selected = self.state.selected_index == Some(i);
            scroll_view.render_widget(Message::new(exchange, is_selected), rect);
        }

        if self.is_busy {
            let line = Line::from(format!("{} Thinking...", self.spinner()))
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
            scroll_view.render_widget(
                Paragraph::new(line),
                Rect::new(0, total_height, content_width, PENDING_ROW_HEIGHT),
            );
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler is implemented on `MessageListState` rather than `MessageList` because
/// event handling needs the persistent scroll and selection state, while
/// `MessageList` is recreated each frame.
impl EventHandler for MessageListState {
    type Event = MessageListEvent;

    /// Scrolling only.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.interrupt();
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.animating = false;
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.interrupt();
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.animating = false;
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
#[derive(Default)]
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    /// How many cached heights are still valid.
    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || message_count < self.message_count {
            return 0;
        }
        self.heights.len().min(message_count)
    }

    pub fn update_metadata(&mut self, message_count: usize, content_width: u16) {
        self.message_count = message_count;
        self.content_width = content_width;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Top (inclusive) and bottom (exclusive) content rows of card `index`.
    pub fn bounds(&self, index: usize) -> Option<(u16, u16)> {
        let bottom = *self.prefix_heights.get(index)?;
        let top = if index == 0 {
            0
        } else {
            self.prefix_heights[index - 1]
        };
        Some((top, bottom))
    }

    /// Card containing content row `y`.
    pub fn index_at(&self, y: u16) -> Option<usize> {
        let index = self.prefix_heights.partition_point(|&end| end <= y);
        (index < self.prefix_heights.len()).then_some(index)
    }

    pub fn visible_range(
        &self,
        scroll_offset: u16,
        viewport_height: u16,
    ) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::exchange::Exchange;
    use crate::test_support::reply;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn log_of(n: usize) -> MessageLog {
        let mut log = MessageLog::new();
        for i in 0..n {
            log.push(Exchange::from_response(format!("q{i}"), reply(&format!("a{i}"))));
        }
        log
    }

    fn draw(state: &mut MessageListState, log: &MessageLog, busy: bool, w: u16, h: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(w, h)).unwrap();
        terminal
            .draw(|f| MessageList::new(state, log, busy, 0).render(f, f.area()))
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
    fn test_layout_cache_reusable() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![7; 5];
        cache.update_metadata(5, 80);

        // Same everything -> all reusable
        assert_eq!(cache.reusable_count(5, 80), 5);
        // New exchange appended -> existing heights still valid
        assert_eq!(cache.reusable_count(6, 80), 5);
        // Width changed -> nothing reusable
        assert_eq!(cache.reusable_count(5, 40), 0);
        // Fewer exchanges than cached: a different session's log
        assert_eq!(cache.reusable_count(2, 80), 0);
    }

    #[test]
    fn test_bounds_and_index_at() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![3, 5, 2];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.total_height(), 10);
        assert_eq!(cache.bounds(0), Some((0, 3)));
        assert_eq!(cache.bounds(1), Some((3, 8)));
        assert_eq!(cache.bounds(3), None);
        assert_eq!(cache.index_at(0), Some(0));
        assert_eq!(cache.index_at(3), Some(1));
        assert_eq!(cache.index_at(9), Some(2));
        assert_eq!(cache.index_at(10), None);
    }

    #[test]
    fn test_empty_log_shows_hint() {
        let mut state = MessageListState::new();
        let text = draw(&mut state, &MessageLog::new(), false, 40, 5);
        assert!(text.contains("Ask anything"));
    }

    #[test]
    fn test_busy_shows_thinking_row() {
        let mut state = MessageListState::new();
        let text = draw(&mut state, &log_of(1), true, 40, 20);
        assert!(text.contains("Thinking..."));
    }

    #[test]
    fn test_busy_render_with_saturated_height() {
        let mut log = MessageLog::new();
        for i in 0..3 {
            log.push(Exchange::from_response(
                format!("q{i}"),
                reply(&"a\n\n".repeat(12000)),
            ));
        }
        let mut state = MessageListState::new();
        draw(&mut state, &log, true, 12, 10);

        assert_eq!(state.layout.total_height(), u16::MAX);
        // Following the log keeps the viewport at the bottom of the canvas
        assert_eq!(state.scroll_state.offset().y, u16::MAX - 10);
    }

    #[test]
    fn test_scroll_to_latest_glides_then_pins() {
        let log = log_of(10);
        let mut state = MessageListState::new();
        state.stick_to_bottom = false;
        draw(&mut state, &log, false, 40, 10);
        assert_eq!(state.scroll_state.offset().y, 0);

        state.scroll_to_latest();
        draw(&mut state, &log, false, 40, 10);
        let first_step = state.scroll_state.offset().y;
        let max_y = state.layout.total_height() - 10;
        assert!(first_step > 0 && first_step < max_y, "step={first_step} max={max_y}");
        assert!(state.is_animating());

        for _ in 0..100 {
            if !state.is_animating() {
                break;
            }
            draw(&mut state, &log, false, 40, 10);
        }
        assert!(!state.is_animating());
        assert!(state.stick_to_bottom);
        assert_eq!(state.scroll_state.offset().y, max_y);
    }

    #[test]
    fn test_manual_scroll_interrupts_glide() {
        let log = log_of(10);
        let mut state = MessageListState::new();
        draw(&mut state, &log, false, 40, 10);
        state.scroll_to_latest();
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.is_animating());
        assert!(!state.stick_to_bottom);
    }

    #[test]
    fn test_keyboard_selection_and_feedback() {
        let log = log_of(3);
        let mut state = MessageListState::new();
        draw(&mut state, &log, false, 40, 30);

        // No selection yet: feedback keys do nothing
        assert_eq!(state.handle_event_with(&TuiEvent::InputChar('+'), 3), None);

        state.handle_event_with(&TuiEvent::CursorUp, 3);
        assert_eq!(state.selected_index, Some(2));
        state.handle_event_with(&TuiEvent::CursorUp, 3);
        assert_eq!(state.selected_index, Some(1));
        assert_eq!(
            state.handle_event_with(&TuiEvent::InputChar('-'), 3),
            Some(MessageListEvent::Feedback {
                index: 1,
                kind: FeedbackKind::Down
            })
        );
        state.handle_event_with(&TuiEvent::CursorDown, 3);
        state.handle_event_with(&TuiEvent::CursorDown, 3);
        assert_eq!(state.selected_index, Some(2));
    }

    #[test]
    fn test_click_on_feedback_row() {
        let log = log_of(1);
        let mut state = MessageListState::new();
        state.stick_to_bottom = false;
        draw(&mut state, &log, false, 40, 20);

        let (_, bottom) = state.layout.bounds(0).unwrap();
        let row = bottom - 2;
        assert_eq!(
            state.handle_event_with(&TuiEvent::MouseClick(CONTENT_INSET, row), 1),
            Some(MessageListEvent::Feedback {
                index: 0,
                kind: FeedbackKind::Up
            })
        );
        assert_eq!(
            state.feedback_at(CONTENT_INSET + 5, row),
            Some((0, FeedbackKind::Down))
        );
        // The query row is not an affordance
        assert_eq!(state.feedback_at(CONTENT_INSET, 1), None);
    }
}
