//! # Toast Component
//!
//! Transient error notifications stacked in the top-right corner.
//!
//! The core emits `Effect::Notify`; the loop pushes the message here. Each
//! toast disappears after the configured TTL, on Esc (newest first), or
//! when clicked. Expiry lives entirely in this module.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::tui::component::Component;

/// Toasts beyond this many push the oldest out.
const MAX_TOASTS: usize = 4;
const TOAST_WIDTH: u16 = 40;
/// Borders + padding
const HORIZONTAL_OVERHEAD: u16 = 4;

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    created: Instant,
}

/// Visible toasts, oldest first. Persisted in `TuiState`.
#[derive(Debug)]
pub struct ToastState {
    toasts: VecDeque<Toast>,
    ttl: Duration,
    /// Screen rect of each toast from the last render, same order as `toasts`
    hit_areas: Vec<Rect>,
}

impl ToastState {
    pub fn new(ttl: Duration) -> Self {
        Self {
            toasts: VecDeque::new(),
            ttl,
            hit_areas: Vec::new(),
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.push_at(message.into(), Instant::now());
    }

    fn push_at(&mut self, message: String, created: Instant) {
        if self.toasts.len() == MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast { message, created });
        self.hit_areas.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.toasts.iter().map(|t| t.message.as_str())
    }

    /// Dismiss the newest toast. Returns false if there was none.
    pub fn dismiss_top(&mut self) -> bool {
        self.hit_areas.clear();
        self.toasts.pop_back().is_some()
    }

    /// Drop toasts older than the TTL. Returns true if any were removed.
    pub fn expire(&mut self) -> bool {
        self.expire_at(Instant::now())
    }

    fn expire_at(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        let ttl = self.ttl;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.created) < ttl);
        let removed = self.toasts.len() != before;
        if removed {
            self.hit_areas.clear();
        }
        removed
    }

    /// Dismiss the toast under a click. Returns true if one was hit.
    pub fn dismiss_at(&mut self, column: u16, row: u16) -> bool {
        let Some(index) = self
            .hit_areas
            .iter()
            .position(|r| r.contains(Position { x: column, y: row }))
        else {
            return false;
        };
        self.toasts.remove(index);
        self.hit_areas.clear();
        true
    }
}

fn toast_height(message: &str, width: u16) -> u16 {
    let inner = width.saturating_sub(HORIZONTAL_OVERHEAD).max(1);
    let lines = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .line_count(inner) as u16;
    lines + 2
}

/// Overlay renderer. Draw last so toasts sit above everything else.
pub struct ToastStack<'a> {
    pub state: &'a mut ToastState,
}

impl<'a> ToastStack<'a> {
    pub fn new(state: &'a mut ToastState) -> Self {
        Self { state }
    }
}

impl<'a> Component for ToastStack<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = TOAST_WIDTH.min(area.width);
        let x = area.right().saturating_sub(width);
        let mut y = area.y;
        let mut hit_areas = Vec::with_capacity(self.state.toasts.len());

        for toast in &self.state.toasts {
            let height = toast_height(&toast.message, width);
            if y + height > area.bottom() {
                hit_areas.push(Rect::default());
                continue;
            }
            let toast_area = Rect::new(x, y, width, height);
            frame.render_widget(Clear, toast_area);
            let block = Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error ")
                .padding(Padding::horizontal(1));
            frame.render_widget(
                Paragraph::new(toast.message.as_str())
                    .style(Style::default().fg(Color::White))
                    .wrap(Wrap { trim: true })
                    .block(block),
                toast_area,
            );
            hit_areas.push(toast_area);
            y += height;
        }
        self.state.hit_areas = hit_areas;
    }
}
