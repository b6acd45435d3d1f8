use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::exchange::{Exchange, FeedbackKind};
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;
/// Distance from the card's left edge to its first content column.
pub const CONTENT_INSET: u16 = 1 + CONTENT_PAD_H;

const QUERY_COLOR: Color = Color::Green;
const RESPONSE_COLOR: Color = Color::Blue;

const FEEDBACK_UP: &str = "[+]";
const FEEDBACK_DOWN: &str = "[-]";

/// A stateless component that renders one query/response pair as a card.
///
/// ```text
/// ╭ you ───────────────────────────╮
/// │ What is retrieval?             │
/// │ ────────────────────────────── │
/// │ Retrieval is the step that...  │
/// │                                │
/// │ [+] [-]                        │
/// ╰────────────────────────────────╯
/// ```
///
/// Query and response both go through the markdown renderer. The last
/// content row holds the feedback affordances; see [`Message::feedback_at`].
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub exchange: &'a Exchange,
    /// Whether this card is selected in the message list
    pub is_selected: bool,
}

impl<'a> Message<'a> {
    pub fn new(exchange: &'a Exchange, is_selected: bool) -> Self {
        Self {
            exchange,
            is_selected,
        }
    }

    /// Height of the card at `width`, borders included.
    ///
    /// Measured with the same `Paragraph` + `Wrap` that `render` uses, so
    /// the two never disagree.
    pub fn calculate_height(exchange: &Exchange, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Degenerate case: terminal too narrow for borders + padding.
            return 1;
        }
        let lines = body_paragraph(exchange, content_width).line_count(content_width);
        u16::try_from(lines)
            .unwrap_or(u16::MAX)
            .saturating_add(VERTICAL_OVERHEAD)
    }

    /// Which affordance sits at `column`, counted from the first content column.
    pub fn feedback_at(column: u16) -> Option<FeedbackKind> {
        let up = FEEDBACK_UP.len() as u16;
        let down_start = up + 1;
        let down_end = down_start + FEEDBACK_DOWN.len() as u16;
        if column < up {
            Some(FeedbackKind::Up)
        } else if (down_start..down_end).contains(&column) {
            Some(FeedbackKind::Down)
        } else {
            None
        }
    }
}

fn body_paragraph(exchange: &Exchange, content_width: u16) -> Paragraph<'static> {
    let mut text: Text<'static> = markdown::render(exchange.query.trim(), QUERY_COLOR);
    text.lines.push(Line::from(Span::styled(
        "─".repeat(content_width as usize),
        Style::default().fg(Color::DarkGray),
    )));
    text.lines
        .extend(markdown::render(exchange.response.trim(), RESPONSE_COLOR).lines);
    text.lines.push(Line::default());

    let affordance = Style::default().fg(Color::DarkGray);
    text.lines.push(Line::from(vec![
        Span::styled(FEEDBACK_UP, affordance),
        Span::raw(" "),
        Span::styled(FEEDBACK_DOWN, affordance),
    ]));

    Paragraph::new(text).wrap(Wrap { trim: false })
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.is_selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(QUERY_COLOR).add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title(" you ")
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);
        body_paragraph(self.exchange, inner_area.width).render(inner_area, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
