use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// Something that draws itself into a region of the frame.
///
/// Stateful components are short-lived wrappers: built each frame from a
/// `&mut ...State` kept in `TuiState` plus borrowed props (the session's
/// message log, the current route), then dropped once drawn.
///
/// `render` takes `&mut self` so a component can record what it measured
/// (card heights, hit areas, scroll offsets) back into its state for the
/// next event to use.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Turns low-level terminal input into a component-specific event.
///
/// Returning `None` means the input was consumed (or ignored) locally and
/// the loop has nothing to do.
pub trait EventHandler {
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
