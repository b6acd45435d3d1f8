use crate::core::route::Route;
use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{
    HistoryPanel, InputBox, InputBoxState, LandingPage, MessageList, NavBar, ToastStack,
};
use crate::tui::{Focus, TuiState};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;

/// Width of the history sidebar on chat pages.
pub const HISTORY_WIDTH: u16 = 28;
const DISCLAIMER: &str = "LLMs can make mistakes. Check important info.";

pub fn draw_ui(frame: &mut Frame, app: &mut App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let [nav_area, body_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());

    tui.nav_area = nav_area;
    NavBar::new(
        &app.route,
        &app.status_message,
        app.is_busy(),
        spinner_frame,
    )
    .render(frame, nav_area);

    if app.route == Route::Home {
        LandingPage::new(&mut tui.landing).render(frame, body_area);
    } else {
        draw_chat_page(frame, body_area, app, tui, spinner_frame);
    }

    ToastStack::new(&mut tui.toasts).render(frame, body_area);
}

fn draw_chat_page(
    frame: &mut Frame,
    area: Rect,
    app: &mut App,
    tui: &mut TuiState,
    spinner_frame: usize,
) {
    use Constraint::{Length, Min};
    let [history_area, conversation_area] =
        Layout::horizontal([Length(HISTORY_WIDTH), Min(0)]).areas(area);

    let conversations = app.conversations();
    HistoryPanel::new(
        &mut tui.history,
        &conversations,
        &app.route,
        tui.focus == Focus::History,
    )
    .render(frame, history_area);

    let busy = app.is_busy();
    let Some(session) = app.session.as_mut() else {
        return;
    };

    let input_height = InputBoxState::calculate_height(session.draft(), conversation_area.width);
    let [messages_area, input_area, disclaimer_area] =
        Layout::vertical([Min(0), Length(input_height), Length(1)]).areas(conversation_area);

    MessageList::new(
        &mut tui.message_list,
        session.messages(),
        busy,
        spinner_frame,
    )
    .render(frame, messages_area);

    tui.input_area = input_area;
    InputBox::new(
        &mut tui.input_box,
        session.draft_mut(),
        busy,
        tui.focus == Focus::Input,
    )
    .render(frame, input_area);

    frame.render_widget(
        Paragraph::new(DISCLAIMER)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        disclaimer_area,
    );
}
