//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard and mouse events into core actions, and carries out
//! the effects the core asks for (spawning requests, toasts, scrolling).
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw to avoid unnecessary work:
//!
//! - **Animating** (request in flight, scroll glide, visible toasts): draws
//!   every ~80ms so spinners move and toasts expire on time.
//! - **Idle**: sleeps up to 500ms, only redraws on events, finished
//!   requests or terminal resize.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::layout::{Position, Rect};

use crate::core::config::ResolvedConfig;
use crate::core::exchange::Feedback;
use crate::core::history::SeedDirectory;
use crate::core::route::Route;
use crate::core::session::{Action, Effect, RequestTicket};
use crate::core::state::App;
use crate::generation::{GenerationClient, HttpGenerationClient, generate_cancellable};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    HistoryEvent, HistoryPanelState, InputBox, InputBoxState, InputEvent, LandingEvent,
    LandingState, MessageListEvent, MessageListState, NavBar, ToastState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const ANIMATION_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(500);

/// Which chat-page component receives keystrokes. Tab cycles through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Messages,
    History,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Input => Focus::Messages,
            Focus::Messages => Focus::History,
            Focus::History => Focus::Input,
        }
    }
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    // Persistent component states
    pub message_list: MessageListState,
    pub input_box: InputBoxState,
    pub history: HistoryPanelState,
    pub landing: LandingState,
    pub toasts: ToastState,
    pub focus: Focus,
    // Areas from the last draw, for click routing
    pub nav_area: Rect,
    pub input_area: Rect,
}

impl TuiState {
    pub fn new(toast_ttl: Duration) -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBoxState::new(),
            history: HistoryPanelState::new(),
            landing: LandingState::new(),
            toasts: ToastState::new(toast_ttl),
            focus: Focus::Input, // User expects to type immediately
            nav_area: Rect::default(),
            input_area: Rect::default(),
        }
    }

    fn is_animating(&self, app: &App) -> bool {
        app.is_busy() || self.message_list.is_animating() || !self.toasts.is_empty()
    }

    /// Per-conversation view state starts over on every route change.
    fn reset_conversation_view(&mut self) {
        self.message_list = MessageListState::new();
        self.input_box = InputBoxState::new();
        self.focus = Focus::Input;
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol allows Shift+Enter detection; terminals
        // that don't support it ignore the sequence
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!(
            "Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)"
        );
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Build the generation client from a resolved config.
pub fn build_client(config: &ResolvedConfig) -> std::io::Result<Arc<dyn GenerationClient>> {
    let client = HttpGenerationClient::new(config.base_url.clone(), config.request_timeout)
        .map_err(|e| {
            warn!("Failed to build generation client: {}", e);
            std::io::Error::other(e.to_string())
        })?;
    info!("Generation endpoint: {}", client.base_url());
    Ok(Arc::new(client))
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let client = build_client(&config)?;
    let directory = Arc::new(SeedDirectory::new(config.conversations.clone()));
    let mut app = App::new(client, directory, config.initial_route.clone());
    let mut tui = TuiState::new(config.toast_ttl);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for completions from background tasks
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        if tui.toasts.expire() {
            needs_redraw = true;
        }
        let animating = tui.is_animating(&app);
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &mut app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating { ANIMATION_TICK } else { IDLE_TICK };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        if first_event.is_some() {
            needs_redraw = true;
        }
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(&mut app, &mut tui, event, &tx) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }

        // Completions from request tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = app.dispatch(action);
            apply_effect(&app, &mut tui, effect, &tx);
        }
    }

    info!("Shutting down on {}", app.route);
    // Dropping the session cancels whatever is still in flight
    app.session = None;

    ratatui::restore();
    Ok(())
}

/// Routes one terminal event. Returns true when the app should quit.
fn handle_event(
    app: &mut App,
    tui: &mut TuiState,
    event: TuiEvent,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match event {
        // Resize just needs a redraw
        TuiEvent::Resize => return false,
        TuiEvent::ForceQuit => {
            info!("Quit requested");
            return true;
        }
        TuiEvent::NewConversation => {
            navigate(app, tui, Route::new_chat());
            return false;
        }
        TuiEvent::MouseClick(column, row) => {
            // Overlays first
            if tui.toasts.dismiss_at(column, row) {
                return false;
            }
            if NavBar::home_hit(tui.nav_area, column, row) {
                navigate(app, tui, Route::Home);
                return false;
            }
        }
        _ => {}
    }

    if app.route == Route::Home {
        if matches!(event, TuiEvent::Escape) {
            tui.toasts.dismiss_top();
        } else if let Some(LandingEvent::StartChat) = tui.landing.handle_event(&event) {
            navigate(app, tui, Route::new_chat());
        }
        return false;
    }

    handle_chat_event(app, tui, event, tx);
    false
}

fn handle_chat_event(app: &mut App, tui: &mut TuiState, event: TuiEvent, tx: &mpsc::Sender<Action>) {
    match event {
        // Esc: cancel the request, else dismiss a toast, else back to the input
        TuiEvent::Escape => {
            if app.is_busy() {
                app.dispatch(Action::Cancel);
            } else if !tui.toasts.dismiss_top() {
                tui.focus = Focus::Input;
                tui.message_list.selected_index = None;
            }
            return;
        }
        TuiEvent::FocusNext => {
            tui.focus = tui.focus.next();
            if tui.focus != Focus::Messages {
                tui.message_list.selected_index = None;
            }
            return;
        }
        // Scroll events go to the message list regardless of focus
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(&event);
            return;
        }
        TuiEvent::MouseClick(column, row) => {
            handle_click(app, tui, column, row);
            return;
        }
        _ => {}
    }

    match tui.focus {
        Focus::Input => {
            let busy = app.is_busy();
            let Some(session) = app.session.as_mut() else {
                return;
            };
            let input_event =
                InputBox::new(&mut tui.input_box, session.draft_mut(), busy, true).handle_event(&event);
            if input_event == Some(InputEvent::Submit) {
                let effect = app.dispatch(Action::Submit);
                apply_effect(app, tui, effect, tx);
            }
        }
        Focus::Messages => match event {
            // Typing auto-switches to the input box and forwards the event
            TuiEvent::InputChar(c) if c != '+' && c != '-' => {
                tui.focus = Focus::Input;
                tui.message_list.selected_index = None;
                handle_chat_event(app, tui, event, tx);
            }
            TuiEvent::Paste(_) => {
                tui.focus = Focus::Input;
                tui.message_list.selected_index = None;
                handle_chat_event(app, tui, event, tx);
            }
            TuiEvent::Submit => {
                tui.focus = Focus::Input;
                tui.message_list.selected_index = None;
            }
            _ => {
                let count = message_count(app);
                if let Some(list_event) = tui.message_list.handle_event_with(&event, count) {
                    apply_message_list_event(app, list_event);
                }
            }
        },
        Focus::History => {
            let conversations = app.conversations();
            if let Some(history_event) = tui.history.handle_event_with(&event, &conversations) {
                apply_history_event(app, tui, history_event);
            }
        }
    }
}

fn handle_click(app: &mut App, tui: &mut TuiState, column: u16, row: u16) {
    let click = TuiEvent::MouseClick(column, row);

    if tui.history.contains(column, row) {
        tui.focus = Focus::History;
        tui.message_list.selected_index = None;
        let conversations = app.conversations();
        if let Some(history_event) = tui.history.handle_event_with(&click, &conversations) {
            apply_history_event(app, tui, history_event);
        }
        return;
    }

    let count = message_count(app);
    if let Some(list_event) = tui.message_list.handle_event_with(&click, count) {
        tui.focus = Focus::Messages;
        apply_message_list_event(app, list_event);
        return;
    }

    if tui.input_area.contains(Position { x: column, y: row }) {
        tui.focus = Focus::Input;
        tui.message_list.selected_index = None;
    }
}

fn message_count(app: &App) -> usize {
    app.session.as_ref().map_or(0, |s| s.messages().len())
}

fn apply_message_list_event(app: &App, event: MessageListEvent) {
    match event {
        MessageListEvent::Feedback { index, kind } => {
            let Some(exchange) = app.session.as_ref().and_then(|s| s.messages().get(index)) else {
                return;
            };
            app.record_feedback(&Feedback {
                exchange_id: exchange.id.clone(),
                kind,
            });
        }
    }
}

fn apply_history_event(app: &mut App, tui: &mut TuiState, event: HistoryEvent) {
    match event {
        HistoryEvent::Open(id) => navigate(app, tui, Route::chat(id)),
        HistoryEvent::NewConversation => navigate(app, tui, Route::new_chat()),
    }
}

fn navigate(app: &mut App, tui: &mut TuiState, route: Route) {
    if app.navigate(route) {
        tui.reset_conversation_view();
    }
}

/// Carry out what the core asked for.
fn apply_effect(app: &App, tui: &mut TuiState, effect: Effect, tx: &mpsc::Sender<Action>) {
    match effect {
        Effect::None => {}
        Effect::SpawnRequest(ticket) => spawn_request(app.client.clone(), ticket, tx.clone()),
        Effect::ScrollToLatest => tui.message_list.scroll_to_latest(),
        Effect::Notify(notification) => {
            debug!("Showing toast: {}", notification.message);
            tui.toasts.push(notification.message);
        }
    }
}

fn spawn_request(client: Arc<dyn GenerationClient>, ticket: RequestTicket, tx: mpsc::Sender<Action>) {
    info!("Spawning request {:?} via {}", ticket.id, client.name());
    tokio::spawn(async move {
        let started = Instant::now();
        let outcome = generate_cancellable(client.as_ref(), &ticket.prompt, &ticket.cancel).await;
        debug!(
            "Request {:?} finished in {}ms (ok={})",
            ticket.id,
            started.elapsed().as_millis(),
            outcome.is_ok()
        );
        if tx
            .send(Action::Completed {
                request: ticket.id,
                outcome,
            })
            .is_err()
        {
            warn!(
                "Failed to send completion for {:?}: receiver dropped",
                ticket.id
            );
        }
    });
}
