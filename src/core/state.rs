//! # Application State
//!
//! Core business state for ragchat. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── route: Route                              // page on screen
//! ├── session: Option<Session>                  // Some on chat routes
//! ├── directory: Arc<dyn ConversationDirectory> // sidebar entries
//! ├── client: Arc<dyn GenerationClient>         // generation endpoint
//! └── status_message: String                    // nav bar text
//! ```
//!
//! Session state only changes through `session::update`. The app decides
//! which session exists; navigating away tears the old one down.

use std::sync::Arc;

use log::{debug, info};

use crate::core::exchange::Feedback;
use crate::core::history::{ConversationDirectory, ConversationSummary};
use crate::core::route::Route;
use crate::core::session::{self, Action, Effect, Session};
use crate::generation::GenerationClient;

pub struct App {
    pub route: Route,
    pub session: Option<Session>,
    pub directory: Arc<dyn ConversationDirectory>,
    pub client: Arc<dyn GenerationClient>,
    pub status_message: String,
}

impl App {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        directory: Arc<dyn ConversationDirectory>,
        route: Route,
    ) -> Self {
        let session = session_for(&route);
        Self {
            route,
            session,
            directory,
            client,
            status_message: String::from("Ready"),
        }
    }

    pub fn conversations(&self) -> Vec<ConversationSummary> {
        self.directory.conversations()
    }

    pub fn is_busy(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_busy)
    }

    /// Moves to `route`. Returns false when nothing changed.
    ///
    /// Re-opening the conversation already on screen keeps its session.
    /// Any other move tears the current session down, cancelling its
    /// in-flight request, and starts a fresh one for the new route.
    pub fn navigate(&mut self, route: Route) -> bool {
        if route == self.route && matches!(route, Route::Chat(Some(_)) | Route::Home) {
            debug!("Already at {}", route);
            return false;
        }
        info!("Navigating {} -> {}", self.route, route);

        if let Some(mut old) = self.session.take() {
            session::update(&mut old, Action::Teardown);
        }
        self.session = session_for(&route);
        self.route = route;
        self.status_message = String::from("Ready");
        true
    }

    /// Applies `action` to the current session, if there is one.
    pub fn dispatch(&mut self, action: Action) -> Effect {
        let Some(session) = self.session.as_mut() else {
            debug!("No session on {}, dropping {:?}", self.route, action);
            return Effect::None;
        };
        let effect = session::update(session, action);
        self.status_message = if session.is_busy() {
            String::from("Thinking...")
        } else {
            String::from("Ready")
        };
        effect
    }

    pub fn record_feedback(&self, feedback: &Feedback) {
        info!(
            "Feedback {:?} for exchange {} in {}",
            feedback.kind, feedback.exchange_id, self.route
        );
    }
}

fn session_for(route: &Route) -> Option<Session> {
    match route {
        Route::Home => None,
        Route::Chat(id) => Some(Session::new(id.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::Phase;
    use crate::test_support::{reply, test_app};

    fn submit(app: &mut App, text: &str) -> crate::core::session::RequestTicket {
        app.session.as_mut().unwrap().draft_mut().push_str(text);
        match app.dispatch(Action::Submit) {
            Effect::SpawnRequest(ticket) => ticket,
            other => panic!("Expected SpawnRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_home_has_no_session() {
        let app = test_app(Route::Home);
        assert!(app.session.is_none());
        assert!(!app.is_busy());
        assert_eq!(app.conversations().len(), 9);
    }

    #[test]
    fn test_chat_route_binds_session_to_id() {
        let app = test_app(Route::chat("3"));
        assert_eq!(app.session.as_ref().unwrap().conversation_id(), Some("3"));
    }

    #[test]
    fn test_dispatch_without_session_is_noop() {
        let mut app = test_app(Route::Home);
        assert!(matches!(app.dispatch(Action::Submit), Effect::None));
    }

    #[test]
    fn test_status_follows_busy_state() {
        let mut app = test_app(Route::new_chat());
        let ticket = submit(&mut app, "hello");
        assert!(app.is_busy());
        assert_eq!(app.status_message, "Thinking...");

        app.dispatch(Action::Completed {
            request: ticket.id,
            outcome: Ok(reply("hi there")),
        });
        assert!(!app.is_busy());
        assert_eq!(app.status_message, "Ready");
    }

    #[test]
    fn test_navigate_tears_down_and_starts_fresh() {
        let mut app = test_app(Route::chat("1"));
        let ticket = submit(&mut app, "hello");

        assert!(app.navigate(Route::chat("2")));
        assert!(ticket.cancel.is_cancelled());
        let session = app.session.as_ref().unwrap();
        assert_eq!(session.conversation_id(), Some("2"));
        assert_eq!(session.phase(), Phase::Idle);

        // The old request's completion lands on the new session and is ignored
        let effect = app.dispatch(Action::Completed {
            request: ticket.id,
            outcome: Ok(reply("too late")),
        });
        assert!(matches!(effect, Effect::None));
        assert!(app.session.as_ref().unwrap().messages().is_empty());
    }

    #[test]
    fn test_navigate_to_same_conversation_keeps_session() {
        let mut app = test_app(Route::chat("1"));
        let ticket = submit(&mut app, "hello");
        assert!(!app.navigate(Route::chat("1")));
        assert!(!ticket.cancel.is_cancelled());
        assert!(app.is_busy());
    }

    #[test]
    fn test_new_chat_always_recreates() {
        let mut app = test_app(Route::new_chat());
        let ticket = submit(&mut app, "hello");
        assert!(app.navigate(Route::new_chat()));
        assert!(ticket.cancel.is_cancelled());
        assert!(!app.is_busy());
    }

    #[test]
    fn test_navigate_home_drops_session() {
        let mut app = test_app(Route::chat("1"));
        assert!(app.navigate(Route::Home));
        assert!(app.session.is_none());
        assert!(!app.navigate(Route::Home));
    }
}
