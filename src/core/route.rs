//! # Routes
//!
//! The page the user is looking at, expressed as a path:
//!
//! | Route                 | Path          |
//! |-----------------------|---------------|
//! | `Home`                | `/`           |
//! | `Chat(None)`          | `/chat`       |
//! | `Chat(Some("3"))`     | `/chat/3`     |
//!
//! Components receive the current route as a prop and derive what they need
//! from it; nothing reads it from a global.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    /// A conversation view. `None` is a new conversation with no id yet.
    Chat(Option<String>),
}

impl Route {
    pub fn chat(id: impl Into<String>) -> Self {
        Route::Chat(Some(id.into()))
    }

    pub fn new_chat() -> Self {
        Route::Chat(None)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Chat(None) => "/chat".to_string(),
            Route::Chat(Some(id)) => format!("/chat/{id}"),
        }
    }

    /// Parses a path. A trailing slash is ignored; unknown paths give `None`.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_end_matches('/');
        let mut segments = trimmed.split('/');
        // Paths are absolute: first segment is the empty string before '/'
        if segments.next() != Some("") && !trimmed.is_empty() {
            return None;
        }
        match (segments.next(), segments.next(), segments.next()) {
            (None, _, _) => Some(Route::Home),
            (Some("chat"), None, _) => Some(Route::Chat(None)),
            (Some("chat"), Some(id), None) if !id.is_empty() => Some(Route::chat(id)),
            _ => None,
        }
    }

    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            Route::Chat(Some(id)) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Whether the history entry for `conversation_id` is the one on screen.
pub fn is_active(conversation_id: &str, current: &Route) -> bool {
    current.conversation_id() == Some(conversation_id)
}
