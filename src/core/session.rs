//! # Active Session
//!
//! The controller for the conversation currently on screen. It owns the
//! message log, the draft being typed, and the single in-flight request.
//!
//! Everything that can happen to a session becomes an [`Action`]. The
//! [`update`] function applies it and returns at most one [`Effect`] for
//! the adapter to carry out (spawn the request, show a notification,
//! scroll). No I/O happens here.
//!
//! ```text
//!            Submit (draft non-empty)
//!   ┌──────┐ ─────────────────────────▶ ┌────────────┐
//!   │ Idle │                            │ Submitting │
//!   └──────┘ ◀───────────────────────── └────────────┘
//!             Completed(ok | err | cancelled)
//!             draft cleared, busy released
//! ```
//!
//! Only one request may be in flight. A `Submit` while `Submitting` is
//! ignored outright, which is what keeps exchanges in submission order.

use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::core::exchange::{Exchange, MessageLog};
use crate::generation::{GenerateError, GenerateResponse};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id of one outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    fn next() -> Self {
        RequestId(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Everything the adapter needs to run one request.
///
/// `cancel` is a child of the session's lifetime token, so tearing the
/// session down cancels it too.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    pub id: RequestId,
    pub prompt: String,
    pub cancel: CancellationToken,
}

/// A transient, dismissable message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting(RequestId),
}

#[derive(Debug)]
pub enum Action {
    /// The user asked to send the current draft.
    Submit,
    /// A request finished, one way or another.
    Completed {
        request: RequestId,
        outcome: Result<GenerateResponse, GenerateError>,
    },
    /// The user aborted the in-flight request.
    Cancel,
    /// The view holding this session is going away.
    Teardown,
}

#[derive(Debug)]
pub enum Effect {
    None,
    SpawnRequest(RequestTicket),
    /// The log grew; bring the newest exchange into view.
    ScrollToLatest,
    Notify(Notification),
}

pub struct Session {
    conversation_id: Option<String>,
    messages: MessageLog,
    draft: String,
    in_flight: Option<RequestTicket>,
    lifetime: CancellationToken,
    torn_down: bool,
}

impl Session {
    /// A fresh, idle session. `None` is a conversation that has no id yet.
    pub fn new(conversation_id: Option<String>) -> Self {
        Self {
            conversation_id,
            messages: MessageLog::new(),
            draft: String::new(),
            in_flight: None,
            lifetime: CancellationToken::new(),
            torn_down: false,
        }
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Keystroke-level access for the input component.
    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn phase(&self) -> Phase {
        match &self.in_flight {
            Some(ticket) => Phase::Submitting(ticket.id),
            None => Phase::Idle,
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn finish_attempt(&mut self) {
        self.in_flight = None;
        self.draft.clear();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

pub fn update(session: &mut Session, action: Action) -> Effect {
    if session.torn_down {
        debug!("Ignoring {:?} on torn-down session", action);
        return Effect::None;
    }

    match action {
        Action::Submit => {
            if let Some(ticket) = &session.in_flight {
                debug!("Submit ignored: request {:?} still in flight", ticket.id);
                return Effect::None;
            }
            let ticket = RequestTicket {
                id: RequestId::next(),
                prompt: session.draft.clone(),
                cancel: session.lifetime.child_token(),
            };
            info!(
                "Submitting request {:?} (prompt_len={})",
                ticket.id,
                ticket.prompt.len()
            );
            session.in_flight = Some(ticket.clone());
            Effect::SpawnRequest(ticket)
        }
        Action::Completed { request, outcome } => {
            let Some(ticket) = session.in_flight.take_if(|t| t.id == request) else {
                debug!("Dropping stale completion for {:?}", request);
                return Effect::None;
            };
            session.finish_attempt();
            match outcome {
                Ok(resp) => {
                    let exchange = Exchange::from_response(ticket.prompt, resp);
                    info!(
                        "Request {:?} completed: exchange {} ({} total)",
                        request,
                        exchange.id,
                        session.messages.len() + 1
                    );
                    session.messages.push(exchange);
                    Effect::ScrollToLatest
                }
                Err(err) => {
                    warn!("Request {:?} failed: {}", request, err);
                    match err.user_message() {
                        Some(message) => Effect::Notify(Notification { message }),
                        None => Effect::None,
                    }
                }
            }
        }
        Action::Cancel => {
            if let Some(ticket) = &session.in_flight {
                info!("Cancelling request {:?}", ticket.id);
                ticket.cancel.cancel();
            }
            Effect::None
        }
        Action::Teardown => {
            info!(
                "Tearing down session for conversation {:?}",
                session.conversation_id
            );
            session.lifetime.cancel();
            session.in_flight = None;
            session.torn_down = true;
            Effect::None
        }
    }
}
