//! # Exchanges
//!
//! One query/response pair, and the append-only log that holds them.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::generation::GenerateResponse;

/// A completed query/response pair.
///
/// Built once from a successful generation and never modified. Fields the
/// endpoint sent beyond `response` and `id` are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exchange {
    pub id: String,
    pub query: String,
    pub response: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Exchange {
    /// Pairs the submitted text with the endpoint's answer.
    /// Uses the server-assigned id when there is one, otherwise a fresh UUID.
    pub fn from_response(query: String, resp: GenerateResponse) -> Self {
        Self {
            id: resp.id.unwrap_or_else(new_exchange_id),
            query,
            response: resp.response,
            extra: resp.extra,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Up,
    Down,
}

/// A thumbs up/down on one exchange. Only logged for now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub exchange_id: String,
    pub kind: FeedbackKind,
}

/// Generate a local UUID v4 exchange id.
pub fn new_exchange_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Ordered exchanges of one conversation, oldest first.
///
/// Only the owning session can append; everyone else gets shared references.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MessageLog {
    items: Vec<Exchange>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, exchange: Exchange) {
        self.items.push(exchange);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last(&self) -> Option<&Exchange> {
        self.items.last()
    }

    pub fn get(&self, index: usize) -> Option<&Exchange> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Exchange> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Exchange;
    type IntoIter = std::slice::Iter<'a, Exchange>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
