//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Map;

use crate::core::history::SeedDirectory;
use crate::core::route::Route;
use crate::core::session::Session;
use crate::core::state::App;
use crate::generation::{GenerateError, GenerateResponse, GenerationClient};

/// Builds a bare success body with the given answer.
pub fn reply(text: &str) -> GenerateResponse {
    GenerateResponse {
        response: text.to_string(),
        id: None,
        extra: Map::new(),
    }
}

/// A client that answers from a script and records every prompt it receives.
/// When the script runs dry it keeps repeating `fallback`.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<GenerateResponse, GenerateError>>>,
    fallback: Result<GenerateResponse, GenerateError>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Result<GenerateResponse, GenerateError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Err(GenerateError::Network("script exhausted".to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(reply(text)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, GenerateError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// A client whose requests never complete. Used to exercise cancellation.
pub struct PendingClient;

#[async_trait]
impl GenerationClient for PendingClient {
    fn name(&self) -> &str {
        "pending"
    }

    async fn generate(&self, _prompt: &str) -> Result<GenerateResponse, GenerateError> {
        std::future::pending().await
    }
}

/// A fresh session bound to a new, unnamed conversation.
pub fn test_session() -> Session {
    Session::new(None)
}

/// An app on `route` with the seed directory and a client that always answers "ok".
pub fn test_app(route: Route) -> App {
    App::new(
        Arc::new(ScriptedClient::replying("ok")),
        Arc::new(SeedDirectory::default()),
        route,
    )
}
