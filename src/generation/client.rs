use std::fmt;

use async_trait::async_trait;
use log::info;
use tokio_util::sync::CancellationToken;

use super::types::GenerateResponse;

/// Generic message for transport failures; the underlying cause goes to the log.
pub const NETWORK_ERROR_MESSAGE: &str = "Could not reach the generation service";
/// Shown when a 2xx body does not match the contract.
pub const PARSE_ERROR_MESSAGE: &str = "Unexpected response from server";

/// Errors that can occur while asking the endpoint for a generation.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateError {
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Endpoint returned a non-2xx status, optionally with a `detail` message.
    Api { status: u16, detail: Option<String> },
    /// 2xx status but the body could not be read as a generation.
    Parse(String),
    /// The request was cancelled before it completed.
    Cancelled,
}

impl GenerateError {
    /// Text for the user-facing notification. `None` means stay silent.
    pub fn user_message(&self) -> Option<String> {
        match self {
            GenerateError::Network(_) => Some(NETWORK_ERROR_MESSAGE.to_string()),
            GenerateError::Api {
                detail: Some(detail),
                ..
            } => Some(detail.clone()),
            GenerateError::Api { status, detail: None } => Some(format!("Server error: {status}")),
            GenerateError::Parse(_) => Some(PARSE_ERROR_MESSAGE.to_string()),
            GenerateError::Cancelled => None,
        }
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Network(msg) => write!(f, "network error: {msg}"),
            GenerateError::Api { status, detail } => match detail {
                Some(detail) => write!(f, "API error (HTTP {status}): {detail}"),
                None => write!(f, "API error (HTTP {status})"),
            },
            GenerateError::Parse(msg) => write!(f, "parse error: {msg}"),
            GenerateError::Cancelled => write!(f, "request was cancelled"),
        }
    }
}

impl std::error::Error for GenerateError {}

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Returns the name of the client, for logging.
    fn name(&self) -> &str;

    /// Sends one prompt and waits for the whole response.
    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, GenerateError>;
}

/// Runs `generate` until it finishes or `cancel` fires, whichever comes first.
///
/// A cancelled request is dropped mid-flight, so the HTTP connection is
/// closed rather than left to finish in the background.
pub async fn generate_cancellable(
    client: &dyn GenerationClient,
    prompt: &str,
    cancel: &CancellationToken,
) -> Result<GenerateResponse, GenerateError> {
    if cancel.is_cancelled() {
        return Err(GenerateError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!("{}: request cancelled before completion", client.name());
            Err(GenerateError::Cancelled)
        }
        result = client.generate(prompt) => result,
    }
}
