//! HTTP client for the RAG generation service.
//!
//! One round trip per prompt: `POST {base_url}/generate` with
//! `{"prompt": ...}`, answered by a single JSON document. There is no
//! streaming; the service returns the finished answer.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::client::{GenerateError, GenerationClient};
use super::types::{ErrorBody, GenerateRequest, GenerateResponse};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct HttpGenerationClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGenerationClient {
    /// Builds a client for `base_url`. A trailing slash on the URL is ignored.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GenerateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerateError::Network(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/generate", self.base_url)
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, GenerateError> {
        let request = GenerateRequest {
            prompt: prompt.to_string(),
        };

        info!(
            "Generate request: url={}, prompt_len={}",
            self.endpoint(),
            prompt.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Generate response status: {}", status);

        if !status.is_success() {
            // A body that fails to arrive only loses the detail
            let body = response.bytes().await.ok();
            let body = body.as_deref().unwrap_or_default();
            let detail = serde_json::from_slice::<ErrorBody>(body)
                .ok()
                .and_then(|b| b.message());
            warn!(
                "Generate API error: {} - {}",
                status.as_u16(),
                String::from_utf8_lossy(body)
            );
            return Err(GenerateError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let parsed: GenerateResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!("Generate response did not match contract: {}", e);
            GenerateError::Parse(e.to_string())
        })?;

        debug!(
            "Generate response: {} bytes, id={:?}, {} extra fields",
            parsed.response.len(),
            parsed.id,
            parsed.extra.len()
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = HttpGenerationClient::new("http://localhost:8000/", DEFAULT_REQUEST_TIMEOUT)
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint(), "http://localhost:8000/generate");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let client =
            HttpGenerationClient::new("https://rag.example.com/api", DEFAULT_REQUEST_TIMEOUT)
                .unwrap();
        assert_eq!(client.endpoint(), "https://rag.example.com/api/generate");
    }
}
