//! AI-assisted text generation.
//!
//! A thin seam over an external completion provider. The trait keeps
//! handlers testable; the HTTP client is deliberately minimal since prompt
//! construction lives in [`actions::compose`](crate::actions).

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::AssistConfig;
use crate::{CrmError, SecretString};

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns generated text for `prompt`.
    async fn complete(&self, prompt: &str) -> Result<String, CrmError>;
}

/// Calls an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct HttpCompletionClient {
    http: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

impl HttpCompletionClient {
    pub fn new(config: &AssistConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CrmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
            }))
            .send()
            .await
            .map_err(|e| {
                log::error!(target: "atrium::assist", "msg=\"completion request failed\" error=\"{e}\"");
                CrmError::UpstreamError("completion provider unreachable".to_owned())
            })?;

        if !response.status().is_success() {
            log::error!(
                target: "atrium::assist",
                "msg=\"completion provider error\" status={}",
                response.status()
            );
            return Err(CrmError::UpstreamError(
                "completion provider returned an error".to_owned(),
            ));
        }

        let body: CompletionResponse = response.json().await.map_err(|e| {
            log::error!(target: "atrium::assist", "msg=\"completion response malformed\" error=\"{e}\"");
            CrmError::UpstreamError("completion provider response malformed".to_owned())
        })?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CrmError::UpstreamError("completion provider returned no choices".to_owned()))
    }
}

/// Canned responses for tests.
#[derive(Clone, Default)]
pub struct MockCompletionClient {
    pub response: String,
}

impl MockCompletionClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_owned(),
        }
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, _prompt: &str) -> Result<String, CrmError> {
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_returns_canned_text() {
        let client = MockCompletionClient::new("Dear customer, ...");
        let text = client.complete("write a follow-up").await.unwrap();
        assert_eq!(text, "Dear customer, ...");
    }

    #[test]
    fn test_http_client_trims_trailing_slash() {
        let client = HttpCompletionClient::new(&AssistConfig {
            api_key: SecretString::new("key"),
            base_url: "https://api.example.com/v1/".to_owned(),
            model: "test-model".to_owned(),
        });
        assert_eq!(client.base_url, "https://api.example.com/v1");
    }
}
