// OpenAI-compatible chat completions client.
//
// Works against api.openai.com or any server speaking the same
// `/v1/chat/completions` protocol (set OPENAI_BASE_URL). One request per
// call; retry policy, if any, belongs to whoever wraps the run.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{ChatMessage, GenerationOptions, TextGenerator};
use crate::error::ServiceError;

/// Default public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Text generator backed by an OpenAI-compatible HTTP API.
pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    label: String,
}

impl OpenAiGenerator {
    /// Create a generator for `model` at `base_url`.
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .user_agent(concat!("theme-mapper/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::new(format!("failed to build HTTP client: {e}")))?;

        let model = model.into();
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            label: format!("openai:{model}"),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, ServiceError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        debug!(model = %self.model, messages = messages.len(), "Chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::new(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::with_status(body, status.as_u16()));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::new(format!("failed to parse completion response: {e}")))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ServiceError::new("completion response had no content"))?;

        debug!(
            model = %self.model,
            chars = content.len(),
            total_tokens = ?completion.usage.map(|u| u.total_tokens),
            "Chat completion received"
        );

        Ok(content)
    }
}

// --- Chat completions request/response types ---

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u64,
}
