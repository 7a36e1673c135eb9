// Text generator trait: the swap-ready seam in front of the chat API.
//
// The consolidation engine and the repair pass only ever see this trait.
// The default implementation talks to an OpenAI-compatible endpoint; tests
// plug in scripted generators instead.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ServiceError;

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling settings for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

impl GenerationOptions {
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature,
            max_tokens: None,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::with_temperature(0.0)
    }
}

/// Trait for generating text from a list of messages. Async because every
/// real provider is an HTTP API.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short provider/model label for logs.
    fn name(&self) -> &str;

    /// Generate a completion. No retries: a failed call is returned as-is.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, ServiceError>;
}
