// Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use theme_mapper::articles::Article;
use theme_mapper::error::ServiceError;
use theme_mapper::llm::{ChatMessage, GenerationOptions, TextGenerator};

/// Replays canned responses in order and records every prompt it saw.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, ServiceError>>>,
    prompts: Mutex<Vec<String>>,
    started: Mutex<Vec<Instant>>,
    latency: Duration,
}

impl ScriptedGenerator {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(responses.into_iter().map(|r| Ok(r.into())))
    }

    pub fn with_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ServiceError>>,
    {
        Self {
            responses: Mutex::new(results.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            started: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
        }
    }

    /// Make every call take `latency` (tokio time) before it answers.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// When each call started, in call order.
    pub fn started(&self) -> Vec<Instant> {
        self.started.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        messages: &[ChatMessage],
        _options: &GenerationOptions,
    ) -> Result<String, ServiceError> {
        let prompt = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);
        self.started.lock().unwrap().push(Instant::now());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::new("script exhausted")))
    }
}

/// Articles with ids "0".."n-1".
pub fn articles(n: usize) -> Vec<Article> {
    (0..n)
        .map(|i| Article::new(i.to_string(), format!("Summary of article {i}"), Some(format!("https://example.org/{i}"))))
        .collect()
}

/// Build a theme-map JSON response.
pub fn response(pairs: &[(&str, &str)], new_themes: &[&str]) -> String {
    let doc_to_theme: serde_json::Map<String, serde_json::Value> = pairs
        .iter()
        .map(|(id, theme)| (id.to_string(), serde_json::Value::String(theme.to_string())))
        .collect();
    serde_json::json!({
        "doc_to_theme": doc_to_theme,
        "new_theme_names": new_themes,
    })
    .to_string()
}

/// The `existing_themes` section of the real-input part of a prompt.
pub fn existing_themes_section(prompt: &str) -> &str {
    let real = prompt
        .split("NOW PROCESS THE REAL INPUT")
        .nth(1)
        .expect("prompt has a real-input section");
    let start = real.find("existing_themes:").expect("existing_themes present");
    let end = real.find("new_articles:").expect("new_articles present");
    &real[start..end]
}
