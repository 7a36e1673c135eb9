// Classification client: one low-temperature generation call per batch.

use tracing::debug;

use crate::error::ServiceError;
use crate::llm::{ChatMessage, GenerationOptions, TextGenerator};

/// Default sampling temperature for classification. Low, so reruns mostly
/// agree, but not zero.
pub const DEFAULT_TEMPERATURE: f64 = 0.1;

/// Sends a rendered prompt to the text generator and returns the raw reply.
pub struct Classifier<'a> {
    generator: &'a dyn TextGenerator,
    options: GenerationOptions,
}

impl<'a> Classifier<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self::with_temperature(generator, DEFAULT_TEMPERATURE)
    }

    pub fn with_temperature(generator: &'a dyn TextGenerator, temperature: f64) -> Self {
        Self {
            generator,
            options: GenerationOptions::with_temperature(temperature),
        }
    }

    /// One blocking call. Failures are returned untouched; no retry here.
    pub async fn classify(&self, prompt: &str) -> Result<String, ServiceError> {
        debug!(generator = self.generator.name(), prompt_chars = prompt.len(), "Classifying batch");
        self.generator
            .generate(&[ChatMessage::user(prompt)], &self.options)
            .await
    }
}
