// Structured response parser: strict decode, then an optional repair pass.
//
// Free-text generation sometimes wraps otherwise valid JSON in markdown
// fences or trailing prose. Rather than patching that by hand, a second
// generator is asked to reformat the text into the exact shape, and its
// answer goes through the same strict decode.

use tracing::{debug, warn};

use crate::error::MalformedResponseError;
use crate::llm::{ChatMessage, GenerationOptions, TextGenerator};
use crate::output::truncate_chars;

use super::models::ThemeMap;
use super::prompt::render_repair_prompt;

/// Decodes raw responses into [`ThemeMap`]s.
pub struct ResponseParser<'a> {
    repair: Option<&'a dyn TextGenerator>,
}

impl<'a> ResponseParser<'a> {
    /// Parser without a repair stage: a failed strict decode is final.
    pub fn strict() -> Self {
        Self { repair: None }
    }

    /// Parser that falls back to asking `generator` to reformat bad output.
    pub fn with_repair(generator: &'a dyn TextGenerator) -> Self {
        Self {
            repair: Some(generator),
        }
    }

    pub fn has_repair(&self) -> bool {
        self.repair.is_some()
    }

    pub async fn parse(&self, raw: &str) -> Result<ThemeMap, MalformedResponseError> {
        let primary_error = match decode_strict(raw) {
            Ok(map) => return Ok(map),
            Err(e) => e,
        };

        let Some(generator) = self.repair else {
            return Err(MalformedResponseError {
                raw: raw.to_string(),
                primary_error,
                repair_error: None,
            });
        };

        warn!(
            error = %primary_error,
            raw_preview = %truncate_chars(raw, 80),
            "Strict decode failed, attempting repair"
        );

        let prompt = render_repair_prompt(raw, &primary_error);
        let repair_error = match generator
            .generate(&[ChatMessage::user(prompt)], &GenerationOptions::with_temperature(0.0))
            .await
        {
            Ok(repaired) => match decode_strict(&repaired) {
                Ok(map) => {
                    debug!(generator = generator.name(), "Repair pass succeeded");
                    return Ok(map);
                }
                Err(e) => e,
            },
            Err(e) => e.to_string(),
        };

        Err(MalformedResponseError {
            raw: raw.to_string(),
            primary_error,
            repair_error: Some(repair_error),
        })
    }
}

/// The whole text must be one JSON object of the expected shape.
pub fn decode_strict(raw: &str) -> Result<ThemeMap, String> {
    serde_json::from_str::<ThemeMap>(raw).map_err(|e| e.to_string())
}
