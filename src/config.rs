use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::llm::openai::DEFAULT_BASE_URL;
use crate::llm::PacingPolicy;
use crate::themes::classifier::DEFAULT_TEMPERATURE;

/// Default classification model.
pub const DEFAULT_MODEL: &str = "gpt-4";
/// Default model for the repair pass.
pub const DEFAULT_REPAIR_MODEL: &str = "gpt-4o";
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars only. The .env file is loaded at startup
/// via dotenvy; CLI flags override individual fields afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    /// OpenAI-compatible endpoint (defaults to https://api.openai.com)
    pub openai_base_url: String,
    pub model: String,
    pub repair_model: String,
    pub temperature: f64,
    pub batch_size: usize,
    pub pacing: PacingPolicy,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup. Unset keys get defaults;
    /// set-but-unparseable numeric keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let pause_secs: f64 = parse(&var, "THEME_MAPPER_PAUSE_SECS", 0.0)?;
        let min_interval_ms: u64 = parse(&var, "THEME_MAPPER_MIN_INTERVAL_MS", 0)?;
        let timeout_secs: u64 = parse(&var, "THEME_MAPPER_TIMEOUT_SECS", 120)?;

        if !(pause_secs.is_finite() && pause_secs >= 0.0) {
            return Err(ConfigError::Invalid {
                key: "THEME_MAPPER_PAUSE_SECS",
                value: pause_secs.to_string(),
            });
        }

        Ok(Self {
            openai_api_key: var("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: var("THEME_MAPPER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            repair_model: var("THEME_MAPPER_REPAIR_MODEL")
                .unwrap_or_else(|| DEFAULT_REPAIR_MODEL.to_string()),
            temperature: parse(&var, "THEME_MAPPER_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            batch_size: parse(&var, "THEME_MAPPER_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            pacing: PacingPolicy {
                min_interval: Duration::from_millis(min_interval_ms),
                pause_every: parse(&var, "THEME_MAPPER_PAUSE_EVERY", 0)?,
                pause: Duration::from_secs_f64(pause_secs),
            },
            request_timeout: Duration::from_secs(timeout_secs),
            output_dir: var("THEME_MAPPER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./results")),
        })
    }

    /// Check that the API key is configured.
    /// Call this before any operation that talks to the text-generation service.
    pub fn require_openai(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.is_empty() {
            return Err(ConfigError::MissingCredential("OPENAI_API_KEY"));
        }
        Ok(())
    }

    /// Check the batching settings before any batch runs.
    pub fn require_valid_batching(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(0));
        }
        Ok(())
    }
}

fn parse<T, V>(var: &V, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
