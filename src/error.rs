// Error taxonomy for the consolidation pipeline.
//
// Each component gets a small closed enum. Structural and config errors are
// raised before any batch runs; per-batch failures are wrapped with the
// batch index so a failed run can be diagnosed without re-running it.

use thiserror::Error;

/// Input table problems. Raised by the article set builder and loader.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("row {row}: missing article id")]
    MissingId { row: usize },

    #[error("row {row}: missing summary")]
    MissingSummary { row: usize },

    #[error("duplicate article id {id:?}")]
    DuplicateId { id: String },

    #[error("unsupported input format: {0}")]
    Format(String),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode input: {0}")]
    Decode(String),
}

/// Invalid run configuration.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),

    #[error("{0} not set. Add it to your .env file.")]
    MissingCredential(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// A failed call to the external text-generation service.
///
/// The message is whatever the provider said; it is surfaced as-is.
#[derive(Error, Debug, Clone)]
#[error("text generation failed{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
pub struct ServiceError {
    pub message: String,
    /// HTTP status, when the provider answered at all
    pub status: Option<u16>,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

/// Both the strict decode and the repair pass failed.
#[derive(Error, Debug, Clone)]
#[error("malformed classification response: {primary_error}{}\n--- raw response ---\n{raw}",
    .repair_error.as_ref().map(|e| format!("; repair failed: {e}")).unwrap_or_default())]
pub struct MalformedResponseError {
    /// The original, unrepaired response text
    pub raw: String,
    pub primary_error: String,
    /// None when the parser has no repair stage
    pub repair_error: Option<String>,
}

/// Why a single batch could not be consolidated.
#[derive(Error, Debug)]
pub enum BatchFailure {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Malformed(#[from] MalformedResponseError),

    #[error("response left {} article(s) unassigned: {}", .missing.len(), .missing.join(", "))]
    IncompleteAssignment { missing: Vec<String> },
}

/// A batch failure, tagged with its 1-based batch index.
#[derive(Error, Debug)]
#[error("error processing batch {batch_index}: {cause}")]
pub struct BatchProcessingError {
    pub batch_index: usize,
    #[source]
    pub cause: BatchFailure,
}

/// What the consolidation engine surfaces to its caller.
#[derive(Error, Debug)]
pub enum ConsolidationError {
    #[error(transparent)]
    Batch(#[from] BatchProcessingError),

    #[error("run cancelled after {completed_batches} batch(es)")]
    Cancelled { completed_batches: usize },
}

impl ConsolidationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConsolidationError::Cancelled { .. })
    }

    /// Index of the failing batch, if the run failed on one.
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            ConsolidationError::Batch(e) => Some(e.batch_index),
            ConsolidationError::Cancelled { .. } => None,
        }
    }
}

/// Any error that ends a clustering run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Consolidation(#[from] ConsolidationError),
}
