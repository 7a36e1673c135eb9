// Theme consolidation: batching, prompting, parsing, merging, reshaping.
//
// The engine is the only stateful piece. Everything else here is a pure
// function or a thin wrapper around a TextGenerator.

pub mod batcher;
pub mod classifier;
pub mod engine;
pub mod models;
pub mod parser;
pub mod prompt;
pub mod reshape;

pub use engine::{Consolidation, ConsolidationEngine, ConsolidationState, RunPhase};
pub use models::{GlobalAssignment, ThemeGroups, ThemeMap, ThemeVocabulary};
