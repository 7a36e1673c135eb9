// Theme Mapper: incremental theme consolidation for article summaries.
//
// This is the library root. Each module corresponds to a stage of the
// clustering pipeline; `themes::engine` is the only stateful one.

pub mod articles;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod themes;
