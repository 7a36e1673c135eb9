// Text generation: trait-based abstraction for swappable chat providers.
//
// TextGenerator defines the interface. OpenAiGenerator implements it over
// HTTP; the Pacer spaces out calls so long runs stay under provider limits.

pub mod openai;
pub mod pacing;
pub mod traits;

pub use pacing::{Pacer, PacingPolicy};
pub use traits::{ChatMessage, GenerationOptions, TextGenerator};
