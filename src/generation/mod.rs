//! Text generation
//!
//! `TextGenerator` is the prompt-in/text-out seam used for memo summaries and
//! keyword tags. `GeminiGenerator` talks to the Gemini `generateContent` REST
//! endpoint.

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiGenerator;
pub use prompt::{parse_tags, summary_prompt, tags_prompt};

use crate::error::Result;
use async_trait::async_trait;

/// Prompt-in, plain-text-out generation backend.
///
/// Implementations return `Error::Config` when their credential is missing
/// and `Error::Generation` for any upstream failure or unusable output.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Human-readable backend name (used in logs)
    fn name(&self) -> &str;
}
