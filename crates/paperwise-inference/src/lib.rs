//! # paperwise-inference
//!
//! LLM collaborators for the recommendation engine.
//!
//! - [`OllamaBackend`]: JSON generation through the Ollama chat API
//! - [`LlmRanker`]: re-scores and explains the papers of one category
//! - [`LlmSemanticAnnotator`]: methodology, complexity and domains per paper
//!
//! Both collaborators are optional; the engine falls back to its
//! deterministic output when they fail.

use async_trait::async_trait;
use paperwise_core::Result;

pub mod annotator;
pub mod json;
#[cfg(feature = "ollama")]
pub mod ollama;
pub mod ranker;

#[cfg(test)]
mod test_support;

pub use annotator::LlmSemanticAnnotator;
pub use json::{parse_json_lenient, strip_code_fence};
#[cfg(feature = "ollama")]
pub use ollama::OllamaBackend;
pub use ranker::LlmRanker;

/// Text generation constrained to JSON output.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a JSON document for `prompt` under a system instruction.
    async fn generate_json_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}
