use async_trait::async_trait;
use soapbox_core::CoreError;

pub mod budget;
pub mod chunker;
pub mod provider;

pub use budget::{summarize_with_budget, ReduceConfig};
pub use chunker::{chunk_text, estimate_tokens, ContentChunk, CHARS_PER_TOKEN, SAFE_CHUNK_SIZE};
pub use provider::ChatCompletionProvider;

/// Opaque language-model call: prompt text in, generated text out, can fail.
///
/// The scheduling layer never interprets the output; anything beyond this
/// signature (model choice, prompt templates, parsing) belongs to callers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, CoreError>;
}
