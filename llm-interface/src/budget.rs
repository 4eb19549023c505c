use crate::chunker::{chunk_text, ContentChunk, SAFE_CHUNK_SIZE};
use crate::LlmProvider;
use soapbox_core::{ConfigError, CoreError, LlmError};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Limits for the budgeted map-then-reduce pass.
#[derive(Debug, Clone)]
pub struct ReduceConfig {
    /// Chunk size (in chars) for the initial split.
    pub max_chunk_size: usize,
    /// Estimated tokens allowed per window.
    pub tokens_per_minute: u64,
    /// Length of one budget window.
    pub window: Duration,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: SAFE_CHUNK_SIZE,
            tokens_per_minute: 6_000,
            window: Duration::from_secs(60),
        }
    }
}

/// Summarizes arbitrarily large `text` without blowing the model's rate
/// limit: split into chunks, call the model once per chunk while staying
/// under the per-window token budget (blocking until the window elapses when
/// necessary), then synthesize the partial results with one final call.
///
/// The structure is deterministic: chunk order is preserved and the same
/// input produces the same sequence of calls, even though model outputs are
/// not. Window pressure never surfaces as an error; only a chunk that cannot
/// fit the budget at any split size does.
pub async fn summarize_with_budget<P>(
    provider: &P,
    system_prompt: &str,
    text: &str,
    config: &ReduceConfig,
) -> Result<String, CoreError>
where
    P: LlmProvider + ?Sized,
{
    if text.is_empty() {
        return Err(CoreError::MissingState {
            what: "source text to summarize".to_string(),
        });
    }
    if config.max_chunk_size == 0 {
        return Err(CoreError::Config(ConfigError::InvalidValue {
            field: "max_chunk_size".to_string(),
            value: "0".to_string(),
        }));
    }

    let mut work: VecDeque<(ContentChunk, usize)> = chunk_text(text, config.max_chunk_size)
        .into_iter()
        .map(|chunk| (chunk, config.max_chunk_size))
        .collect();

    let mut partials: Vec<String> = Vec::new();
    let mut tokens_used_this_window: u64 = 0;
    let mut window_start = Instant::now();

    while let Some((chunk, split_size)) = work.pop_front() {
        // A chunk that alone exceeds a whole window's budget is re-split at
        // half the prior size until it fits.
        if chunk.estimated_tokens > config.tokens_per_minute {
            if split_size <= 1 {
                return Err(CoreError::Llm(LlmError::WindowOverflow {
                    estimated_tokens: chunk.estimated_tokens,
                    budget: config.tokens_per_minute,
                }));
            }
            let half = (split_size / 2).max(1);
            debug!(
                estimated_tokens = chunk.estimated_tokens,
                half, "Re-splitting oversized chunk"
            );
            for sub in chunk_text(&chunk.text, half).into_iter().rev() {
                work.push_front((sub, half));
            }
            continue;
        }

        // Block until the current window elapses when this chunk would not fit.
        if tokens_used_this_window + chunk.estimated_tokens > config.tokens_per_minute {
            let elapsed = window_start.elapsed();
            if elapsed < config.window {
                let wait = config.window - elapsed;
                info!(?wait, "Token budget exhausted, waiting for next window");
                sleep(wait).await;
            }
            tokens_used_this_window = 0;
            window_start = Instant::now();
        }

        tokens_used_this_window += chunk.estimated_tokens;
        let partial = provider.complete(system_prompt, &chunk.text).await?;
        partials.push(partial);
    }

    // Multiple partials get one synthesis call; a single partial passes
    // through unchanged.
    if partials.len() > 1 {
        debug!(partials = partials.len(), "Synthesizing partial results");
        let joined = partials.join("\n\n");
        provider.complete(system_prompt, &joined).await
    } else {
        partials.pop().ok_or_else(|| CoreError::Internal {
            message: "chunking produced no work for non-empty text".to_string(),
        })
    }
}
