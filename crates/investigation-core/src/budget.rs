//! Prompt budgeting
//!
//! Trims text to fit a token budget, preferring to cut at sentence or line
//! boundaries via [`TextSplitter`].

use std::sync::Arc;

use crate::text_splitter::{SplitterConfig, TextSplitter};
use crate::tokenization::TokenCounter;

/// Characters assumed per excess token when estimating the cut position.
/// A tunable heuristic, not a property of any tokenizer.
pub const CHARS_PER_TOKEN_ESTIMATE: usize = 3;

/// Texts whose estimated target falls below this many characters are hard
/// truncated to it instead of being segmented.
pub const MIN_SEGMENT_SIZE: usize = 140;

#[derive(Clone)]
pub struct PromptBudgeter {
    counter: Arc<dyn TokenCounter>,
}

impl PromptBudgeter {
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        Self { counter }
    }

    pub fn counter(&self) -> &dyn TokenCounter {
        self.counter.as_ref()
    }

    /// Trim `content` until it counts at most `max_tokens` tokens.
    ///
    /// Content already within budget is returned unchanged, so applying this
    /// twice gives the same result as applying it once.
    pub fn optimize_prompt_length(&self, content: &str, max_tokens: usize) -> String {
        let mut current = content.to_string();

        loop {
            if current.is_empty() {
                return current;
            }

            let token_count = self.counter.count_text(&current);
            if token_count <= max_tokens {
                return current;
            }

            let excess_tokens = token_count - max_tokens;
            let length = current.chars().count();
            let target_length =
                length.saturating_sub(excess_tokens.saturating_mul(CHARS_PER_TOKEN_ESTIMATE));

            if target_length < MIN_SEGMENT_SIZE {
                return take_chars(&current, MIN_SEGMENT_SIZE);
            }

            let splitter = TextSplitter::new(SplitterConfig {
                chunk_size: target_length,
                chunk_overlap: 0,
            });
            let first_chunk = splitter
                .split_text(&current)
                .into_iter()
                .next()
                .unwrap_or_default();

            // No natural break made progress: fall back to a hard cut.
            current = if first_chunk.chars().count() == length {
                take_chars(&current, target_length)
            } else {
                first_chunk
            };
        }
    }
}

fn take_chars(text: &str, count: usize) -> String {
    text.chars().take(count).collect()
}
