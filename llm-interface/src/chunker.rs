/// Chunk size that keeps one call comfortably inside a model context
/// window (~3,000 tokens at 4 chars per token).
pub const SAFE_CHUNK_SIZE: usize = 12_000;

/// Rough token estimate used for budget accounting.
pub const CHARS_PER_TOKEN: usize = 4;

/// One fixed-size segment of a larger text, with its estimated token cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    pub text: String,
    pub estimated_tokens: u64,
}

impl ContentChunk {
    pub fn new(text: String) -> Self {
        let estimated_tokens = estimate_tokens(&text);
        Self {
            text,
            estimated_tokens,
        }
    }
}

/// Estimated token cost of `text`, rounded up.
pub fn estimate_tokens(text: &str) -> u64 {
    let chars = text.chars().count() as u64;
    chars.div_ceil(CHARS_PER_TOKEN as u64)
}

/// Splits `text` into consecutive chunks of at most `max_chunk_size`
/// characters. Non-overlapping and order-preserving: concatenating the
/// chunks reproduces the input exactly. Splits happen on char boundaries,
/// so a chunk never cuts a multi-byte character in half.
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<ContentChunk> {
    if text.is_empty() || max_chunk_size == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;

    for ch in text.chars() {
        current.push(ch);
        current_chars += 1;
        if current_chars == max_chunk_size {
            chunks.push(ContentChunk::new(std::mem::take(&mut current)));
            current_chars = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(ContentChunk::new(current));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenation_reproduces_input() {
        let text = "abcdefghij".repeat(137);
        let chunks = chunk_text(&text, 100);

        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn every_chunk_respects_the_size_bound() {
        let text = "x".repeat(1050);
        let chunks = chunk_text(&text, 100);

        assert_eq!(chunks.len(), 11);
        for chunk in &chunks[..10] {
            assert_eq!(chunk.text.chars().count(), 100);
        }
        // Final remainder chunk carries what is left.
        assert_eq!(chunks[10].text.chars().count(), 50);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "héllo wörld 🦀".repeat(50);
        let chunks = chunk_text(&text, 7);

        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt, text);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 7);
        }
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 100).is_empty());
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(12_000)), 3_000);
    }

    #[test]
    fn chunk_carries_its_estimate() {
        let chunks = chunk_text(&"y".repeat(10), 8);
        assert_eq!(chunks[0].estimated_tokens, 2);
        assert_eq!(chunks[1].estimated_tokens, 1);
    }
}
