//! Character-window text splitter
//!
//! Splits long text into chunks of roughly `chunk_size` characters, cutting
//! at natural boundaries (`.` or newline) so a chunk never ends mid-word.
//! Adjacent chunks overlap by about `chunk_overlap` characters; the overlap
//! is approximate because the next window is moved to a word start.
//!
//! All lengths are counted in `char`s, not bytes.

/// Splitter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitterConfig {
    /// Target chunk length in characters
    pub chunk_size: usize,
    /// Characters shared between adjacent chunks
    pub chunk_overlap: usize,
}

/// Splits text at natural boundaries with overlap.
///
/// # Example
///
/// ```
/// use investigation_core::text_splitter::{SplitterConfig, TextSplitter};
///
/// let splitter = TextSplitter::new(SplitterConfig { chunk_size: 10, chunk_overlap: 3 });
/// let chunks = splitter.split_text("First part. Second part. Third section.");
/// assert_eq!(chunks, vec!["First part.", "Second part.", "Third section."]);
/// ```
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(config: SplitterConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }

    /// Split `content` into trimmed, non-empty chunks.
    ///
    /// Content no longer than `chunk_size` is returned as a single,
    /// untouched chunk.
    pub fn split_text(&self, content: &str) -> Vec<String> {
        let chars: Vec<char> = content.chars().collect();
        let len = chars.len();

        if len <= self.chunk_size {
            return vec![content.to_string()];
        }

        let mut segments = Vec::new();
        let mut start = 0;
        let mut prev_end = 0;

        while start < len {
            let end = self.find_cut(&chars, start, prev_end);

            let segment: String = chars[start..end].iter().collect();
            let trimmed = segment.trim();
            if !trimmed.is_empty() {
                segments.push(trimmed.to_string());
            }

            if end >= len {
                break;
            }

            start = self.next_start(&chars, start, end);
            prev_end = end;
        }

        segments
    }

    /// Exclusive end index of the chunk starting at `start`.
    ///
    /// Prefers the last boundary inside the window; without one, extends to
    /// the next boundary after it (or the end of the text). The cut always
    /// lands beyond `prev_end` so a chunk is never contained in its
    /// predecessor.
    fn find_cut(&self, chars: &[char], start: usize, prev_end: usize) -> usize {
        let len = chars.len();
        let window_end = start + self.chunk_size;

        if window_end >= len {
            return len;
        }

        let lower = (start + 1).max(prev_end);
        if lower <= window_end {
            if let Some(pos) = (lower..=window_end).rev().find(|&i| is_boundary(chars[i])) {
                return pos + 1;
            }
        }

        ((window_end + 1).max(lower)..len)
            .find(|&i| is_boundary(chars[i]))
            .map(|pos| pos + 1)
            .unwrap_or(len)
    }

    /// Start of the next window: `end - overlap`, moved forward to a word
    /// start when it lands mid-word, capped at `end`, and strictly past
    /// `start`.
    fn next_start(&self, chars: &[char], start: usize, end: usize) -> usize {
        let mut next = end.saturating_sub(self.chunk_overlap);

        if next > 0 && !chars[next - 1].is_whitespace() {
            while next < end && !chars[next].is_whitespace() {
                next += 1;
            }
        }
        while next < end && chars[next].is_whitespace() {
            next += 1;
        }

        if next <= start {
            end
        } else {
            next
        }
    }
}

fn is_boundary(c: char) -> bool {
    c == '.' || c == '\n'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(chunk_size: usize, chunk_overlap: usize) -> TextSplitter {
        TextSplitter::new(SplitterConfig {
            chunk_size,
            chunk_overlap,
        })
    }

    #[test]
    fn test_short_content_is_not_split() {
        let result = splitter(10, 3).split_text("Short text");
        assert_eq!(result, vec!["Short text"]);
    }

    #[test]
    fn test_short_content_is_not_trimmed() {
        let result = splitter(50, 0).split_text("  padded  ");
        assert_eq!(result, vec!["  padded  "]);
    }

    #[test]
    fn test_splits_at_natural_breaks() {
        let result = splitter(10, 3).split_text("First part. Second part. Third section.");

        assert!(result.contains(&"First part.".to_string()));
        assert!(result.contains(&"Second part.".to_string()));
        assert!(result.contains(&"Third section.".to_string()));
        for chunk in &result {
            assert!(!chunk.trim().is_empty());
            assert!(chunk.ends_with('.') || chunk.ends_with('\n'), "chunk {:?}", chunk);
        }
    }

    #[test]
    fn test_newline_boundaries() {
        let result = splitter(10, 3).split_text("Line one\nLine two\nLine three");
        assert_eq!(result, vec!["Line one", "Line two", "Line three"]);
    }

    #[test]
    fn test_overlap_carries_preceding_words() {
        let result = splitter(14, 8).split_text("one two three. four five six.");

        assert_eq!(result[0], "one two three.");
        assert!(result[1].starts_with("three."));
        assert!(result.last().map(|c| c.ends_with("six.")).unwrap_or(false));
    }

    #[test]
    fn test_terminates_with_large_overlap() {
        let text = "a. b. c. d. e. f. g. h. i. j. k. l. m. n. o. p.";
        let result = splitter(4, 10).split_text(text);
        assert!(!result.is_empty());
        assert!(result.last().map(|c| c.ends_with("p.")).unwrap_or(false));
    }

    #[test]
    fn test_text_without_boundaries_is_one_chunk() {
        let text = "no natural breaks anywhere in this text at all";
        let result = splitter(10, 0).split_text(text);
        assert_eq!(result, vec![text]);
    }

    #[test]
    fn test_multibyte_characters() {
        let text = "Größe ist gut. Über alles schön. Ende.";
        let result = splitter(15, 2).split_text(text);
        assert!(result.iter().all(|c| c.ends_with('.')));
        assert!(result.iter().any(|c| c.contains("Über")));
    }

    #[test]
    fn test_split_is_pure() {
        let s = splitter(12, 4);
        let text = "Alpha beta. Gamma delta. Epsilon zeta. Eta theta.";
        assert_eq!(s.split_text(text), s.split_text(text));
    }
}
