//! Paragraph-based chunking.
//!
//! Packs whole paragraphs into chunks while the next one still fits.
//!
//! ```text
//! max = 100
//!
//! [P1: 40]  [P2: 35]  [P3: 90]  [P4: 260]
//!  \________/          |         |
//!   chunk 0 (77 incl.  chunk 1   cut at sentences, then any sentence
//!   the blank line)              still over 100 cut at 100 chars
//! ```
//!
//! A paragraph longer than the bound is first regrouped at sentence
//! boundaries; only a single sentence that is itself too long falls back to
//! the fixed-size cut. The overlap injected in front of each chunk is snapped
//! to a sentence start, so the repeated context is the trailing sentence(s)
//! of the previous chunk.

use crate::segment::paragraph_spans_bounded;
use crate::span::{pack, Span};
use crate::{Chunker, Error, Result};

/// Paragraph chunker.
///
/// ## Example
///
/// ```rust
/// use quarry::{Chunker, ParagraphChunker};
///
/// let chunker = ParagraphChunker::new(40).unwrap();
/// let text = "Short one.\n\nShort two.\n\nA third paragraph, too long to join.";
/// let cores = chunker.split(text);
///
/// assert_eq!(cores.len(), 2);
/// assert_eq!(cores[0].slice(text), "Short one.\n\nShort two.");
/// ```
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    max_chars: usize,
}

impl ParagraphChunker {
    /// Create a paragraph chunker with cores of at most `max_chars` chars.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_chars == 0`.
    pub fn new(max_chars: usize) -> Result<Self> {
        if max_chars == 0 {
            return Err(Error::InvalidChunkSize(max_chars));
        }
        Ok(Self { max_chars })
    }
}

impl Chunker for ParagraphChunker {
    fn split(&self, text: &str) -> Vec<Span> {
        let units = paragraph_spans_bounded(text, self.max_chars);
        pack(text, &units, self.max_chars)
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        text_len.div_ceil(self.max_chars).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packs_small_paragraphs() {
        let chunker = ParagraphChunker::new(100).unwrap();
        let text = "One.\n\nTwo.\n\nThree.";
        let cores = chunker.split(text);
        assert_eq!(cores, vec![Span::new(0, text.len())]);
    }

    #[test]
    fn test_long_paragraph_cut_at_sentences() {
        let chunker = ParagraphChunker::new(30).unwrap();
        let text = "The first sentence is here. The second sentence follows.";
        let cores = chunker.split(text);
        assert_eq!(cores.len(), 2);
        assert_eq!(cores[0].slice(text), "The first sentence is here.");
        assert_eq!(cores[1].slice(text), "The second sentence follows.");
    }

    #[test]
    fn test_giant_sentence_falls_back_to_fixed() {
        let chunker = ParagraphChunker::new(10).unwrap();
        let text = "x".repeat(35);
        let cores = chunker.split(&text);
        assert_eq!(cores.len(), 4);
        assert!(cores.iter().all(|c| c.char_len(&text) <= 10));
    }

    #[test]
    fn test_whitespace_only() {
        let chunker = ParagraphChunker::new(10).unwrap();
        assert!(chunker.split("\n\n   \n").is_empty());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert_eq!(
            ParagraphChunker::new(0).unwrap_err(),
            Error::InvalidChunkSize(0)
        );
    }
}
