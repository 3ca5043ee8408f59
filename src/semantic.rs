//! Sentence-based ("semantic") chunking.
//!
//! Accumulates whole sentences into a chunk until the next one would not
//! fit, then starts a new chunk at that sentence.
//!
//! ## Paragraphs Are Hard Breaks
//!
//! Sentences are packed within a paragraph, never across a blank line. A
//! blank line is the strongest topic signal plain text carries, and it keeps
//! a multi-paragraph document from ever collapsing into one chunk:
//!
//! ```text
//! max = 60
//!
//! P1: [S1 S2 S3]        -> [S1 S2] [S3]     (S3 would overflow)
//! P2: [S4 S5]           -> [S4 S5]          (never joined with S3)
//! ```
//!
//! A paragraph without terminators is one sentence; if it exceeds the bound
//! it is cut with the fixed-size algorithm, so the loop always advances.
//!
//! Use [`crate::ParagraphChunker`] to merge short paragraphs instead.

use crate::segment::{paragraph_spans, sentences_in};
use crate::span::{pack, Span};
use crate::{Chunker, Error, Result};

/// Sentence-packing chunker.
///
/// ## Example
///
/// ```rust
/// use quarry::{Chunker, SemanticChunker};
///
/// let chunker = SemanticChunker::new(40).unwrap();
/// let text = "First sentence. Second sentence. Third sentence.";
/// let cores = chunker.split(text);
///
/// assert_eq!(cores.len(), 2);
/// assert_eq!(cores[0].slice(text), "First sentence. Second sentence.");
/// assert_eq!(cores[1].slice(text), "Third sentence.");
/// ```
#[derive(Debug, Clone)]
pub struct SemanticChunker {
    max_chars: usize,
}

impl SemanticChunker {
    /// Create a sentence chunker with cores of at most `max_chars` chars.
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

impl Chunker for SemanticChunker {
    fn split(&self, text: &str) -> Vec<Span> {
        paragraph_spans(text)
            .into_iter()
            .flat_map(|paragraph| pack(text, &sentences_in(text, paragraph), self.max_chars))
            .collect()
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        text_len.div_ceil(self.max_chars).max(1)
    }
}
