//! Fixed-size chunking with overlap.
//!
//! The simplest strategy: a window of `size` chars sliding with step
//! `size - overlap`. Ignores linguistic boundaries entirely.
//!
//! ## Core Spans
//!
//! Like every strategy, the fixed chunker emits *core* spans, the part of
//! each chunk that no other chunk owns. The overlap injector later prepends
//! `overlap` chars of the previous core, which reproduces the sliding window:
//!
//! ```text
//! size = 10, overlap = 3, step = 7
//!
//! Document: "abcdefghijklmnopqrstuvwxyz"
//!
//! Cores:    [0..10] [10..17] [17..24] [24..26]
//! Windows:  [0..10] [7..17]  [14..24] [21..26]   <- core + 3 chars overlap
//! ```
//!
//! The first core is a full window; every later core is one step wide, so the
//! stored window is exactly `size` chars. The final core may be shorter and
//! is kept as is, never padded or dropped.

use crate::span::{advance, Span};
use crate::{Chunker, Error, Result};

/// Fixed-size chunker with configurable overlap.
///
/// ## Example
///
/// ```rust
/// use quarry::{Chunker, FixedChunker};
///
/// let chunker = FixedChunker::new(100, 20).unwrap();
/// let text = "A".repeat(250);
/// let cores = chunker.split(&text);
///
/// assert_eq!(cores[0].len(), 100);
/// assert_eq!(cores[1].len(), 80); // one step: 100 - 20
/// assert_eq!(cores.last().unwrap().end, 250);
/// ```
#[derive(Debug, Clone)]
pub struct FixedChunker {
    size: usize,
    overlap: usize,
}

impl FixedChunker {
    /// Create a new fixed-size chunker.
    ///
    /// # Arguments
    ///
    /// * `size` - Window size in chars
    /// * `overlap` - Chars shared between adjacent windows
    ///
    /// # Errors
    ///
    /// Returns an error if `size == 0` or `overlap >= size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidChunkSize(size));
        }
        if overlap >= size {
            return Err(Error::OverlapExceedsSize { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    /// Create a chunker with no overlap.
    ///
    /// # Errors
    ///
    /// Returns an error if `size == 0`.
    pub fn no_overlap(size: usize) -> Result<Self> {
        Self::new(size, 0)
    }

    /// The step size between window starts.
    #[must_use]
    fn step(&self) -> usize {
        self.size - self.overlap
    }
}

impl Chunker for FixedChunker {
    fn split(&self, text: &str) -> Vec<Span> {
        // Whitespace-only text has nothing to retrieve
        if text.trim().is_empty() {
            return vec![];
        }

        let step = self.step();
        let mut cores = Vec::with_capacity(self.estimate_chunks(text.len()));
        let mut start = 0;
        let mut width = self.size;

        while start < text.len() {
            let end = advance(text, start, width);
            cores.push(Span::new(start, end));
            start = end;
            width = step;
        }

        cores
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        if text_len == 0 {
            return 0;
        }
        text_len.div_ceil(self.step())
    }
}

/// Cut `span` into consecutive pieces of at most `max_chars` chars.
///
/// This is the fallback every boundary-aware strategy uses for a unit that
/// is too large on its own. The pieces partition the span exactly.
#[must_use]
pub fn split_span(text: &str, span: Span, max_chars: usize) -> Vec<Span> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut start = span.start;

    while start < span.end {
        let end = advance(&text[..span.end], start, max_chars);
        pieces.push(Span::new(start, end));
        start = end;
    }

    pieces
}
