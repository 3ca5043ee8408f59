//! Automatic strategy selection.
//!
//! ```text
//! headings, or avg paragraph > 1500 chars   -> Intelligent
//! >= 2 paragraphs and avg sentence <= 400   -> Paragraph
//! otherwise                                 -> Semantic
//! ```
//!
//! Fixed-size is never selected: it only wins on speed, and a caller who
//! wants it asks for it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::segment::{paragraph_spans, sentences_in};
use crate::span::char_len;
use crate::structure::has_headings;
use crate::Strategy;

/// Average paragraph length above which a document is treated as
/// structured, in chars.
pub const LARGE_PARAGRAPH_CHARS: f64 = 1500.0;

/// Average sentence length above which paragraphs are not well formed, in
/// chars.
pub const MAX_WELL_FORMED_SENTENCE_CHARS: f64 = 400.0;

/// The measurements `select_strategy` decides from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSignals {
    /// At least one heading line was detected.
    pub has_headings: bool,
    /// Number of blank-line separated paragraphs.
    pub paragraph_count: usize,
    /// Mean paragraph length in chars.
    pub avg_paragraph_chars: f64,
    /// Mean sentence length in chars.
    pub avg_sentence_chars: f64,
    /// Length of the text in chars.
    pub total_chars: usize,
}

impl DocumentSignals {
    /// Measure `text`.
    ///
    /// ```rust
    /// use quarry::DocumentSignals;
    ///
    /// let signals = DocumentSignals::analyze("One. Two.\n\nThree.");
    /// assert_eq!(signals.paragraph_count, 2);
    /// assert!(!signals.has_headings);
    /// ```
    #[must_use]
    pub fn analyze(text: &str) -> Self {
        let paragraphs = paragraph_spans(text);
        let paragraph_chars: usize = paragraphs.iter().map(|p| p.char_len(text)).sum();

        let mut sentence_count = 0usize;
        let mut sentence_chars = 0usize;
        for paragraph in &paragraphs {
            for sentence in sentences_in(text, *paragraph) {
                sentence_count += 1;
                sentence_chars += sentence.char_len(text);
            }
        }

        Self {
            has_headings: has_headings(text),
            paragraph_count: paragraphs.len(),
            avg_paragraph_chars: mean(paragraph_chars, paragraphs.len()),
            avg_sentence_chars: mean(sentence_chars, sentence_count),
            total_chars: char_len(text),
        }
    }
}

fn mean(total: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Pick a strategy for a document. Never returns `Auto` or `FixedSize`.
///
/// ```rust
/// use quarry::{select_strategy, DocumentSignals, Strategy};
///
/// let signals = DocumentSignals::analyze("# Title\n\nBody text follows here.");
/// assert_eq!(select_strategy(&signals), Strategy::Intelligent);
///
/// let signals = DocumentSignals::analyze("First part.\n\nSecond part.");
/// assert_eq!(select_strategy(&signals), Strategy::Paragraph);
/// ```
#[must_use]
pub fn select_strategy(signals: &DocumentSignals) -> Strategy {
    let strategy = if signals.has_headings || signals.avg_paragraph_chars > LARGE_PARAGRAPH_CHARS {
        Strategy::Intelligent
    } else if signals.paragraph_count >= 2
        && signals.avg_sentence_chars <= MAX_WELL_FORMED_SENTENCE_CHARS
    {
        Strategy::Paragraph
    } else {
        Strategy::Semantic
    };

    debug!(
        %strategy,
        has_headings = signals.has_headings,
        paragraphs = signals.paragraph_count,
        avg_paragraph_chars = signals.avg_paragraph_chars,
        avg_sentence_chars = signals.avg_sentence_chars,
        "selected chunking strategy"
    );
    strategy
}
