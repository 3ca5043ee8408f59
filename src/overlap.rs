//! Overlap injection shared by every strategy.
//!
//! Strategies produce *core* spans. The injector then decides, for each core
//! after the first, where its stored chunk starts: a little before the core,
//! inside the previous core.
//!
//! ```text
//! prev core              gap  core
//! |......The fox ran.|   __   |It stopped.|
//!        ^
//!        start = snapped(prev.end - (overlap - gap))
//!
//! stored chunk = text[start..core.end]
//! ```
//!
//! ## Budget
//!
//! The gap between two cores counts toward `overlap`, so a chunk is never
//! longer than `core + overlap` chars. The start never moves before the
//! previous core's start, which rules out a chunk reaching into the one two
//! places back.
//!
//! ## Snapping
//!
//! The raw candidate is moved *forward* (shrinking the overlap) to the first
//! boundary the mode accepts. Sentence mode falls back to word mode when no
//! sentence starts inside the window; word mode gives up (no overlap) rather
//! than cut a word. Word boundaries follow UAX #29, so text without spaces
//! still overlaps.

use unicode_segmentation::UnicodeSegmentation;

use crate::segment;
use crate::span::{char_len, retreat, Span};

/// Where an injected overlap may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlapBoundary {
    /// Any char boundary; reproduces a plain sliding window.
    Character,
    /// The start of a word.
    Word,
    /// The start of a sentence, else the start of a word.
    Sentence,
}

/// Computes chunk starts from core spans.
///
/// ## Example
///
/// ```rust
/// use quarry::{OverlapBoundary, OverlapInjector, Span};
///
/// let text = "One two three. Four five six.";
/// let cores = [Span::new(0, 14), Span::new(15, 29)];
///
/// let injector = OverlapInjector::new(8, OverlapBoundary::Word);
/// let starts = injector.starts(text, &cores);
///
/// assert_eq!(starts[0], 0);
/// assert_eq!(&text[starts[1]..cores[1].end], "three. Four five six.");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapInjector {
    overlap: usize,
    boundary: OverlapBoundary,
}

impl OverlapInjector {
    /// An injector borrowing up to `overlap` chars.
    #[must_use]
    pub const fn new(overlap: usize, boundary: OverlapBoundary) -> Self {
        Self { overlap, boundary }
    }

    /// The overlap budget in chars.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// The boundary mode.
    #[must_use]
    pub const fn boundary(&self) -> OverlapBoundary {
        self.boundary
    }

    /// The stored start offset for each core.
    ///
    /// `starts[i] <= cores[i].start`, and for `i > 0`,
    /// `starts[i] >= cores[i - 1].start`.
    #[must_use]
    pub fn starts(&self, text: &str, cores: &[Span]) -> Vec<usize> {
        let sentence_starts: Vec<usize> = if self.overlap > 0
            && cores.len() > 1
            && self.boundary == OverlapBoundary::Sentence
        {
            segment::sentences_by_paragraph(text)
                .iter()
                .map(|s| s.start)
                .collect()
        } else {
            Vec::new()
        };

        let mut starts = Vec::with_capacity(cores.len());
        for (i, core) in cores.iter().enumerate() {
            let start = match i.checked_sub(1).map(|p| cores[p]) {
                Some(prev) if self.overlap > 0 => {
                    self.start_for(text, prev, *core, &sentence_starts)
                }
                _ => core.start,
            };
            starts.push(start);
        }
        starts
    }

    fn start_for(&self, text: &str, prev: Span, core: Span, sentence_starts: &[usize]) -> usize {
        let gap = char_len(&text[prev.end..core.start]);
        if self.overlap <= gap {
            return core.start;
        }

        let budget = (self.overlap - gap).min(prev.char_len(text));
        let candidate = retreat(text, prev.start, prev.end, budget);
        if candidate >= prev.end {
            return core.start;
        }

        let snapped = match self.boundary {
            OverlapBoundary::Character => Some(candidate),
            OverlapBoundary::Word => word_start_from(text, prev, candidate),
            OverlapBoundary::Sentence => sentence_start_from(sentence_starts, prev, candidate)
                .or_else(|| word_start_from(text, prev, candidate)),
        };

        snapped.unwrap_or(core.start)
    }
}

/// First sentence start in `[candidate, prev.end)`.
fn sentence_start_from(sentence_starts: &[usize], prev: Span, candidate: usize) -> Option<usize> {
    let i = sentence_starts.partition_point(|&s| s < candidate);
    sentence_starts
        .get(i)
        .copied()
        .filter(|&s| s < prev.end)
}

/// First word start in `[candidate, prev.end)`.
///
/// Word boundaries are UAX #29 boundaries of the previous core, so scripts
/// written without spaces, such as Japanese, still have them. A word
/// is a segment holding an alphanumeric char.
fn word_start_from(text: &str, prev: Span, candidate: usize) -> Option<usize> {
    prev.slice(text)
        .split_word_bound_indices()
        .map(|(i, segment)| (prev.start + i, segment))
        .find(|&(start, segment)| {
            start >= candidate && segment.chars().any(char::is_alphanumeric)
        })
        .map(|(start, _)| start)
}
