//! Byte spans over a document and the character arithmetic around them.
//!
//! ## Offsets vs Sizes
//!
//! Every offset in quarry is a byte offset into the UTF-8 text, always on a
//! `char` boundary, so `&text[span.start..span.end]` never panics. Every
//! *size* (chunk size, overlap, line length) is counted in `char`s:
//!
//! ```text
//! text:  "a日本b"
//! bytes:  0 1  4  7 8
//! chars:  0 1  2  3 4
//!
//! Span { start: 1, end: 7 } -> "日本", len_bytes = 6, char_len = 2
//! ```

use serde::{Deserialize, Serialize};

use crate::fixed;

/// A half-open byte range `[start, end)` into a document.
///
/// Sentence and paragraph spans produced by the segmenter are ordered by
/// `start` and never overlap.
///
/// ```rust
/// use quarry::Span;
///
/// let text = "Hello, world!";
/// let span = Span::new(7, 12);
/// assert_eq!(span.slice(text), "world");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset where the span starts.
    pub start: usize,
    /// Byte offset where the span ends (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The text covered by this span.
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    /// Length in `char`s.
    #[must_use]
    pub fn char_len(&self, text: &str) -> usize {
        char_len(self.slice(text))
    }

    /// Shrink the span so it starts and ends on non-whitespace.
    ///
    /// Returns `None` when the span holds only whitespace.
    #[must_use]
    pub fn trim(&self, text: &str) -> Option<Self> {
        let slice = self.slice(text);
        let trimmed_start = slice.trim_start();
        if trimmed_start.is_empty() {
            return None;
        }
        let start = self.start + (slice.len() - trimmed_start.len());
        let end = start + trimmed_start.trim_end().len();
        Some(Self::new(start, end))
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// Number of `char`s in `s`.
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset reached by moving `n` chars forward from `from`, clamped to
/// the end of `text`.
#[must_use]
pub fn advance(text: &str, from: usize, n: usize) -> usize {
    if n == 0 {
        return from;
    }
    text[from..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| from + i)
        .unwrap_or(text.len())
}

/// Byte offset reached by moving `n` chars backward from `from`, clamped to
/// `floor`.
#[must_use]
pub fn retreat(text: &str, floor: usize, from: usize, n: usize) -> usize {
    if n == 0 {
        return from;
    }
    text[floor..from]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| floor + i)
        .unwrap_or(floor)
}

/// Greedily pack ordered units into spans of at most `max_chars` chars.
///
/// Units are merged together with the text between them while the merged
/// span fits. A unit that alone exceeds `max_chars` is cut with the
/// fixed-size algorithm so no span silently exceeds the bound.
///
/// ```text
/// units: [A:40] [B:30] [C:50] [D:200]    max = 100
///
/// A+B fits (72 incl. gap)   -> [A..B]
/// +C would be 124           -> flush, start [C]
/// D alone is 200            -> flush [C], fixed-split D into 100 + 100
/// ```
#[must_use]
pub fn pack(text: &str, units: &[Span], max_chars: usize) -> Vec<Span> {
    let mut packed = Vec::new();
    let mut current: Option<(Span, usize)> = None;

    for unit in units {
        let unit_len = unit.char_len(text);

        if unit_len > max_chars {
            if let Some((span, _)) = current.take() {
                packed.push(span);
            }
            packed.extend(fixed::split_span(text, *unit, max_chars));
            continue;
        }

        current = match current {
            None => Some((*unit, unit_len)),
            Some((span, len)) => {
                let extension = char_len(&text[span.end..unit.end]);
                if len + extension <= max_chars {
                    Some((Span::new(span.start, unit.end), len + extension))
                } else {
                    packed.push(span);
                    Some((*unit, unit_len))
                }
            }
        };
    }

    if let Some((span, _)) = current {
        packed.push(span);
    }

    packed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim() {
        let text = "  hello  ";
        assert_eq!(Span::new(0, text.len()).trim(text), Some(Span::new(2, 7)));
        assert_eq!(Span::new(0, 2).trim(text), None);
    }

    #[test]
    fn test_advance_and_retreat_multibyte() {
        let text = "a日本b";
        assert_eq!(advance(text, 0, 2), 4);
        assert_eq!(advance(text, 0, 10), text.len());
        assert_eq!(retreat(text, 0, text.len(), 2), 4);
        assert_eq!(retreat(text, 0, text.len(), 10), 0);
        assert_eq!(retreat(text, 1, text.len(), 10), 1);
    }

    #[test]
    fn test_pack_merges_until_full() {
        let text = "aaaa bbbb cccc";
        let units = [Span::new(0, 4), Span::new(5, 9), Span::new(10, 14)];
        let packed = pack(text, &units, 9);
        assert_eq!(packed, vec![Span::new(0, 9), Span::new(10, 14)]);
    }

    #[test]
    fn test_pack_splits_oversized_unit() {
        let text = "ab abcdefghij";
        let units = [Span::new(0, 2), Span::new(3, 13)];
        let packed = pack(text, &units, 4);
        assert_eq!(packed[0], Span::new(0, 2));
        assert!(packed[1..].iter().all(|s| s.char_len(text) <= 4));
        assert_eq!(packed.last().map(|s| s.end), Some(13));
    }

    #[test]
    fn test_pack_empty() {
        assert!(pack("", &[], 10).is_empty());
    }
}
