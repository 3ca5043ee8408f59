//! Sentence and paragraph segmentation.
//!
//! ## Locate, Don't Split
//!
//! Sentence boundaries are found by *locating* each terminator and slicing
//! between consecutive boundary positions. Splitting on the terminator
//! characters instead loses the offsets and, when terminators are sparse
//! (bullet lists, code, tables), silently turns the whole document into one
//! "sentence". Here a text with no terminators at all is still exactly one
//! span, and everything downstream handles that case.
//!
//! A terminator ends a sentence when it is followed by whitespace or the end
//! of the text. Full-width terminators (`。！？`) end a sentence regardless,
//! since CJK text does not put spaces between sentences.
//!
//! ```text
//! "Dr. Smith arrived. He sat down."
//!     ^             ^            ^
//!     |             boundary     boundary
//!     abbreviation, skipped
//! ```
//!
//! ## Paragraphs
//!
//! Paragraphs are runs of lines separated by one or more blank lines. A
//! paragraph longer than a caller-supplied threshold is further cut at
//! sentence boundaries by [`paragraph_spans_bounded`].

use crate::span::Span;

/// Characters that can end a sentence.
pub const TERMINATORS: &[char] = &['.', '!', '?', '。', '！', '？'];

/// Closing punctuation absorbed into the sentence it terminates.
const CLOSERS: &[char] = &['"', '\'', '”', '’', ')', ']', '」', '』'];

/// Tokens that end with a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "inc", "ltd", "co", "corp",
    "fig", "figs", "no", "vol", "al", "approx", "dept", "est", "cf", "ca", "pp", "jan", "feb",
    "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Whether `c` can end a sentence.
#[must_use]
pub fn is_terminator(c: char) -> bool {
    TERMINATORS.contains(&c)
}

fn is_full_width(c: char) -> bool {
    matches!(c, '。' | '！' | '？')
}

/// Whether the text before a period ends in an abbreviation-like token.
fn is_abbreviation(preceding: &str) -> bool {
    let token = preceding
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric());

    if token.is_empty() {
        return false;
    }

    // Initials ("J. Smith") and dotted forms ("e.g", "U.S")
    let mut chars = token.chars();
    if let (Some(first), None) = (chars.next(), chars.next()) {
        return first.is_uppercase();
    }
    if token.contains('.') {
        return true;
    }

    let lower = token.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}

/// Sentence spans over the whole text.
///
/// Spans are trimmed of surrounding whitespace. A text without terminators
/// yields a single span; whitespace-only text yields none.
///
/// ```rust
/// use quarry::segment::sentence_spans;
///
/// let text = "Hello world. How are you? I am fine.";
/// let spans = sentence_spans(text);
/// assert_eq!(spans.len(), 3);
/// assert_eq!(spans[1].slice(text), "How are you?");
/// ```
#[must_use]
pub fn sentence_spans(text: &str) -> Vec<Span> {
    sentences_in(text, Span::new(0, text.len()))
}

/// Sentence spans inside `within`, with offsets into `text`.
#[must_use]
pub fn sentences_in(text: &str, within: Span) -> Vec<Span> {
    let region = within.slice(text);
    let mut spans = Vec::new();
    let mut sentence_start = within.start;
    let mut chars = region.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }

        let position = within.start + i;
        let mut end = position + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if is_terminator(next) || CLOSERS.contains(&next) {
                end = within.start + j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let at_break = text[end..within.end]
            .chars()
            .next()
            .map_or(true, char::is_whitespace);
        if !at_break && !is_full_width(c) {
            continue;
        }
        if c == '.' && is_abbreviation(&text[sentence_start..position]) {
            continue;
        }

        if let Some(span) = Span::new(sentence_start, end).trim(text) {
            spans.push(span);
        }
        sentence_start = end;
    }

    if let Some(span) = Span::new(sentence_start, within.end).trim(text) {
        spans.push(span);
    }

    spans
}

/// Paragraph spans: runs of non-blank lines separated by blank lines.
///
/// ```rust
/// use quarry::segment::paragraph_spans;
///
/// let text = "First para.\nStill first.\n\n\nSecond para.";
/// let spans = paragraph_spans(text);
/// assert_eq!(spans.len(), 2);
/// assert_eq!(spans[1].slice(text), "Second para.");
/// ```
#[must_use]
pub fn paragraph_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut paragraph_start: Option<usize> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(start) = paragraph_start.take() {
                spans.extend(Span::new(start, offset).trim(text));
            }
        } else if paragraph_start.is_none() {
            paragraph_start = Some(offset);
        }
        offset += line.len();
    }

    if let Some(start) = paragraph_start {
        spans.extend(Span::new(start, text.len()).trim(text));
    }

    spans
}

/// Paragraph spans, with any paragraph longer than `max_chars` chars cut
/// into groups of whole sentences.
///
/// A single sentence longer than `max_chars` stays whole; callers that need
/// a hard bound cut it further.
#[must_use]
pub fn paragraph_spans_bounded(text: &str, max_chars: usize) -> Vec<Span> {
    let mut spans = Vec::new();

    for paragraph in paragraph_spans(text) {
        if paragraph.char_len(text) <= max_chars {
            spans.push(paragraph);
            continue;
        }

        let mut group: Option<(Span, usize)> = None;
        for sentence in sentences_in(text, paragraph) {
            group = match group {
                None => Some((sentence, sentence.char_len(text))),
                Some((span, len)) => {
                    let extension = Span::new(span.end, sentence.end).char_len(text);
                    if len + extension <= max_chars {
                        Some((Span::new(span.start, sentence.end), len + extension))
                    } else {
                        spans.push(span);
                        Some((sentence, sentence.char_len(text)))
                    }
                }
            };
        }
        spans.extend(group.map(|(span, _)| span));
    }

    spans
}

/// Sentence spans computed paragraph by paragraph, so no sentence crosses a
/// blank line.
#[must_use]
pub fn sentences_by_paragraph(text: &str) -> Vec<Span> {
    paragraph_spans(text)
        .into_iter()
        .flat_map(|paragraph| sentences_in(text, paragraph))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentences(text: &str) -> Vec<&str> {
        sentence_spans(text).iter().map(|s| s.slice(text)).collect()
    }

    #[test]
    fn test_basic_sentences() {
        assert_eq!(
            sentences("Hello world. How are you? I am fine!"),
            vec!["Hello world.", "How are you?", "I am fine!"]
        );
    }

    #[test]
    fn test_abbreviations() {
        let found = sentences("Dr. Smith met Mr. Jones, e.g. at noon. They talked.");
        assert_eq!(found, vec!["Dr. Smith met Mr. Jones, e.g. at noon.", "They talked."]);
    }

    #[test]
    fn test_initials_and_decimals() {
        let found = sentences("J. R. Tolkien wrote 3.5 books. Not really.");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_no_terminators_is_one_span() {
        let text = "- item one\n- item two\n- item three";
        let spans = sentence_spans(text);
        assert_eq!(spans, vec![Span::new(0, text.len())]);
    }

    #[test]
    fn test_closing_quotes_absorbed() {
        let found = sentences("He said \"stop.\" Then he left.");
        assert_eq!(found, vec!["He said \"stop.\"", "Then he left."]);
    }

    #[test]
    fn test_full_width_terminators() {
        let found = sentences("今日は晴れです。明日は雨です。");
        assert_eq!(found, vec!["今日は晴れです。", "明日は雨です。"]);
    }

    #[test]
    fn test_terminator_runs() {
        let found = sentences("Really?! Yes... Fine.");
        assert_eq!(found, vec!["Really?!", "Yes...", "Fine."]);
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(sentence_spans("").is_empty());
        assert!(sentence_spans("  \n\t ").is_empty());
        assert!(paragraph_spans("\n\n  \n").is_empty());
    }

    #[test]
    fn test_spans_ordered_and_disjoint() {
        let text = "One. Two! Three?\n\nFour. Five.";
        let spans = sentence_spans(text);
        for pair in spans.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_paragraphs_with_whitespace_lines() {
        let text = "A line.\n   \nB line.\r\n\r\nC line.";
        let found: Vec<&str> = paragraph_spans(text).iter().map(|s| s.slice(text)).collect();
        assert_eq!(found, vec!["A line.", "B line.", "C line."]);
    }

    #[test]
    fn test_bounded_paragraphs_split_at_sentences() {
        let text = "Alpha beta gamma. Delta epsilon zeta. Eta theta iota.";
        let spans = paragraph_spans_bounded(text, 40);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].slice(text), "Alpha beta gamma. Delta epsilon zeta.");
        assert_eq!(spans[1].slice(text), "Eta theta iota.");
    }

    #[test]
    fn test_sentences_do_not_cross_paragraphs() {
        let text = "no terminator here\n\nnor here";
        assert_eq!(sentences_by_paragraph(text).len(), 2);
        assert_eq!(sentence_spans(text).len(), 1);
    }
}
