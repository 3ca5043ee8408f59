//! Structure-aware chunking.
//!
//! Works on the blocks found by [`crate::structure::blocks`] instead of raw
//! sentences, so headings, code, tables, and lists keep their shape.
//!
//! ## Algorithm
//!
//! ```text
//! blocks:  [H1] [P] [P] [CODE] [H2] [P] [TABLE: 3 x max]
//!
//! 1. A heading flushes the open chunk and opens a new one (preserve_structure)
//! 2. Blocks join the open chunk while the result fits in max
//! 3. A block over max is cut first:
//!      code, table, list -> at line boundaries
//!      prose            -> at sentence boundaries
//!    and any piece still over max falls back to the fixed-size cut
//!
//! chunks:  [H1 P P] [CODE] [H2 P] [T1] [T2] [T3]
//! ```
//!
//! Each chunk takes the role that covers most of its characters, so a
//! heading followed by three paragraphs is `Content`, and a lone code block
//! is `CodeBlock`.

use tracing::trace;

use crate::segment::sentences_in;
use crate::span::{char_len, pack, Span};
use crate::structure::{blocks, Block};
use crate::{Chunker, Error, Result, StructuralRole};

/// Structure-aware chunker.
///
/// ## Example
///
/// ```rust
/// use quarry::{IntelligentChunker, StructuralRole};
///
/// let chunker = IntelligentChunker::new(200, true).unwrap();
/// let text = "# Install\n\nRun the installer.\n\n# Usage\n\n```\nquarry run\n```";
/// let chunks = chunker.split_with_roles(text);
///
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[0].0.slice(text), "# Install\n\nRun the installer.");
/// assert!(chunks[1].0.slice(text).starts_with("# Usage"));
/// assert_eq!(chunks[1].1, StructuralRole::CodeBlock);
/// ```
#[derive(Debug, Clone)]
pub struct IntelligentChunker {
    max_chars: usize,
    preserve_structure: bool,
}

/// An open chunk and how many chars each role contributed.
struct Open {
    span: Span,
    chars: usize,
    roles: Vec<(StructuralRole, usize)>,
}

impl Open {
    fn new(text: &str, unit: Span, role: StructuralRole) -> Self {
        let chars = unit.char_len(text);
        Self {
            span: unit,
            chars,
            roles: vec![(role, chars)],
        }
    }

    fn add(&mut self, unit_chars: usize, extension: usize, end: usize, role: StructuralRole) {
        self.span.end = end;
        self.chars += extension;
        match self.roles.iter_mut().find(|(r, _)| *r == role) {
            Some((_, n)) => *n += unit_chars,
            None => self.roles.push((role, unit_chars)),
        }
    }

    /// The role with the most chars; ties keep the earliest.
    fn role(&self) -> StructuralRole {
        self.roles
            .iter()
            .fold(None, |best: Option<(StructuralRole, usize)>, &(role, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((role, n)),
            })
            .map(|(role, _)| role)
            .unwrap_or_default()
    }
}

impl IntelligentChunker {
    /// Create a structure-aware chunker.
    ///
    /// # Arguments
    ///
    /// * `max_chars` - Upper bound on a core, in chars
    /// * `preserve_structure` - Whether headings always open a new chunk
    ///
    /// # Errors
    ///
    /// Returns an error if `max_chars == 0`.
    pub fn new(max_chars: usize, preserve_structure: bool) -> Result<Self> {
        if max_chars == 0 {
            return Err(Error::InvalidChunkSize(max_chars));
        }
        Ok(Self {
            max_chars,
            preserve_structure,
        })
    }

    /// Core spans with the structural role of each.
    #[must_use]
    pub fn split_with_roles(&self, text: &str) -> Vec<(Span, StructuralRole)> {
        let mut chunks = Vec::new();
        let mut open: Option<Open> = None;

        for block in blocks(text) {
            if self.preserve_structure && block.role == StructuralRole::Heading {
                trace!(start = block.span.start, "heading opens a new chunk");
                flush(&mut open, &mut chunks);
            }

            for unit in self.units(text, block) {
                let unit_chars = unit.char_len(text);
                open = match open.take() {
                    None => Some(Open::new(text, unit, block.role)),
                    Some(mut current) => {
                        let extension = char_len(&text[current.span.end..unit.end]);
                        if current.chars + extension <= self.max_chars {
                            current.add(unit_chars, extension, unit.end, block.role);
                            Some(current)
                        } else {
                            chunks.push((current.span, current.role()));
                            Some(Open::new(text, unit, block.role))
                        }
                    }
                };
            }
        }
        flush(&mut open, &mut chunks);

        chunks
    }

    /// The block itself, or its pieces when it is too large.
    fn units(&self, text: &str, block: Block) -> Vec<Span> {
        if block.span.char_len(text) <= self.max_chars {
            return vec![block.span];
        }

        trace!(
            start = block.span.start,
            role = ?block.role,
            "block exceeds max_chunk_size, cutting"
        );
        match block.role {
            StructuralRole::CodeBlock | StructuralRole::Table | StructuralRole::List => {
                pack(text, &line_spans(text, block.span), self.max_chars)
            }
            StructuralRole::Content | StructuralRole::Heading => {
                pack(text, &sentences_in(text, block.span), self.max_chars)
            }
        }
    }
}

fn flush(open: &mut Option<Open>, chunks: &mut Vec<(Span, StructuralRole)>) {
    if let Some(current) = open.take() {
        chunks.push((current.span, current.role()));
    }
}

/// Non-blank lines of `within`, trimmed.
fn line_spans(text: &str, within: Span) -> Vec<Span> {
    let mut offset = within.start;
    within
        .slice(text)
        .split_inclusive('\n')
        .filter_map(|line| {
            let span = Span::new(offset, offset + line.len());
            offset = span.end;
            span.trim(text)
        })
        .collect()
}

impl Chunker for IntelligentChunker {
    fn split(&self, text: &str) -> Vec<Span> {
        self.split_with_roles(text)
            .into_iter()
            .map(|(span, _)| span)
            .collect()
    }

    fn estimate_chunks(&self, text_len: usize) -> usize {
        text_len.div_ceil(self.max_chars).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slices(text: &str, chunks: &[(Span, StructuralRole)]) -> Vec<String> {
        chunks.iter().map(|(s, _)| s.slice(text).to_string()).collect()
    }

    #[test]
    fn test_heading_opens_new_chunk() {
        let chunker = IntelligentChunker::new(500, true).unwrap();
        let text = "Intro text.\n\n## Details\n\nMore text.";
        let chunks = chunker.split_with_roles(text);
        assert_eq!(
            slices(text, &chunks),
            vec!["Intro text.", "## Details\n\nMore text."]
        );
    }

    #[test]
    fn test_without_preserve_headings_merge() {
        let chunker = IntelligentChunker::new(500, false).unwrap();
        let text = "Intro text.\n\n## Details\n\nMore text.";
        assert_eq!(chunker.split_with_roles(text).len(), 1);
    }

    #[test]
    fn test_majority_role() {
        let chunker = IntelligentChunker::new(500, true).unwrap();
        let text = "# T\n\n| a | b |\n| - | - |\n| 1 | 2 |\n| 3 | 4 |";
        let chunks = chunker.split_with_roles(text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].1, StructuralRole::Table);
    }

    #[test]
    fn test_oversized_code_cut_at_lines() {
        let chunker = IntelligentChunker::new(24, true).unwrap();
        let text = "```\nlet alpha = 1;\nlet beta = 2;\nlet gamma = 3;\n```";
        let chunks = chunker.split_with_roles(text);
        assert!(chunks.len() > 1);
        for (span, role) in &chunks {
            assert!(span.char_len(text) <= 24);
            assert_eq!(*role, StructuralRole::CodeBlock);
            // Every cut lands between lines
            assert!(span.start == 0 || text[..span.start].ends_with('\n'));
        }
    }

    #[test]
    fn test_oversized_list_cut_between_items() {
        let chunker = IntelligentChunker::new(24, true).unwrap();
        let text = "- apples and pears\n- bread and butter\n- milk and honey";
        let chunks = chunker.split_with_roles(text);
        assert_eq!(
            slices(text, &chunks),
            vec!["- apples and pears", "- bread and butter", "- milk and honey"]
        );
        assert!(chunks.iter().all(|(_, role)| *role == StructuralRole::List));
    }

    #[test]
    fn test_oversized_prose_cut_at_sentences() {
        let chunker = IntelligentChunker::new(20, true).unwrap();
        let text = "Alpha beta gamma. Delta epsilon zeta.";
        let chunks = chunker.split_with_roles(text);
        assert_eq!(
            slices(text, &chunks),
            vec!["Alpha beta gamma.", "Delta epsilon zeta."]
        );
    }

    #[test]
    fn test_cores_ordered_and_disjoint() {
        let chunker = IntelligentChunker::new(30, true).unwrap();
        let text = "# A\n\nSome words here. And more words.\n\n- one\n- two\n\n    code\n";
        let chunks = chunker.split_with_roles(text);
        for pair in chunks.windows(2) {
            assert!(pair[0].0.end <= pair[1].0.start);
            assert!(text[pair[0].0.end..pair[1].0.start].trim().is_empty());
        }
    }

    #[test]
    fn test_empty_text() {
        let chunker = IntelligentChunker::new(30, true).unwrap();
        assert!(chunker.split_with_roles("").is_empty());
    }
}
