//! The Chunk type: a scored slice of a document with its context.

use serde::{Deserialize, Serialize};

use crate::span::Span;
use crate::Strategy;

/// Maximum number of keywords kept in a [`DocumentSummary`].
pub const SUMMARY_KEYWORD_LIMIT: usize = 10;

/// The shape of a chunk's content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralRole {
    /// Ordinary prose.
    #[default]
    Content,
    /// A section heading.
    Heading,
    /// Fenced or indented code.
    CodeBlock,
    /// Pipe-delimited or tab-aligned rows.
    Table,
    /// Bulleted or numbered items.
    List,
}

impl StructuralRole {
    /// Whether the role ends at a structural rather than a sentence boundary.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        !matches!(self, Self::Content)
    }
}

/// Coarse subject-matter classification of a whole document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentDomain {
    /// No vocabulary dominates.
    #[default]
    General,
    /// Software, infrastructure, data, and AI/ML.
    Technical,
    /// Strategy, markets, and finance.
    Business,
    /// Research and scholarship.
    Academic,
}

/// A chunk of a document, with position, overlap, and quality metadata.
///
/// ## Offsets and Overlap
///
/// `start..end` is the byte range of `content` in the filtered document.
/// `core_start` splits it into the overlap borrowed from the previous chunk
/// and the chunk's own core:
///
/// ```text
///            start   core_start              end
///              |---------|--------------------|
///               overlap        core content
///              (suffix of previous core)
/// ```
///
/// Concatenating the core contents of all chunks reconstructs the document,
/// up to the whitespace between cores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text, overlap included.
    pub content: String,
    /// Zero-based position in the sequence.
    pub index: usize,
    /// Byte offset where `content` starts.
    pub start: usize,
    /// Byte offset where `content` ends (exclusive).
    pub end: usize,
    /// Byte offset where the un-overlapped core starts.
    pub core_start: usize,
    /// Whether `start` reaches into the previous chunk's core.
    pub has_overlap_with_previous: bool,
    /// Shape of the content.
    pub structural_role: StructuralRole,
    /// Weighted combination of the other scores, in `[0, 1]`.
    pub quality_score: f64,
    /// How cleanly the core starts and ends, in `[0, 1]`.
    pub completeness_score: f64,
    /// Share of informative tokens, in `[0, 1]`.
    pub density: f64,
    /// Up to five technical terms, most frequent first.
    pub technical_keywords: Vec<String>,
    /// Domain of the whole document.
    pub document_domain: DocumentDomain,
    /// 1-based page holding `core_start`, when the document had pages.
    pub page: Option<usize>,
}

impl Chunk {
    /// An unscored chunk over `text[start..core.end]`.
    pub(crate) fn new(
        text: &str,
        index: usize,
        start: usize,
        core: Span,
        role: StructuralRole,
    ) -> Self {
        Self {
            content: text[start..core.end].to_string(),
            index,
            start,
            end: core.end,
            core_start: core.start,
            has_overlap_with_previous: false,
            structural_role: role,
            quality_score: 0.0,
            completeness_score: 0.0,
            density: 0.0,
            technical_keywords: Vec::new(),
            document_domain: DocumentDomain::General,
            page: None,
        }
    }

    /// The content without the overlap borrowed from the previous chunk.
    #[must_use]
    pub fn core_content(&self) -> &str {
        &self.content[self.core_start - self.start..]
    }

    /// The leading text shared with the previous chunk (possibly empty).
    #[must_use]
    pub fn overlap_content(&self) -> &str {
        &self.content[..self.core_start - self.start]
    }

    /// The byte span of the whole chunk.
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// The byte span of the core.
    #[must_use]
    pub fn core_span(&self) -> Span {
        Span::new(self.core_start, self.end)
    }

    /// The length of this chunk in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether this chunk is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk {{ index: {}, span: {}..{}, core: {}.., role: {:?}, quality: {:.2} }}",
            self.index, self.start, self.end, self.core_start, self.structural_role, self.quality_score
        )
    }
}

/// Document-level facts reduced from a chunk sequence.
///
/// Lets enrichment consumers read the domain and the dominant keywords
/// without walking every chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Domain shared by all chunks.
    pub domain: DocumentDomain,
    /// Keywords ranked by the number of chunks carrying them.
    pub keywords: Vec<String>,
    /// Number of chunks.
    pub chunk_count: usize,
    /// The strategy that produced the chunks.
    pub strategy: Strategy,
    /// Mean `quality_score`, or 0 for an empty document.
    pub mean_quality: f64,
}

impl DocumentSummary {
    /// Reduce a chunk sequence.
    #[must_use]
    pub fn from_chunks(chunks: &[Chunk], strategy: Strategy) -> Self {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for keyword in chunks
            .iter()
            .flat_map(|c| c.technical_keywords.iter().map(String::as_str))
        {
            match counts.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(keyword)) {
                Some((_, n)) => *n += 1,
                None => counts.push((keyword, 1)),
            }
        }
        // Stable sort keeps first-seen order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let mean_quality = if chunks.is_empty() {
            0.0
        } else {
            chunks.iter().map(|c| c.quality_score).sum::<f64>() / chunks.len() as f64
        };

        Self {
            domain: chunks.first().map(|c| c.document_domain).unwrap_or_default(),
            keywords: counts
                .into_iter()
                .take(SUMMARY_KEYWORD_LIMIT)
                .map(|(k, _)| k.to_string())
                .collect(),
            chunk_count: chunks.len(),
            strategy,
            mean_quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_and_overlap_content() {
        let text = "First sentence. Second sentence.";
        let chunk = Chunk::new(text, 1, 6, Span::new(16, text.len()), StructuralRole::Content);
        assert_eq!(chunk.content, "sentence. Second sentence.");
        assert_eq!(chunk.overlap_content(), "sentence. ");
        assert_eq!(chunk.core_content(), "Second sentence.");
        assert_eq!(chunk.core_span(), Span::new(16, text.len()));
    }

    #[test]
    fn test_summary_ranks_keywords() {
        let text = "a b c";
        let mut first = Chunk::new(text, 0, 0, Span::new(0, 1), StructuralRole::Content);
        first.technical_keywords = vec!["API".into(), "Rust".into()];
        first.quality_score = 0.5;
        first.document_domain = DocumentDomain::Technical;
        let mut second = Chunk::new(text, 1, 2, Span::new(2, 3), StructuralRole::Content);
        second.technical_keywords = vec!["Rust".into()];
        second.quality_score = 1.0;
        second.document_domain = DocumentDomain::Technical;

        let summary = DocumentSummary::from_chunks(&[first, second], Strategy::Semantic);
        assert_eq!(summary.keywords, vec!["Rust", "API"]);
        assert_eq!(summary.domain, DocumentDomain::Technical);
        assert_eq!(summary.chunk_count, 2);
        assert!((summary.mean_quality - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = DocumentSummary::from_chunks(&[], Strategy::Paragraph);
        assert_eq!(summary.domain, DocumentDomain::General);
        assert!(summary.keywords.is_empty());
        assert!(summary.mean_quality.abs() < f64::EPSILON);
    }

    #[test]
    fn test_role_serializes_snake_case() {
        let json = serde_json::to_string(&StructuralRole::CodeBlock).unwrap();
        assert_eq!(json, "\"code_block\"");
    }
}
