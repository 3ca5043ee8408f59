//! # quarry
//!
//! Document chunking and chunk quality scoring for retrieval-augmented
//! generation (RAG) pipelines.
//!
//! ## The Problem
//!
//! Extracted document text is long and noisy. A PDF comes back with the same
//! "CONFIDENTIAL" header on every page, a report mixes prose with tables and
//! code, and a slide deck has no sentence punctuation at all. Retrieval needs
//! pieces that are small enough to embed, large enough to mean something, and
//! cut where a reader would cut.
//!
//! quarry turns plain text into an ordered sequence of [`Chunk`]s with a hard
//! size bound, controllable overlap, and scores that say how clean each cut
//! is.
//!
//! ## Pipeline
//!
//! ```text
//! text ─> NoiseFilter ─> select_strategy (Auto) ─> Chunker cores
//!      ─> OverlapInjector ─> QualityScorer ─> ChunkedDocument
//! ```
//!
//! 1. [`NoiseFilter`] drops lines that repeat across pages (running
//!    headers, footers, page numbers).
//! 2. [`select_strategy`] picks a strategy from [`DocumentSignals`] when the
//!    caller asked for [`Strategy::Auto`].
//! 3. The strategy cuts the text into *core* spans that never overlap.
//! 4. [`OverlapInjector`] extends each core backwards into its predecessor.
//! 5. [`QualityScorer`] assigns completeness, density, and quality.
//!
//! ## Strategies
//!
//! ### Fixed Size
//!
//! A window of `max_chunk_size` chars sliding by `max_chunk_size -
//! overlap_size`. Exact and fast; splits mid-word.
//!
//! ### Paragraph
//!
//! Whole paragraphs packed while they fit. Long paragraphs are regrouped at
//! sentence boundaries. Overlap repeats the previous chunk's last sentence(s).
//!
//! ### Semantic
//!
//! Whole sentences packed while they fit, never across a blank line. A
//! document without any terminator is one sentence, and is cut with the
//! fixed-size fallback only if it exceeds the bound.
//!
//! ### Intelligent
//!
//! Works on structural blocks: headings open new chunks, code blocks and
//! tables stay whole when they fit, and each chunk gets a
//! [`StructuralRole`]. Also classifies the [`DocumentDomain`] and extracts
//! technical keywords per chunk.
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::{ChunkingOptions, DocumentChunker, Strategy};
//!
//! let text = "# Overview\n\n\
//!             quarry splits documents. It scores every chunk.\n\n\
//!             # Details\n\n\
//!             Chunks carry offsets, overlap, and metadata.";
//!
//! let options = ChunkingOptions::new(80, 16).unwrap();
//! let chunked = DocumentChunker::new(options).unwrap().chunk_text(text).unwrap();
//!
//! assert_eq!(chunked.strategy(), Strategy::Intelligent);
//! assert_eq!(chunked.len(), 2);
//! for chunk in &chunked {
//!     assert!(chunk.core_content().chars().count() <= 80);
//!     assert!((0.0..=1.0).contains(&chunk.quality_score));
//! }
//! ```
//!
//! ## Units
//!
//! Sizes are `char` counts; offsets are byte offsets on `char` boundaries.
//! See [`ChunkingOptions::from_tokens`] for a token-based configuration.

mod chunk;
mod document;
mod error;
mod fixed;
mod intelligent;
mod options;
mod overlap;
mod paragraph;
mod pipeline;
mod quality;
mod select;
mod semantic;
mod span;

pub mod noise;
pub mod segment;
pub mod structure;
pub mod vocabulary;

pub use chunk::{Chunk, DocumentDomain, DocumentSummary, StructuralRole};
pub use document::Document;
pub use error::{Error, Result};
pub use fixed::FixedChunker;
pub use intelligent::IntelligentChunker;
pub use noise::{NoiseFilter, NoiseFilterConfig, RepeatingLine};
pub use options::{ChunkingOptions, Strategy, CHARS_PER_TOKEN};
pub use overlap::{OverlapBoundary, OverlapInjector};
pub use paragraph::ParagraphChunker;
pub use pipeline::{CancelFlag, ChunkedDocument, DocumentChunker};
pub use quality::{QualityScorer, QualityScores, ScoringWeights};
pub use select::{select_strategy, DocumentSignals};
pub use semantic::SemanticChunker;
pub use span::Span;

/// A segmentation strategy.
///
/// Chunkers return *core* spans: ordered, non-overlapping byte ranges whose
/// gaps hold only whitespace. Overlap is added afterwards by
/// [`OverlapInjector`], so every strategy shares one overlap rule.
///
/// ```rust
/// use quarry::{Chunker, FixedChunker, SemanticChunker, Span};
///
/// fn cut(chunker: &dyn Chunker, text: &str) -> Vec<Span> {
///     chunker.split(text)
/// }
///
/// let text = "Hello world. This is a test.";
/// let fixed = cut(&FixedChunker::new(10, 2).unwrap(), text);
/// let sentences = cut(&SemanticChunker::new(15).unwrap(), text);
/// assert_eq!(sentences.len(), 2);
/// assert!(fixed.len() > sentences.len());
/// ```
pub trait Chunker: Send + Sync {
    /// Split text into core spans.
    fn split(&self, text: &str) -> Vec<Span>;

    /// Estimate the number of chunks for a given text length.
    ///
    /// Useful for pre-allocation. May be approximate.
    fn estimate_chunks(&self, text_len: usize) -> usize {
        // Conservative default
        (text_len / 500).max(1)
    }
}
