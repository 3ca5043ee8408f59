//! The chunking pipeline: filter, select, segment, overlap, score.
//!
//! ```text
//! Document ──> NoiseFilter ──> select_strategy (Auto only)
//!                                   │
//!                                   v
//!              strategy cores ──> OverlapInjector ──> Chunk records
//!                                                        │
//!                      domain, keywords (Intelligent) <──┤
//!                      page numbers                   <──┤
//!                      QualityScorer                  <──┘
//! ```
//!
//! Every call is independent: nothing is cached between documents, so one
//! [`DocumentChunker`] can be shared across threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::document::page_of;
use crate::overlap::{OverlapBoundary, OverlapInjector};
use crate::select::{select_strategy, DocumentSignals};
use crate::span::Span;
use crate::vocabulary::{classify_domain, extract_technical_keywords, KEYWORD_LIMIT};
use crate::{
    Chunk, Chunker, ChunkingOptions, Document, DocumentDomain, DocumentSummary, Error,
    FixedChunker, IntelligentChunker, NoiseFilter, ParagraphChunker, QualityScorer, Result,
    SemanticChunker, Strategy, StructuralRole,
};

/// Cooperative cancellation signal.
///
/// Clones share the flag. The pipeline checks it before each chunk is
/// emitted and returns [`Error::Cancelled`] instead of a partial result.
///
/// ```rust
/// use quarry::{CancelFlag, ChunkingOptions, Document, DocumentChunker, Error};
///
/// let cancel = CancelFlag::new();
/// cancel.clone().cancel();
///
/// let chunker = DocumentChunker::new(ChunkingOptions::default()).unwrap();
/// let result = chunker.chunk_with_cancel(&Document::new("Some text."), &cancel);
/// assert_eq!(result.unwrap_err(), Error::Cancelled);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag that is not yet raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether the flag was raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Entry point: chunks documents with one set of options.
///
/// ## Example
///
/// ```rust
/// use quarry::{ChunkingOptions, DocumentChunker, Strategy};
///
/// let options = ChunkingOptions::new(60, 10)
///     .unwrap()
///     .with_strategy(Strategy::Semantic);
/// let chunker = DocumentChunker::new(options).unwrap();
///
/// let text = "Rust has no garbage collector. Memory is freed by ownership. \
///             Borrowing lets code use values without taking them.";
/// let chunked = chunker.chunk_text(text).unwrap();
///
/// assert!(chunked.len() > 1);
/// for chunk in &chunked {
///     assert_eq!(chunk.content, &chunked.text()[chunk.start..chunk.end]);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DocumentChunker {
    options: ChunkingOptions,
    noise_filter: NoiseFilter,
    scorer: QualityScorer,
}

impl DocumentChunker {
    /// A chunker with the default noise filter and scorer.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are invalid; nothing is processed.
    pub fn new(options: ChunkingOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            noise_filter: NoiseFilter::default(),
            scorer: QualityScorer::default(),
        })
    }

    /// Replace the noise filter.
    #[must_use]
    pub fn with_noise_filter(mut self, noise_filter: NoiseFilter) -> Self {
        self.noise_filter = noise_filter;
        self
    }

    /// Replace the quality scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: QualityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// The options in use.
    #[must_use]
    pub fn options(&self) -> &ChunkingOptions {
        &self.options
    }

    /// Chunk a page-less text.
    ///
    /// # Errors
    ///
    /// See [`DocumentChunker::chunk_with_cancel`].
    pub fn chunk_text(&self, text: &str) -> Result<ChunkedDocument> {
        self.chunk(&Document::new(text))
    }

    /// Chunk a document.
    ///
    /// # Errors
    ///
    /// See [`DocumentChunker::chunk_with_cancel`].
    pub fn chunk(&self, document: &Document<'_>) -> Result<ChunkedDocument> {
        self.chunk_with_cancel(document, &CancelFlag::default())
    }

    /// Chunk a document, stopping early if `cancel` is raised.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if the flag is raised before the last
    /// chunk is emitted. Degenerate input (empty, no terminators, one giant
    /// paragraph) is never an error.
    #[instrument(skip_all, fields(bytes = document.text().len(), pages = document.page_count()))]
    pub fn chunk_with_cancel(
        &self,
        document: &Document<'_>,
        cancel: &CancelFlag,
    ) -> Result<ChunkedDocument> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let (text, page_starts) = self
            .noise_filter
            .filter_pages(document.text(), document.page_starts());

        let (strategy, cores) = self.cores(&text, self.options.strategy)?;
        let spans: Vec<Span> = cores.iter().map(|(span, _)| *span).collect();

        let boundary = match strategy {
            Strategy::FixedSize => OverlapBoundary::Character,
            _ => OverlapBoundary::Sentence,
        };
        let starts = OverlapInjector::new(self.options.overlap_size, boundary).starts(&text, &spans);

        let structured = strategy == Strategy::Intelligent;
        let domain = if structured {
            classify_domain(&text)
        } else {
            DocumentDomain::General
        };

        let mut chunks = Vec::with_capacity(cores.len());
        for (index, (&(core, role), &start)) in cores.iter().zip(&starts).enumerate() {
            if cancel.is_cancelled() {
                debug!(emitted = index, total = cores.len(), "chunking cancelled");
                return Err(Error::Cancelled);
            }

            let mut chunk = Chunk::new(&text, index, start, core, role);
            chunk.has_overlap_with_previous = index > 0 && start < spans[index - 1].end;
            chunk.page = page_of(&page_starts, core.start);
            chunk.document_domain = domain;
            if structured {
                chunk.technical_keywords =
                    extract_technical_keywords(chunk.core_content(), KEYWORD_LIMIT);
            }
            chunks.push(chunk);
        }

        self.scorer.score_all(&mut chunks);
        debug!(%strategy, chunks = chunks.len(), ?domain, "chunked document");

        Ok(ChunkedDocument {
            text,
            page_starts,
            strategy,
            chunks,
        })
    }

    /// Chunk many documents in parallel.
    ///
    /// Results keep the input order; one failing document does not affect
    /// the others.
    #[cfg(feature = "parallel")]
    pub fn chunk_many(&self, documents: &[Document<'_>]) -> Vec<Result<ChunkedDocument>> {
        use rayon::prelude::*;

        documents.par_iter().map(|doc| self.chunk(doc)).collect()
    }

    /// Core spans and roles for `strategy`, with `Auto` resolved.
    fn cores(
        &self,
        text: &str,
        strategy: Strategy,
    ) -> Result<(Strategy, Vec<(Span, StructuralRole)>)> {
        let max = self.options.max_chunk_size;
        let content = |spans: Vec<Span>| -> Vec<(Span, StructuralRole)> {
            spans
                .into_iter()
                .map(|span| (span, StructuralRole::Content))
                .collect()
        };

        let cores = match strategy {
            Strategy::Auto => {
                return self.cores(text, select_strategy(&DocumentSignals::analyze(text)));
            }
            Strategy::FixedSize => {
                content(FixedChunker::new(max, self.options.overlap_size)?.split(text))
            }
            Strategy::Paragraph => content(ParagraphChunker::new(max)?.split(text)),
            Strategy::Semantic => content(SemanticChunker::new(max)?.split(text)),
            Strategy::Intelligent => {
                IntelligentChunker::new(max, self.options.preserve_structure)?
                    .split_with_roles(text)
            }
        };
        Ok((strategy, cores))
    }
}

/// The chunks of one document, with the text they index into.
///
/// Iterating is restartable: every call to [`ChunkedDocument::iter`] walks
/// the same chunks from the start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkedDocument {
    text: String,
    page_starts: Vec<usize>,
    strategy: Strategy,
    chunks: Vec<Chunk>,
}

impl ChunkedDocument {
    /// The filtered text every chunk offset refers to.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Page starts remapped onto the filtered text.
    #[must_use]
    pub fn page_starts(&self) -> &[usize] {
        &self.page_starts
    }

    /// The strategy that ran (never `Auto`).
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// All chunks, in order.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Iterate over the chunks.
    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    /// Number of chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether there are no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Take ownership of the chunks.
    #[must_use]
    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }

    /// Document-level facts reduced from the chunks.
    #[must_use]
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary::from_chunks(&self.chunks, self.strategy)
    }
}

impl<'a> IntoIterator for &'a ChunkedDocument {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}
