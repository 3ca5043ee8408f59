//! Chunk quality scoring.
//!
//! Three signals, each in `[0, 1]`, folded into one `quality_score`:
//!
//! | Signal       | Measures                                             |
//! |--------------|------------------------------------------------------|
//! | completeness | core neither starts nor ends mid-thought             |
//! | density      | share of tokens that carry content (not stopwords)   |
//! | sharpness    | both ends sit on sentence or structural boundaries   |
//!
//! Everything is computed on the chunk's *core*: the overlap is borrowed
//! context and would otherwise make every chunk look like it starts
//! mid-sentence.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::segment::is_terminator;
use crate::{Chunk, Error, Result, StructuralRole};

/// English function words ignored by the density signal.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

fn is_stopword(token: &str) -> bool {
    let lower = token.to_lowercase();
    STOPWORDS.binary_search(&lower.as_str()).is_ok()
}

/// Relative weight of each signal in `quality_score`.
///
/// Weights are normalised to sum to 1 on construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight of `completeness_score`.
    pub completeness: f64,
    /// Weight of `density`.
    pub density: f64,
    /// Weight of boundary sharpness.
    pub boundary: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            completeness: 0.5,
            density: 0.2,
            boundary: 0.3,
        }
    }
}

impl ScoringWeights {
    /// Normalised weights.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if any weight is negative or not
    /// finite, or all are zero.
    ///
    /// ```rust
    /// use quarry::ScoringWeights;
    ///
    /// let weights = ScoringWeights::new(2.0, 1.0, 1.0).unwrap();
    /// assert!((weights.completeness - 0.5).abs() < 1e-9);
    /// assert!(ScoringWeights::new(0.0, 0.0, 0.0).is_err());
    /// ```
    pub fn new(completeness: f64, density: f64, boundary: f64) -> Result<Self> {
        let all = [completeness, density, boundary];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::InvalidConfig(format!(
                "scoring weights must be finite and non-negative, got {all:?}"
            )));
        }
        let sum: f64 = all.iter().sum();
        if sum <= 0.0 {
            return Err(Error::InvalidConfig(
                "scoring weights must not all be zero".to_string(),
            ));
        }
        Ok(Self {
            completeness: completeness / sum,
            density: density / sum,
            boundary: boundary / sum,
        })
    }
}

/// The scores assigned to one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    /// Weighted combination of the three signals.
    pub quality: f64,
    /// 1 minus 1/3 per incomplete edge.
    pub completeness: f64,
    /// Informative tokens over all tokens.
    pub density: f64,
    /// Mean of start and end sharpness.
    pub boundary_sharpness: f64,
}

/// Pure, deterministic chunk scorer.
///
/// ## Example
///
/// ```rust
/// use quarry::{ChunkingOptions, DocumentChunker, QualityScorer, Strategy};
///
/// let options = ChunkingOptions::new(64, 0).unwrap().with_strategy(Strategy::Semantic);
/// let chunked = DocumentChunker::new(options).unwrap()
///     .chunk_text("Rust compiles to native code.")
///     .unwrap();
///
/// let scores = QualityScorer::default().score(&chunked.chunks()[0], None, None);
/// assert!((scores.completeness - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QualityScorer {
    weights: ScoringWeights,
}

impl QualityScorer {
    /// A scorer with the given weights.
    #[must_use]
    pub const fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// The weights in use.
    #[must_use]
    pub const fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Score `chunk` given its neighbours.
    #[must_use]
    pub fn score(
        &self,
        chunk: &Chunk,
        previous: Option<&Chunk>,
        next: Option<&Chunk>,
    ) -> QualityScores {
        let core = chunk.core_content().trim();
        let completeness = completeness(core, chunk.structural_role);
        let density = density(core);
        let boundary_sharpness = boundary_sharpness(chunk, core, previous, next);

        let w = self.weights;
        let quality = (w.completeness * completeness
            + w.density * density
            + w.boundary * boundary_sharpness)
            .clamp(0.0, 1.0);

        QualityScores {
            quality,
            completeness,
            density,
            boundary_sharpness,
        }
    }

    /// Score every chunk in place.
    pub fn score_all(&self, chunks: &mut [Chunk]) {
        let scores: Vec<QualityScores> = (0..chunks.len())
            .map(|i| {
                let previous = i.checked_sub(1).map(|p| &chunks[p]);
                self.score(&chunks[i], previous, chunks.get(i + 1))
            })
            .collect();

        for (chunk, s) in chunks.iter_mut().zip(scores) {
            chunk.quality_score = s.quality;
            chunk.completeness_score = s.completeness;
            chunk.density = s.density;
        }
    }
}

fn starts_lowercase(core: &str) -> bool {
    core.chars().next().is_some_and(char::is_lowercase)
}

fn ends_with_ellipsis(core: &str) -> bool {
    core.ends_with("...") || core.ends_with('…')
}

fn ends_with_terminator(core: &str) -> bool {
    core.trim_end_matches(['"', '\'', '”', '’', ')', ']'])
        .chars()
        .next_back()
        .is_some_and(is_terminator)
}

/// Completeness of a trimmed core.
///
/// ```text
/// "The cat sat."        1.0
/// "the cat sat"         1/3   starts lowercase, ends mid-word
/// "and then, ..."       1/3   starts lowercase, ellipsis
/// "Next steps:"         2/3   prose without a terminator
/// ```
///
/// Prose must end with a terminator. Structural chunks (headings, code,
/// tables, lists) legitimately end without one, so for them only a trailing
/// word char counts as cut off.
fn completeness(core: &str, role: StructuralRole) -> f64 {
    let mut penalties = 0u8;
    let cut_off = match role {
        StructuralRole::Content => {
            !core.is_empty() && !ends_with_terminator(core) && !ends_with_ellipsis(core)
        }
        _ => core.chars().next_back().is_some_and(char::is_alphanumeric),
    };
    if cut_off || core.ends_with([',', ';']) {
        penalties += 1;
    }
    if ends_with_ellipsis(core) {
        penalties += 1;
    }
    if starts_lowercase(core) {
        penalties += 1;
    }
    (1.0 - f64::from(penalties) / 3.0).max(0.0)
}

fn density(core: &str) -> f64 {
    let mut total = 0usize;
    let mut informative = 0usize;
    for token in core.split_word_bounds() {
        if token.trim().is_empty() {
            continue;
        }
        total += 1;
        if token.chars().any(char::is_alphanumeric) && !is_stopword(token) {
            informative += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        informative as f64 / total as f64
    }
}

fn boundary_sharpness(
    chunk: &Chunk,
    core: &str,
    previous: Option<&Chunk>,
    next: Option<&Chunk>,
) -> f64 {
    let previous_closed = previous.map_or(true, |p| {
        p.structural_role.is_structural() || ends_with_terminator(p.core_content().trim())
    });
    let start_sharp = previous_closed && !starts_lowercase(core);
    let end_sharp = chunk.structural_role.is_structural()
        || ends_with_terminator(core)
        || next.is_some_and(|n| n.structural_role == StructuralRole::Heading);

    (f64::from(u8::from(start_sharp)) + f64::from(u8::from(end_sharp))) / 2.0
}
