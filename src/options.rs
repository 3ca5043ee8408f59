//! Chunking options.
//!
//! ## Units
//!
//! `max_chunk_size` and `overlap_size` count `char`s, never bytes and never
//! model tokens. Callers that think in tokens convert with
//! [`ChunkingOptions::from_tokens`], which assumes [`CHARS_PER_TOKEN`]; no
//! tokenizer is emulated.
//!
//! ```text
//! from_tokens(512, 64) -> max_chunk_size = 2048, overlap_size = 256
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Chars per model token assumed by [`ChunkingOptions::from_tokens`].
pub const CHARS_PER_TOKEN: usize = 4;

/// Which chunking algorithm to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Pick from document signals (never picks `FixedSize`).
    #[default]
    Auto,
    /// Sliding window; ignores linguistic boundaries.
    FixedSize,
    /// Whole paragraphs packed up to the size bound.
    Paragraph,
    /// Whole sentences packed up to the size bound.
    Semantic,
    /// Structure-aware: headings, code, tables, lists, domain, keywords.
    Intelligent,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Auto,
        Self::FixedSize,
        Self::Paragraph,
        Self::Semantic,
        Self::Intelligent,
    ];

    /// The canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::FixedSize => "fixed_size",
            Self::Paragraph => "paragraph",
            Self::Semantic => "semantic",
            Self::Intelligent => "intelligent",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    /// Parse a strategy name, case-insensitively.
    ///
    /// ```rust
    /// use quarry::Strategy;
    ///
    /// assert_eq!("Fixed-Size".parse::<Strategy>().unwrap(), Strategy::FixedSize);
    /// assert!("recursive".parse::<Strategy>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "fixed" | "fixed_size" | "fixed-size" | "fixedsize" => Ok(Self::FixedSize),
            "paragraph" | "paragraphs" => Ok(Self::Paragraph),
            "semantic" | "sentence" => Ok(Self::Semantic),
            "intelligent" | "smart" => Ok(Self::Intelligent),
            _ => Err(Error::UnsupportedStrategy(s.to_string())),
        }
    }
}

/// Options for one chunking run.
///
/// ## Example
///
/// ```rust
/// use quarry::{ChunkingOptions, Strategy};
///
/// let options = ChunkingOptions::new(512, 64)
///     .unwrap()
///     .with_strategy(Strategy::Paragraph);
/// assert_eq!(options.max_chunk_size, 512);
///
/// assert!(ChunkingOptions::new(100, 100).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingOptions {
    /// The algorithm to run.
    pub strategy: Strategy,
    /// Upper bound on a chunk's core, in chars.
    pub max_chunk_size: usize,
    /// Chars of the previous chunk to repeat at the start of the next.
    pub overlap_size: usize,
    /// Keep headings, code blocks, and tables intact (Intelligent only).
    pub preserve_structure: bool,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        // ~512 tokens of 4 chars, ~10% overlap
        Self {
            strategy: Strategy::Auto,
            max_chunk_size: 2048,
            overlap_size: 200,
            preserve_structure: true,
        }
    }
}

impl ChunkingOptions {
    /// Options with the given bounds and default strategy.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_chunk_size == 0` or
    /// `overlap_size >= max_chunk_size`.
    pub fn new(max_chunk_size: usize, overlap_size: usize) -> Result<Self> {
        let options = Self {
            max_chunk_size,
            overlap_size,
            ..Self::default()
        };
        options.validate()?;
        Ok(options)
    }

    /// Options from token counts, converted at [`CHARS_PER_TOKEN`].
    ///
    /// # Errors
    ///
    /// Same as [`ChunkingOptions::new`].
    pub fn from_tokens(max_tokens: usize, overlap_tokens: usize) -> Result<Self> {
        Self::new(
            max_tokens.saturating_mul(CHARS_PER_TOKEN),
            overlap_tokens.saturating_mul(CHARS_PER_TOKEN),
        )
    }

    /// Set the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set whether structure is preserved.
    #[must_use]
    pub fn with_preserve_structure(mut self, preserve: bool) -> Self {
        self.preserve_structure = preserve;
        self
    }

    /// Check the size bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChunkSize`] or [`Error::OverlapExceedsSize`].
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(Error::InvalidChunkSize(self.max_chunk_size));
        }
        if self.overlap_size >= self.max_chunk_size {
            return Err(Error::OverlapExceedsSize {
                size: self.max_chunk_size,
                overlap: self.overlap_size,
            });
        }
        Ok(())
    }
}
