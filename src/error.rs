//! Error types for quarry.

/// Errors that can occur while configuring or running the chunker.
///
/// Degenerate text (empty, unpunctuated, one giant paragraph) is never an
/// error; only malformed configuration and cancellation are.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Invalid chunk size (must be > 0).
    #[error("invalid chunk size: {0} (must be > 0)")]
    InvalidChunkSize(usize),

    /// Overlap is not smaller than the chunk size.
    #[error("overlap {overlap} must be smaller than chunk size {size}")]
    OverlapExceedsSize {
        /// The chunk size.
        size: usize,
        /// The overlap that was too large.
        overlap: usize,
    },

    /// A strategy name that does not map to any known strategy.
    #[error("unsupported strategy: {0:?}")]
    UnsupportedStrategy(String),

    /// A page start that is out of order, out of range, or inside a character.
    #[error("invalid page boundary {offset} for text of {len} bytes")]
    InvalidPageBoundary {
        /// The offending byte offset.
        offset: usize,
        /// Length of the text in bytes.
        len: usize,
    },

    /// A configuration value outside its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The caller cancelled the run before it finished.
    #[error("chunking cancelled")]
    Cancelled,
}

/// Result type for quarry operations.
pub type Result<T> = std::result::Result<T, Error>;
