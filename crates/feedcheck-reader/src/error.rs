//! Feed reader error types.

/// Result type alias for feed reader operations.
pub type Result<T> = std::result::Result<T, ReaderError>;

/// Feed reader errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReaderError {
    /// No feed at the requested catalog position.
    #[error("feed index {index} out of range (catalog has {len} feeds)")]
    FeedIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Catalog length.
        len: usize,
    },

    /// The entry source could not provide entries.
    #[error("entry source error: {0}")]
    Source(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ReaderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl ReaderError {
    /// Creates an entry source error.
    #[must_use]
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
