//! Test crate error types.

/// Result type alias for scenario operations.
pub type Result<T> = std::result::Result<T, TestError>;

/// Scenario errors.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    /// Harness error.
    #[error("harness error: {0}")]
    Harness(#[from] feedcheck_core::HarnessError),

    /// Feed reader error.
    #[error("reader error: {0}")]
    Reader(#[from] feedcheck_reader::ReaderError),

    /// Chaos injection error.
    #[error("chaos injection error: {0}")]
    Chaos(String),
}

impl TestError {
    /// Creates a chaos injection error.
    #[must_use]
    pub fn chaos(msg: impl Into<String>) -> Self {
        Self::Chaos(msg.into())
    }
}
