//! Error types for feedcheck-core.
//!
//! Setup errors abort a run before any test case executes. Case errors are
//! recorded against a single test case and never propagate past it.

use std::time::Duration;

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Comprehensive error type for harness operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    /// A suite with this name was already declared in the run.
    #[error("duplicate suite: {0}")]
    DuplicateSuite(String),

    /// Registration attempted after the run started.
    #[error("late registration: {0}")]
    LateRegistration(String),

    /// A second before-each hook was declared on an exclusive-hook suite.
    #[error("duplicate before-each hook for suite: {0}")]
    DuplicateHook(String),

    /// The suite handle does not belong to this harness.
    #[error("unknown suite: {0}")]
    UnknownSuite(String),

    /// The run refused to start because registration failed.
    #[error("setup aborted: {0}")]
    SetupAborted(Box<HarnessError>),

    /// An asynchronous hook did not signal completion in time.
    #[error("before-each hook timed out after {0:?}")]
    HookTimeout(Duration),

    /// A hook returned an error or panicked.
    #[error("before-each hook failed: {0}")]
    HookFailed(String),

    /// An asynchronous test body did not signal completion in time.
    #[error("async test timed out after {0:?}")]
    AsyncTimeout(Duration),

    /// The completion token was dropped without ever being signalled.
    #[error("completion handle dropped without signalling")]
    CompletionDropped,

    /// The completion token was signalled a second time.
    #[error("completion already signalled")]
    AlreadyCompleted,

    /// A matcher was evaluated while no test case was running.
    #[error("no active test: {0}")]
    NoActiveTest(String),

    /// A test body returned an error.
    #[error("test body failed: {0}")]
    BodyFailed(String),

    /// A test body panicked.
    #[error("test body panicked: {0}")]
    BodyPanicked(String),

    /// Invalid run state for the requested operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl HarnessError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid state error.
    #[must_use]
    pub fn state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Creates a test body failure.
    #[must_use]
    pub fn body(msg: impl Into<String>) -> Self {
        Self::BodyFailed(msg.into())
    }

    /// Creates a hook failure.
    #[must_use]
    pub fn hook(msg: impl Into<String>) -> Self {
        Self::HookFailed(msg.into())
    }

    /// Returns true if this error is raised while declaring suites, tests or hooks.
    #[must_use]
    pub const fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateSuite(_)
                | Self::LateRegistration(_)
                | Self::DuplicateHook(_)
                | Self::UnknownSuite(_)
                | Self::SetupAborted(_)
        )
    }

    /// Returns true if this error is scoped to a single test case.
    #[must_use]
    pub const fn is_case_error(&self) -> bool {
        matches!(
            self,
            Self::HookTimeout(_)
                | Self::HookFailed(_)
                | Self::AsyncTimeout(_)
                | Self::CompletionDropped
                | Self::AlreadyCompleted
                | Self::NoActiveTest(_)
                | Self::BodyFailed(_)
                | Self::BodyPanicked(_)
        )
    }
}
