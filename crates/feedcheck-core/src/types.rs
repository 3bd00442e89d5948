//! Identifiers and state machines for a harness run.
//!
//! Run state transitions are strictly forward:
//! ```text
//! Idle → Running → Finalized
//! ```
//! and every test case walks
//! ```text
//! PendingHook → RunningHook → PendingBody → RunningBody → Recorded
//! ```
//! A case whose hook fails jumps from `RunningHook` straight to `Recorded`.

use serde::{Deserialize, Serialize};

/// Unique identifier for one harness run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(uuid::Uuid);

impl RunId {
    /// Creates a new random run ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a suite in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SuiteId(pub(crate) usize);

impl SuiteId {
    /// Returns the declaration index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Position of a test case inside its suite, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestId {
    pub(crate) suite: SuiteId,
    pub(crate) index: usize,
}

impl TestId {
    /// Returns the owning suite.
    #[must_use]
    pub const fn suite(&self) -> SuiteId {
        self.suite
    }

    /// Returns the declaration index within the suite.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// Lifecycle of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Suites may still be declared.
    Idle,
    /// Test cases are executing; registration is closed.
    Running,
    /// The report has been produced.
    Finalized,
}

impl RunState {
    /// Returns true if suites, tests and hooks may still be declared.
    #[must_use]
    pub const fn accepts_registration(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true if the run has produced its report.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

/// Lifecycle of a single (suite, test case) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CasePhase {
    /// Waiting for the before-each hook to start.
    PendingHook,
    /// Before-each hook executing.
    RunningHook,
    /// Hook done, body not started.
    PendingBody,
    /// Body executing.
    RunningBody,
    /// Outcome handed to the reporter.
    Recorded,
}

impl CasePhase {
    /// Returns the phase that follows this one on the success path.
    #[must_use]
    pub const fn next(&self) -> Self {
        match self {
            Self::PendingHook => Self::RunningHook,
            Self::RunningHook => Self::PendingBody,
            Self::PendingBody => Self::RunningBody,
            Self::RunningBody | Self::Recorded => Self::Recorded,
        }
    }
}

/// Which step of a test case an async completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// A before-each hook.
    Hook,
    /// The test body.
    Body,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hook => write!(f, "before-each"),
            Self::Body => write!(f, "body"),
        }
    }
}
