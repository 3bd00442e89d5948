//! Per-case execution context.
//!
//! Instead of reading application state from globals, every hook and body
//! receives a [`TestContext`] carrying the injected fixture and the recorder
//! that expectations are written to.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{HarnessError, Result};
use crate::expect::{Expectation, ExpectationOutcome};

/// Collects expectation outcomes for one test case.
///
/// Recording is only accepted between [`activate`](Self::activate) and
/// [`seal`](Self::seal).
#[derive(Debug, Default)]
pub struct CaseRecorder {
    state: Mutex<RecorderState>,
}

#[derive(Debug, Default)]
struct RecorderState {
    active: bool,
    sealed: bool,
    outcomes: Vec<ExpectationOutcome>,
}

impl CaseRecorder {
    /// Opens the recorder for the running case.
    pub fn activate(&self) {
        let mut state = self.state.lock();
        if !state.sealed {
            state.active = true;
        }
    }

    /// Returns true while expectations are accepted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    /// Records one outcome.
    ///
    /// # Errors
    /// Returns `NoActiveTest` if the case has not started or was already recorded.
    pub fn record(&self, outcome: ExpectationOutcome) -> Result<()> {
        let mut state = self.state.lock();
        if !state.active {
            let why = if state.sealed {
                "test case already recorded"
            } else {
                "test case not started"
            };
            tracing::warn!(matcher = %outcome.matcher, reason = why, "expectation outside running test");
            return Err(HarnessError::NoActiveTest(format!("{} evaluated but {why}", outcome.matcher)));
        }
        if !outcome.passed {
            tracing::debug!(matcher = %outcome.matcher, message = ?outcome.message, "expectation failed");
        }
        state.outcomes.push(outcome);
        Ok(())
    }

    /// Closes the recorder and takes the collected outcomes.
    pub fn seal(&self) -> Vec<ExpectationOutcome> {
        let mut state = self.state.lock();
        state.active = false;
        state.sealed = true;
        std::mem::take(&mut state.outcomes)
    }
}

/// Context handed to hooks and bodies.
pub struct TestContext<C> {
    suite: Arc<str>,
    test: Arc<str>,
    fixture: Arc<C>,
    recorder: Arc<CaseRecorder>,
}

impl<C> Clone for TestContext<C> {
    fn clone(&self) -> Self {
        Self {
            suite: Arc::clone(&self.suite),
            test: Arc::clone(&self.test),
            fixture: Arc::clone(&self.fixture),
            recorder: Arc::clone(&self.recorder),
        }
    }
}

impl<C> TestContext<C> {
    /// Creates a context for one case.
    #[must_use]
    pub fn new(
        suite: impl Into<Arc<str>>,
        test: impl Into<Arc<str>>,
        fixture: Arc<C>,
        recorder: Arc<CaseRecorder>,
    ) -> Self {
        Self {
            suite: suite.into(),
            test: test.into(),
            fixture,
            recorder,
        }
    }

    /// Starts an expectation over `actual`.
    pub fn expect<T>(&self, actual: T) -> Expectation<T> {
        Expectation::new(actual, Arc::clone(&self.recorder))
    }

    /// Returns the injected fixture.
    #[must_use]
    pub fn fixture(&self) -> &C {
        &self.fixture
    }

    /// Returns a shared handle to the injected fixture.
    #[must_use]
    pub fn fixture_arc(&self) -> Arc<C> {
        Arc::clone(&self.fixture)
    }

    /// Returns the suite name.
    #[must_use]
    pub fn suite_name(&self) -> &str {
        &self.suite
    }

    /// Returns the test case description.
    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test
    }

    /// Returns true while the case accepts expectations.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.recorder.is_active()
    }
}
