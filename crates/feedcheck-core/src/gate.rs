//! Async completion gate.
//!
//! An asynchronous hook or body receives a single-shot [`Done`] token.
//! [`Done::complete`] consumes the token, so a well-typed step cannot signal
//! twice; the shared gate state still refuses a second completion with
//! `AlreadyCompleted` instead of double-reporting.
//!
//! ```text
//! Pending ──complete──▶ Completed
//!    │
//!    ├──deadline──▶ TimedOut ──complete──▶ LateSignalWarning (no-op)
//!    │
//!    └──step failed──▶ Abandoned ──complete──▶ Discarded (no-op)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::{HarnessError, Result};
use crate::types::StepKind;

const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const TIMED_OUT: u8 = 2;
const ABANDONED: u8 = 3;

/// Shared list of late-signal warnings for one run.
pub type WarningSink = Arc<Mutex<Vec<LateSignalWarning>>>;

/// A completion signal that arrived after its step had already timed out.
///
/// Informational only: the step was already recorded as failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateSignalWarning {
    /// Suite of the late step.
    pub suite: String,
    /// Test case of the late step.
    pub test: String,
    /// Hook or body.
    pub step: StepKind,
    /// Timeout that had elapsed, in milliseconds.
    pub timeout_ms: u64,
    /// Time since the gate opened when the signal arrived, in milliseconds.
    pub signalled_after_ms: u64,
}

impl std::fmt::Display for LateSignalWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} › {}: {} signalled after {}ms (timeout {}ms)",
            self.suite, self.test, self.step, self.signalled_after_ms, self.timeout_ms
        )
    }
}

/// Result of a successful `complete` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// The step was still waiting; the suite advances.
    Accepted,
    /// The step had already timed out; nothing changes.
    Late(LateSignalWarning),
    /// The step had already failed before its timeout; nothing changes.
    Discarded,
}

/// How a gate was resolved from the waiting side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Signalled before the deadline.
    Completed(Duration),
    /// Deadline passed first.
    TimedOut(Duration),
    /// Token dropped without signalling.
    Dropped,
}

struct GateShared {
    state: AtomicU8,
    opened: Instant,
    timeout: Duration,
    suite: Arc<str>,
    test: Arc<str>,
    step: StepKind,
    warnings: WarningSink,
}

impl GateShared {
    fn signal(&self) -> Result<Signal> {
        match self
            .state
            .compare_exchange(PENDING, COMPLETED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(Signal::Accepted),
            Err(TIMED_OUT) => {
                let warning = LateSignalWarning {
                    suite: self.suite.to_string(),
                    test: self.test.to_string(),
                    step: self.step,
                    timeout_ms: self.timeout.as_millis() as u64,
                    signalled_after_ms: self.opened.elapsed().as_millis() as u64,
                };
                tracing::warn!(
                    suite = %warning.suite,
                    test = %warning.test,
                    step = %warning.step,
                    after_ms = warning.signalled_after_ms,
                    "completion signalled after timeout"
                );
                self.warnings.lock().push(warning.clone());
                Ok(Signal::Late(warning))
            }
            Err(ABANDONED) => {
                tracing::debug!(
                    suite = %self.suite,
                    test = %self.test,
                    step = %self.step,
                    "completion signalled after the step failed"
                );
                Ok(Signal::Discarded)
            }
            Err(_) => Err(HarnessError::AlreadyCompleted),
        }
    }

    /// Moves a pending gate to `TimedOut`. Returns false if it completed first.
    fn expire(&self) -> bool {
        match self
            .state
            .compare_exchange(PENDING, TIMED_OUT, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) | Err(TIMED_OUT) => true,
            Err(_) => false,
        }
    }

    /// Moves a pending gate to `Abandoned`.
    fn abandon(&self) {
        let _ = self
            .state
            .compare_exchange(PENDING, ABANDONED, Ordering::AcqRel, Ordering::Acquire);
    }

    fn is_completed(&self) -> bool {
        self.state.load(Ordering::Acquire) == COMPLETED
    }
}

/// Opens completion gates.
pub struct CompletionGate;

impl CompletionGate {
    /// Opens a gate for one step and returns the token and its waiter.
    #[must_use]
    pub fn open(
        suite: impl Into<Arc<str>>,
        test: impl Into<Arc<str>>,
        step: StepKind,
        timeout: Duration,
        warnings: WarningSink,
    ) -> (Done, GateWaiter) {
        let (tx, rx) = oneshot::channel();
        let shared = Arc::new(GateShared {
            state: AtomicU8::new(PENDING),
            opened: Instant::now(),
            timeout,
            suite: suite.into(),
            test: test.into(),
            step,
            warnings,
        });
        let done = Done {
            shared: Arc::clone(&shared),
            tx: Some(tx),
        };
        (done, GateWaiter { shared, rx })
    }
}

/// Single-shot completion token.
pub struct Done {
    shared: Arc<GateShared>,
    tx: Option<oneshot::Sender<()>>,
}

impl std::fmt::Debug for Done {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Done")
            .field("suite", &self.shared.suite)
            .field("test", &self.shared.test)
            .field("step", &self.shared.step)
            .finish_non_exhaustive()
    }
}

impl Done {
    /// Signals completion.
    ///
    /// A signal after the timeout is accepted as a no-op and reported as
    /// [`Signal::Late`].
    pub fn complete(mut self) -> Result<Signal> {
        let signal = self.shared.signal()?;
        if let (Signal::Accepted, Some(tx)) = (&signal, self.tx.take()) {
            // Receiver gone means the waiter already gave up; the state is authoritative.
            let _ = tx.send(());
        }
        Ok(signal)
    }

    /// Adapts the token into a plain callback for callback-style collaborators.
    pub fn into_callback(self) -> impl FnOnce() + Send + 'static {
        move || {
            if let Err(e) = self.complete() {
                tracing::error!(error = %e, "completion callback rejected");
            }
        }
    }

    /// Returns the step this token completes.
    #[must_use]
    pub fn step(&self) -> StepKind {
        self.shared.step
    }
}

/// Waiting side of a gate.
pub struct GateWaiter {
    shared: Arc<GateShared>,
    rx: oneshot::Receiver<()>,
}

impl GateWaiter {
    /// Waits until the token is signalled, dropped, or `deadline` passes.
    pub async fn wait_until(self, deadline: tokio::time::Instant) -> GateOutcome {
        let Self { shared, rx } = self;
        match tokio::time::timeout_at(deadline, rx).await {
            Ok(Ok(())) => GateOutcome::Completed(shared.opened.elapsed()),
            Ok(Err(_)) if shared.is_completed() => GateOutcome::Completed(shared.opened.elapsed()),
            Ok(Err(_)) => {
                shared.expire();
                GateOutcome::Dropped
            }
            Err(_) => {
                if shared.expire() {
                    GateOutcome::TimedOut(shared.timeout)
                } else {
                    GateOutcome::Completed(shared.opened.elapsed())
                }
            }
        }
    }

    /// Marks the gate timed out without waiting, once the deadline passed
    /// elsewhere.
    ///
    /// Any later signal becomes a late-signal warning.
    pub fn expire(self) {
        self.shared.expire();
    }

    /// Closes the gate after the step failed before its deadline.
    ///
    /// A later signal is discarded without a warning.
    pub fn abandon(self) {
        self.shared.abandon();
    }

    /// Returns the configured timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.shared.timeout
    }
}
