//! Hook and test bodies.
//!
//! A [`Step`] is either synchronous, running to completion on the driver, or
//! asynchronous, receiving a [`Done`] token and holding its suite until the
//! token is signalled or the timeout passes.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::context::TestContext;
use crate::error::{HarnessError, Result};
use crate::gate::{CompletionGate, Done, GateOutcome, WarningSink};
use crate::types::StepKind;

/// Boxed future returned by asynchronous steps.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type SyncFn<C> = dyn Fn(TestContext<C>) -> Result<()> + Send + Sync;
type AsyncFn<C> = dyn Fn(TestContext<C>, Done) -> BoxFuture<Result<()>> + Send + Sync;

/// Body of a hook or a test case.
pub enum Step<C> {
    /// Runs to completion when called.
    Sync(Arc<SyncFn<C>>),
    /// Completes when its [`Done`] token is signalled.
    Async(Arc<AsyncFn<C>>),
}

impl<C> Clone for Step<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(f) => Self::Sync(Arc::clone(f)),
            Self::Async(f) => Self::Async(Arc::clone(f)),
        }
    }
}

impl<C> std::fmt::Debug for Step<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Step::Sync"),
            Self::Async(_) => f.write_str("Step::Async"),
        }
    }
}

impl<C: Send + Sync + 'static> Step<C> {
    /// Creates a synchronous step.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(TestContext<C>) -> Result<()> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Creates an asynchronous step that must signal its [`Done`] token.
    pub fn with_done<F, Fut>(f: F) -> Self
    where
        F: Fn(TestContext<C>, Done) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::Async(Arc::new(move |ctx, done| Box::pin(f(ctx, done))))
    }

    /// Returns true if the step waits for a completion signal.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    /// Executes the step.
    ///
    /// Synchronous steps have no timeout. Asynchronous steps run in their own
    /// task; they finish once both the future has resolved and the token has
    /// been signalled, and fail when `timeout` passes first.
    pub async fn execute(
        &self,
        ctx: TestContext<C>,
        kind: StepKind,
        timeout: Duration,
        warnings: &WarningSink,
    ) -> Result<()> {
        match self {
            Self::Sync(f) => {
                let f = Arc::clone(f);
                match std::panic::catch_unwind(AssertUnwindSafe(move || f(ctx))) {
                    Ok(result) => result.map_err(|e| step_error(kind, e)),
                    Err(payload) => Err(panicked(kind, payload.as_ref())),
                }
            }
            Self::Async(f) => {
                let deadline = tokio::time::Instant::now() + timeout;
                let (done, waiter) = CompletionGate::open(
                    ctx.suite_name(),
                    ctx.test_name(),
                    kind,
                    timeout,
                    Arc::clone(warnings),
                );
                let mut task = tokio::spawn(f(ctx, done));

                match tokio::time::timeout_at(deadline, &mut task).await {
                    Ok(Ok(Ok(()))) => {}
                    Ok(Ok(Err(e))) => {
                        waiter.abandon();
                        return Err(step_error(kind, e));
                    }
                    Ok(Err(join_err)) => {
                        waiter.abandon();
                        if join_err.is_panic() {
                            let payload = join_err.into_panic();
                            return Err(panicked(kind, payload.as_ref()));
                        }
                        return Err(step_error(kind, HarnessError::state("step task cancelled")));
                    }
                    Err(_) => {
                        task.abort();
                        waiter.expire();
                        tracing::warn!(step = %kind, ?timeout, "step future did not resolve in time");
                        return Err(timed_out(kind, timeout));
                    }
                }

                match waiter.wait_until(deadline).await {
                    GateOutcome::Completed(elapsed) => {
                        tracing::debug!(step = %kind, ?elapsed, "step signalled completion");
                        Ok(())
                    }
                    GateOutcome::TimedOut(timeout) => Err(timed_out(kind, timeout)),
                    GateOutcome::Dropped => Err(HarnessError::CompletionDropped),
                }
            }
        }
    }
}

fn timed_out(kind: StepKind, timeout: Duration) -> HarnessError {
    match kind {
        StepKind::Hook => HarnessError::HookTimeout(timeout),
        StepKind::Body => HarnessError::AsyncTimeout(timeout),
    }
}

fn step_error(kind: StepKind, err: HarnessError) -> HarnessError {
    match kind {
        StepKind::Hook => HarnessError::hook(err.to_string()),
        StepKind::Body if err.is_case_error() => err,
        StepKind::Body => HarnessError::body(err.to_string()),
    }
}

fn panicked(kind: StepKind, payload: &(dyn Any + Send)) -> HarnessError {
    let msg = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    match kind {
        StepKind::Hook => HarnessError::hook(format!("panicked: {msg}")),
        StepKind::Body => HarnessError::BodyPanicked(msg),
    }
}
