//! Falsification Tests: Category B - Completion Gates and Failure Isolation (F010-F029)

use std::sync::Arc;
use std::time::{Duration, Instant};

use feedcheck_core::{
    Done, Harness, HarnessConfig, HarnessError, RunState, Step, StepKind, TestContext,
};
use parking_lot::Mutex;

type Slot = Mutex<Option<feedcheck_core::Result<bool>>>;

fn config(timeout: Duration) -> HarnessConfig {
    HarnessConfig::new("completion").with_timeout(timeout)
}

fn never_signals<C: Send + Sync + 'static>() -> Step<C> {
    Step::with_done(|_ctx: TestContext<C>, done: Done| async move {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(done);
        });
        Ok(())
    })
}

fn signals_after<C: Send + Sync + 'static>(delay: Duration) -> Step<C> {
    Step::with_done(move |_ctx: TestContext<C>, done: Done| async move {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = done.complete();
        });
        Ok(())
    })
}

fn passes<C: Send + Sync + 'static>() -> Step<C> {
    Step::sync(|ctx: TestContext<C>| {
        ctx.expect(true).to_be_truthy()?;
        Ok(())
    })
}

// =============================================================================
// F010-F014: Timeouts
// =============================================================================

/// F010: A body that never signals fails with `AsyncTimeout` within timeout + epsilon
///
/// # Falsification Attempt
/// Hold the completion token forever; if the run stalls or the case is not
/// marked failed, the claim is falsified.
#[tokio::test]
async fn f010_timeout_law() {
    let timeout = Duration::from_millis(50);
    let harness = Harness::new(config(timeout), ()).unwrap();
    let suite = harness.declare_suite("Initial Entries").unwrap();
    harness.declare_test(&suite, "never signals", never_signals()).unwrap();

    let started = Instant::now();
    let report = harness.run().await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(harness.state(), RunState::Finalized);
    assert!(elapsed >= timeout);
    assert!(
        elapsed < timeout + Duration::from_secs(1),
        "F010 FALSIFIED: run took {elapsed:?} with a {timeout:?} timeout"
    );
    let case = report.case("Initial Entries", "never signals").unwrap();
    assert_eq!(case.error, Some(HarnessError::AsyncTimeout(timeout)));
    assert!(!case.passed());
}

/// F011: A timed-out case does not stop its siblings
#[tokio::test]
async fn f011_timeout_is_isolated() {
    let harness = Harness::new(config(Duration::from_millis(30)), ()).unwrap();
    let suite = harness.declare_suite("s").unwrap();
    harness.declare_test(&suite, "stalls", never_signals()).unwrap();
    harness.declare_test(&suite, "after", passes()).unwrap();
    let other = harness.declare_suite("t").unwrap();
    harness.declare_test(&other, "next suite", passes()).unwrap();

    let report = harness.run().await.unwrap();
    assert_eq!(report.summary(), "2 passed, 1 failed");
    assert!(report.case("s", "after").unwrap().passed());
    assert!(report.case("t", "next suite").unwrap().passed());
}

/// F012: A hook timeout fails the case, skips its body, and the suite continues
#[tokio::test]
async fn f012_hook_timeout_skips_body() {
    let timeout = Duration::from_millis(30);
    let harness = Harness::new(config(timeout), Mutex::new(0_u32)).unwrap();
    let suite = harness.declare_suite("Initial Entries").unwrap();
    harness.declare_before_each(&suite, never_signals()).unwrap();
    harness
        .declare_test(
            &suite,
            "body",
            Step::sync(|ctx: TestContext<Mutex<u32>>| {
                *ctx.fixture().lock() += 1;
                Ok(())
            }),
        )
        .unwrap();
    harness.declare_test(&suite, "second body", passes()).unwrap();

    let report = harness.run().await.unwrap();
    for case in &report.suites[0].cases {
        assert_eq!(case.error, Some(HarnessError::HookTimeout(timeout)));
        assert!(case.expectations.is_empty());
    }
    assert_eq!(*harness.fixture().lock(), 0, "F012 FALSIFIED: body ran after hook timeout");
}

/// F013: A signal after the timeout is a warning, not a crash
///
/// # Falsification Attempt
/// Signal 60ms after a 20ms timeout while the run is still going; if the
/// harness panics, re-runs the case, or drops the warning, the claim is falsified.
#[tokio::test]
async fn f013_late_signal_reported_as_warning() {
    let harness = Harness::new(config(Duration::from_millis(20)), ()).unwrap();
    let slow = harness.declare_suite("slow").unwrap();
    harness
        .declare_test(&slow, "signals late", signals_after(Duration::from_millis(60)))
        .unwrap();
    let keeper = harness.declare_suite("keeper").unwrap();
    harness.set_suite_timeout(&keeper, Duration::from_secs(2)).unwrap();
    harness
        .declare_test(&keeper, "outlives the late signal", signals_after(Duration::from_millis(200)))
        .unwrap();

    let report = harness.run().await.unwrap();
    let late = report.case("slow", "signals late").unwrap();
    assert_eq!(late.error, Some(HarnessError::AsyncTimeout(Duration::from_millis(20))));
    assert!(report.case("keeper", "outlives the late signal").unwrap().passed());

    assert_eq!(report.warnings.len(), 1, "F013 FALSIFIED: late signal not reported");
    let warning = &report.warnings[0];
    assert_eq!(warning.suite, "slow");
    assert_eq!(warning.test, "signals late");
    assert_eq!(warning.step, StepKind::Body);
    assert_eq!(warning.timeout_ms, 20);
    assert!(warning.signalled_after_ms >= 60);
    assert!(report.to_string().contains("WARN slow › signals late"));
}

/// F014: Per-suite timeout overrides the default
#[tokio::test]
async fn f014_suite_timeout_override() {
    let harness = Harness::new(config(Duration::from_millis(20)), ()).unwrap();
    let patient = harness.declare_suite("patient").unwrap();
    harness.set_suite_timeout(&patient, Duration::from_millis(500)).unwrap();
    harness
        .declare_test(&patient, "signals at 50ms", signals_after(Duration::from_millis(50)))
        .unwrap();
    let strict = harness.declare_suite("strict").unwrap();
    harness
        .declare_test(&strict, "signals at 50ms", signals_after(Duration::from_millis(50)))
        .unwrap();

    let report = harness.run().await.unwrap();
    assert!(report.case("patient", "signals at 50ms").unwrap().passed());
    assert!(!report.case("strict", "signals at 50ms").unwrap().passed());
}

// =============================================================================
// F015-F019: Dropped tokens, panics and body errors
// =============================================================================

/// F015: Dropping the token fails the step immediately
#[tokio::test]
async fn f015_dropped_token_fails_fast() {
    let harness = Harness::new(config(Duration::from_secs(30)), ()).unwrap();
    let suite = harness.declare_suite("s").unwrap();
    harness
        .declare_test(
            &suite,
            "drops",
            Step::with_done(|_ctx: TestContext<()>, done: Done| async move {
                drop(done);
                Ok(())
            }),
        )
        .unwrap();

    let started = Instant::now();
    let report = harness.run().await.unwrap();
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "F015 FALSIFIED: dropped token waited for the timeout"
    );
    assert_eq!(
        report.case("s", "drops").unwrap().error,
        Some(HarnessError::CompletionDropped)
    );
}

/// F016: A panicking body is recorded and the run continues
#[tokio::test]
async fn f016_body_panic_isolated() {
    let harness = Harness::new(config(Duration::from_millis(500)), ()).unwrap();
    let suite = harness.declare_suite("s").unwrap();
    harness
        .declare_test(
            &suite,
            "sync panic",
            Step::sync(|_ctx: TestContext<()>| -> feedcheck_core::Result<()> {
                panic!("container missing")
            }),
        )
        .unwrap();
    harness
        .declare_test(
            &suite,
            "async panic",
            Step::with_done(|ctx: TestContext<()>, _done: Done| async move {
                if ctx.test_name() == "async panic" {
                    panic!("loader exploded");
                }
                Ok(())
            }),
        )
        .unwrap();
    harness.declare_test(&suite, "survivor", passes()).unwrap();

    let report = harness.run().await.unwrap();
    assert_eq!(
        report.case("s", "sync panic").unwrap().error,
        Some(HarnessError::BodyPanicked("container missing".into()))
    );
    assert_eq!(
        report.case("s", "async panic").unwrap().error,
        Some(HarnessError::BodyPanicked("loader exploded".into()))
    );
    assert!(report.case("s", "survivor").unwrap().passed());
}

/// F017: A body returning an error is recorded as `BodyFailed`
#[tokio::test]
async fn f017_body_error_recorded() {
    let harness = Harness::new(config(Duration::from_millis(500)), ()).unwrap();
    let suite = harness.declare_suite("s").unwrap();
    harness
        .declare_test(
            &suite,
            "errors",
            Step::sync(|_ctx: TestContext<()>| Err(HarnessError::config("fixture unusable"))),
        )
        .unwrap();
    harness
        .declare_before_each(
            &suite,
            Step::sync(|ctx: TestContext<()>| {
                ctx.expect(ctx.suite_name()).to_contain("s")?;
                Ok(())
            }),
        )
        .unwrap();

    let report = harness.run().await.unwrap();
    let case = report.case("s", "errors").unwrap();
    assert!(matches!(case.error, Some(HarnessError::BodyFailed(ref msg)) if msg.contains("fixture unusable")));
    assert_eq!(case.expectations.len(), 1, "hook expectations belong to the case");
}

/// F018: Expectations after a case was recorded fail with `NoActiveTest`
///
/// # Falsification Attempt
/// Leak the context into a background task that evaluates a matcher after
/// the case finished; if the outcome lands in any report, the claim is falsified.
#[tokio::test]
async fn f018_expectation_after_recording_rejected() {
    let harness = Harness::new(config(Duration::from_secs(1)), Slot::default()).unwrap();
    let suite = harness.declare_suite("s").unwrap();
    harness
        .declare_test(
            &suite,
            "leaks context",
            Step::sync(|ctx: TestContext<Slot>| {
                let leaked = ctx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    let result = leaked.expect(1).to_be(1);
                    *leaked.fixture().lock() = Some(result);
                });
                Ok(())
            }),
        )
        .unwrap();
    harness
        .declare_test(&suite, "waits", signals_after(Duration::from_millis(150)))
        .unwrap();

    let report = harness.run().await.unwrap();
    let leaked = harness.fixture().lock().clone();
    assert!(
        matches!(leaked, Some(Err(HarnessError::NoActiveTest(_)))),
        "F018 FALSIFIED: late expectation accepted: {leaked:?}"
    );
    for case in &report.suites[0].cases {
        assert!(case.expectations.is_empty());
    }
}

/// F019: A failing matcher does not stop the expectations after it
#[tokio::test]
async fn f019_failing_matcher_keeps_evaluating() {
    let harness = Harness::new(config(Duration::from_millis(500)), ()).unwrap();
    let suite = harness.declare_suite("s").unwrap();
    harness
        .declare_test(
            &suite,
            "three checks",
            Step::sync(|ctx: TestContext<()>| {
                ctx.expect(3).to_be_greater_than(0)?;
                ctx.expect(0).not().to_be(0)?;
                ctx.expect(vec!["a", "b"]).to_equal(["a", "b"])?;
                Ok(())
            }),
        )
        .unwrap();

    let report = harness.run().await.unwrap();
    let case = report.case("s", "three checks").unwrap();
    assert_eq!(case.expectations.len(), 3);
    let passed: Vec<_> = case.expectations.iter().map(|e| e.passed).collect();
    assert_eq!(passed, vec![true, false, true]);
    assert_eq!(case.expectations[1].matcher, "not.toBe");
    assert_eq!(case.failure_messages(), vec!["Expected 0 not to be 0.".to_string()]);
}

// =============================================================================
// F020-F022: Run state
// =============================================================================

/// F020: Running twice is rejected and keeps the first report
#[tokio::test]
async fn f020_run_twice_rejected() {
    let harness = Harness::new(config(Duration::from_millis(100)), ()).unwrap();
    let suite = harness.declare_suite("s").unwrap();
    harness.declare_test(&suite, "t", passes()).unwrap();

    let first = harness.run().await.unwrap();
    let err = harness.run().await.unwrap_err();
    assert!(matches!(err, HarnessError::InvalidState(_)));
    assert!(Arc::ptr_eq(&first, &harness.report().unwrap()));
}

/// F021: Running from inside a body is rejected without deadlock
#[tokio::test]
async fn f021_reentrant_run_rejected() {
    let harness = Harness::new(config(Duration::from_secs(1)), Slot::default()).unwrap();
    let suite = harness.declare_suite("s").unwrap();
    let inner = harness.clone();
    harness
        .declare_test(
            &suite,
            "reenters",
            Step::with_done(move |_ctx: TestContext<Slot>, done: Done| {
                let inner = inner.clone();
                async move {
                    let nested = inner.run().await.map(|_| true);
                    *inner.fixture().lock() = Some(nested);
                    done.complete()?;
                    Ok::<(), HarnessError>(())
                }
            }),
        )
        .unwrap();

    let report = tokio::time::timeout(Duration::from_secs(5), harness.run())
        .await
        .expect("F021 FALSIFIED: reentrant run deadlocked")
        .unwrap();
    assert!(report.all_passed());
    assert!(matches!(
        harness.fixture().lock().clone(),
        Some(Err(HarnessError::InvalidState(_)))
    ));
}

/// F022: A successful run passes through every state in order
#[tokio::test]
async fn f022_state_machine() {
    let harness = Harness::new(config(Duration::from_secs(1)), Slot::default()).unwrap();
    let suite = harness.declare_suite("s").unwrap();
    let observer = harness.clone();
    harness
        .declare_test(
            &suite,
            "observes",
            Step::sync(move |ctx: TestContext<Slot>| {
                ctx.expect(observer.state()).to_be(RunState::Running)?;
                Ok(())
            }),
        )
        .unwrap();

    assert_eq!(harness.state(), RunState::Idle);
    let report = harness.run().await.unwrap();
    assert!(report.all_passed());
    assert_eq!(harness.state(), RunState::Finalized);
}
