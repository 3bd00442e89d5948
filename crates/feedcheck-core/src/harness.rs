//! Run driver.
//!
//! [`Harness`] owns the registry, the injected fixture and the run's warning
//! sink. [`Harness::run`] closes registration, executes every case in
//! declaration order and freezes the report.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::Instrument;

use crate::config::HarnessConfig;
use crate::context::{CaseRecorder, TestContext};
use crate::error::Result;
use crate::gate::WarningSink;
use crate::reporter::{CaseOutcome, Report, ResultReporter};
use crate::step::Step;
use crate::suite::{Suite, SuiteHandle, SuiteRegistry, TestCase};
use crate::types::{CasePhase, RunId, RunState, StepKind, TestId};

struct HarnessInner<C> {
    config: HarnessConfig,
    run_id: RunId,
    fixture: Arc<C>,
    registry: RwLock<SuiteRegistry<C>>,
    warnings: WarningSink,
    report: OnceLock<Arc<Report>>,
}

/// Suite-based async test harness over a fixture `C`.
///
/// Cheap to clone; clones share the same registry and run.
pub struct Harness<C> {
    inner: Arc<HarnessInner<C>>,
}

impl<C> Clone for Harness<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Send + Sync + 'static> Harness<C> {
    /// Creates a harness that hands `fixture` to every hook and body.
    ///
    /// # Errors
    /// Returns `Config` if the configuration is invalid.
    pub fn new(config: HarnessConfig, fixture: C) -> Result<Self> {
        Self::with_shared_fixture(config, Arc::new(fixture))
    }

    /// Creates a harness over a fixture the caller keeps a handle to.
    ///
    /// # Errors
    /// Returns `Config` if the configuration is invalid.
    pub fn with_shared_fixture(config: HarnessConfig, fixture: Arc<C>) -> Result<Self> {
        config.validate()?;
        let run_id = RunId::new();
        tracing::debug!(run = %run_id, name = %config.name, "harness created");
        let registry = SuiteRegistry::new(run_id, config.hook_policy);
        Ok(Self {
            inner: Arc::new(HarnessInner {
                config,
                run_id,
                fixture,
                registry: RwLock::new(registry),
                warnings: WarningSink::default(),
                report: OnceLock::new(),
            }),
        })
    }

    /// Declares a suite.
    ///
    /// # Errors
    /// See [`SuiteRegistry::declare_suite`].
    pub fn declare_suite(&self, name: &str) -> Result<SuiteHandle> {
        self.inner.registry.write().declare_suite(name)
    }

    /// Declares a test case.
    ///
    /// # Errors
    /// See [`SuiteRegistry::declare_test`].
    pub fn declare_test(&self, suite: &SuiteHandle, description: &str, body: Step<C>) -> Result<TestId> {
        self.inner.registry.write().declare_test(suite, description, body)
    }

    /// Declares a before-each hook.
    ///
    /// # Errors
    /// See [`SuiteRegistry::declare_before_each`].
    pub fn declare_before_each(&self, suite: &SuiteHandle, hook: Step<C>) -> Result<()> {
        self.inner.registry.write().declare_before_each(suite, hook)
    }

    /// Overrides the completion timeout of one suite.
    ///
    /// # Errors
    /// See [`SuiteRegistry::set_suite_timeout`].
    pub fn set_suite_timeout(&self, suite: &SuiteHandle, timeout: Duration) -> Result<()> {
        self.inner.registry.write().set_suite_timeout(suite, timeout)
    }

    /// Returns the run state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.inner.registry.read().state()
    }

    /// Returns the run id.
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.inner.run_id
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.inner.config
    }

    /// Returns the injected fixture.
    #[must_use]
    pub fn fixture(&self) -> &Arc<C> {
        &self.inner.fixture
    }

    /// Returns the finalized report, if the run finished.
    #[must_use]
    pub fn report(&self) -> Option<Arc<Report>> {
        self.inner.report.get().cloned()
    }

    /// Executes every declared case and returns the finalized report.
    ///
    /// # Errors
    /// Returns `SetupAborted` if any registration failed and `InvalidState`
    /// if the run already started. Case failures never abort the run.
    pub async fn run(&self) -> Result<Arc<Report>> {
        let plan = self.inner.registry.write().start()?;
        let inner = &self.inner;
        let span = tracing::info_span!("run", run = %inner.run_id, name = %inner.config.name);
        tracing::info!(parent: &span, suites = plan.len(), "run started");

        let mut reporter =
            ResultReporter::new(inner.run_id, inner.config.name.clone(), Arc::clone(&inner.warnings));
        for suite in &plan {
            self.run_suite(suite, &mut reporter).instrument(span.clone()).await?;
        }

        let report = reporter.finalize();
        inner.registry.write().finish();
        let report = Arc::clone(inner.report.get_or_init(|| report));
        tracing::info!(parent: &span, summary = %report.summary(), "run finished");
        Ok(report)
    }

    async fn run_suite(&self, suite: &Suite<C>, reporter: &mut ResultReporter) -> Result<()> {
        reporter.begin_suite(suite.id, suite.name.to_string())?;
        let timeout = suite.timeout.unwrap_or(self.inner.config.default_timeout);
        let span = tracing::info_span!("suite", suite = %suite.name);
        for case in &suite.tests {
            let outcome = self.run_case(suite, case, timeout).instrument(span.clone()).await;
            reporter.record_outcome(suite.id, case.id, outcome)?;
        }
        tracing::debug!(parent: &span, cases = suite.tests.len(), "suite finished");
        Ok(())
    }

    async fn run_case(&self, suite: &Suite<C>, case: &TestCase<C>, timeout: Duration) -> CaseOutcome {
        let started = Instant::now();
        let recorder = Arc::new(CaseRecorder::default());
        let ctx = TestContext::new(
            Arc::clone(&suite.name),
            Arc::clone(&case.description),
            Arc::clone(&self.inner.fixture),
            Arc::clone(&recorder),
        );
        let warnings = &self.inner.warnings;
        let mut phase = CasePhase::PendingHook;
        recorder.activate();

        phase = advance(phase, &case.description);
        let error = match suite.hooks.run_before(&ctx, timeout, warnings).await {
            Err(e) => Some(e),
            Ok(_) => {
                phase = advance(advance(phase, &case.description), &case.description);
                case.body.execute(ctx, StepKind::Body, timeout, warnings).await.err()
            }
        };

        let expectations = recorder.seal();
        let duration = started.elapsed();
        match &error {
            Some(e) => tracing::warn!(test = %case.description, ?phase, error = %e, "case failed"),
            None if expectations.iter().any(|e| !e.passed) => {
                tracing::info!(test = %case.description, ?duration, "case failed expectations");
            }
            None => tracing::debug!(test = %case.description, ?duration, "case passed"),
        }
        tracing::trace!(test = %case.description, phase = ?CasePhase::Recorded, "case recorded");

        CaseOutcome {
            description: case.description.to_string(),
            expectations,
            error,
            duration,
        }
    }
}

fn advance(phase: CasePhase, test: &str) -> CasePhase {
    let next = phase.next();
    tracing::trace!(test, from = ?phase, to = ?next, "case phase");
    next
}
