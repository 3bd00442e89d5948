//! Result reporter.
//!
//! Outcomes are recorded incrementally while the run executes. `finalize`
//! freezes them into an immutable [`Report`] snapshot; calling it again
//! returns the same snapshot.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};

use crate::error::{HarnessError, Result};
use crate::expect::ExpectationOutcome;
use crate::gate::{LateSignalWarning, WarningSink};
use crate::types::{RunId, SuiteId, TestId};

/// Recorded outcome of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    /// Case id.
    pub id: TestId,
    /// Case description.
    pub description: String,
    /// Every expectation evaluated by the hook and the body, in order.
    pub expectations: Vec<ExpectationOutcome>,
    /// Case-level error (timeout, hook failure, body error or panic).
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<HarnessError>,
    /// Wall time from hook start to recording, in milliseconds.
    pub duration_ms: u64,
}

impl CaseReport {
    /// Returns true if there is no case error and every expectation passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.expectations.iter().all(|e| e.passed)
    }

    /// Returns every failure message of this case, case error first.
    #[must_use]
    pub fn failure_messages(&self) -> Vec<String> {
        self.error
            .iter()
            .map(ToString::to_string)
            .chain(self.expectations.iter().filter_map(|e| e.message.clone()))
            .collect()
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<HarnessError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Recorded outcomes of one suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Suite id.
    pub id: SuiteId,
    /// Suite name.
    pub name: String,
    /// Cases in declaration order.
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Number of passing cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    /// Number of failing cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }
}

/// Immutable snapshot of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Run id.
    pub run_id: RunId,
    /// Run name from the configuration.
    pub name: String,
    /// Suites in declaration order.
    pub suites: Vec<SuiteReport>,
    /// Completion signals that arrived after their timeout.
    pub warnings: Vec<LateSignalWarning>,
    /// Total run time in milliseconds.
    pub duration_ms: u64,
}

impl Report {
    /// Number of passing cases across all suites.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.suites.iter().map(SuiteReport::passed).sum()
    }

    /// Number of failing cases across all suites.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.suites.iter().map(SuiteReport::failed).sum()
    }

    /// Returns true if no case failed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// `"N passed, M failed"`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} passed, {} failed", self.passed(), self.failed())
    }

    /// Looks up a case by suite name and description.
    #[must_use]
    pub fn case(&self, suite: &str, description: &str) -> Option<&CaseReport> {
        self.suites
            .iter()
            .find(|s| s.name == suite)?
            .cases
            .iter()
            .find(|c| c.description == description)
    }

    /// Iterates failing cases as `(suite name, case)`.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &CaseReport)> {
        self.suites.iter().flat_map(|suite| {
            suite
                .cases
                .iter()
                .filter(|c| !c.passed())
                .map(move |c| (suite.name.as_str(), c))
        })
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| HarnessError::Serialization(e.to_string()))
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}: {}", self.name, self.summary())?;
        for (suite, case) in self.failures() {
            writeln!(f, "  FAILED {suite} › {}", case.description)?;
            for message in case.failure_messages() {
                writeln!(f, "    {message}")?;
            }
        }
        for warning in &self.warnings {
            writeln!(f, "  WARN {warning}")?;
        }
        Ok(())
    }
}

/// Outcome handed to the reporter when a case is recorded.
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    /// Case description.
    pub description: String,
    /// Expectations evaluated during the case.
    pub expectations: Vec<ExpectationOutcome>,
    /// Case-level error, if any.
    pub error: Option<HarnessError>,
    /// Case duration.
    pub duration: Duration,
}

/// Aggregates outcomes during a run.
pub struct ResultReporter {
    run_id: RunId,
    name: String,
    suites: Vec<SuiteReport>,
    warnings: WarningSink,
    started: Instant,
    snapshot: OnceLock<Arc<Report>>,
}

impl ResultReporter {
    /// Creates a reporter for one run.
    #[must_use]
    pub fn new(run_id: RunId, name: impl Into<String>, warnings: WarningSink) -> Self {
        Self {
            run_id,
            name: name.into(),
            suites: Vec::new(),
            warnings,
            started: Instant::now(),
            snapshot: OnceLock::new(),
        }
    }

    /// Opens a suite entry so that suites without cases still appear.
    ///
    /// # Errors
    /// Returns `InvalidState` after finalization.
    pub fn begin_suite(&mut self, id: SuiteId, name: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.suites.push(SuiteReport {
            id,
            name: name.into(),
            cases: Vec::new(),
        });
        Ok(())
    }

    /// Records one case outcome.
    ///
    /// # Errors
    /// Returns `InvalidState` after finalization and `UnknownSuite` if the
    /// suite was never opened.
    pub fn record_outcome(&mut self, suite: SuiteId, test: TestId, outcome: CaseOutcome) -> Result<()> {
        self.ensure_open()?;
        let entry = self
            .suites
            .iter_mut()
            .find(|s| s.id == suite)
            .ok_or_else(|| HarnessError::UnknownSuite(format!("suite #{}", suite.index())))?;
        entry.cases.push(CaseReport {
            id: test,
            description: outcome.description,
            expectations: outcome.expectations,
            error: outcome.error,
            duration_ms: outcome.duration.as_millis() as u64,
        });
        Ok(())
    }

    /// Freezes the report. Later calls return the same snapshot.
    pub fn finalize(&self) -> Arc<Report> {
        Arc::clone(self.snapshot.get_or_init(|| {
            let report = Report {
                run_id: self.run_id,
                name: self.name.clone(),
                suites: self.suites.clone(),
                warnings: self.warnings.lock().clone(),
                duration_ms: self.started.elapsed().as_millis() as u64,
            };
            tracing::info!(run = %report.run_id, summary = %report.summary(), "run finalized");
            Arc::new(report)
        }))
    }

    /// Returns true once `finalize` has been called.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.snapshot.get().is_some()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_finalized() {
            return Err(HarnessError::state("report already finalized"));
        }
        Ok(())
    }
}
