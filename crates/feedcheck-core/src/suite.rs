//! Suite registry.
//!
//! Suites, test cases and hooks are declared while the run is `Idle`.
//! Declaration order is execution order. The first registration error is
//! remembered so that the run refuses to start.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HookPolicy;
use crate::error::{HarnessError, Result};
use crate::hook::HookChain;
use crate::step::Step;
use crate::types::{RunId, RunState, SuiteId, TestId};

/// Handle returned by `declare_suite`, used to attach tests and hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteHandle {
    id: SuiteId,
    name: Arc<str>,
    run: RunId,
}

impl SuiteHandle {
    /// Returns the suite id.
    #[must_use]
    pub const fn id(&self) -> SuiteId {
        self.id
    }

    /// Returns the suite name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A declared test case.
pub struct TestCase<C> {
    /// Case id.
    pub id: TestId,
    /// Case description.
    pub description: Arc<str>,
    /// Case body.
    pub body: Step<C>,
}

impl<C> Clone for TestCase<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            description: Arc::clone(&self.description),
            body: self.body.clone(),
        }
    }
}

impl<C> std::fmt::Debug for TestCase<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("body", &self.body)
            .finish()
    }
}

/// A declared suite.
pub struct Suite<C> {
    /// Suite id.
    pub id: SuiteId,
    /// Suite name.
    pub name: Arc<str>,
    /// Cases in declaration order.
    pub tests: Vec<TestCase<C>>,
    /// Before-each hooks.
    pub hooks: HookChain<C>,
    /// Completion timeout override.
    pub timeout: Option<Duration>,
}

impl<C> Clone for Suite<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: Arc::clone(&self.name),
            tests: self.tests.clone(),
            hooks: self.hooks.clone(),
            timeout: self.timeout,
        }
    }
}

impl<C> std::fmt::Debug for Suite<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("tests", &self.tests)
            .field("hooks", &self.hooks)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Registry of suites for one run.
pub struct SuiteRegistry<C> {
    run: RunId,
    policy: HookPolicy,
    state: RunState,
    suites: Vec<Suite<C>>,
    names: HashSet<Arc<str>>,
    setup_error: Option<HarnessError>,
}

impl<C: Send + Sync + 'static> SuiteRegistry<C> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(run: RunId, policy: HookPolicy) -> Self {
        Self {
            run,
            policy,
            state: RunState::Idle,
            suites: Vec::new(),
            names: HashSet::new(),
            setup_error: None,
        }
    }

    /// Declares a suite.
    ///
    /// # Errors
    /// Returns `LateRegistration` once the run started and `DuplicateSuite`
    /// if the name is taken.
    pub fn declare_suite(&mut self, name: &str) -> Result<SuiteHandle> {
        self.ensure_idle(|| format!("suite '{name}' declared after the run started"))?;
        if self.names.contains(name) {
            return Err(self.remember(HarnessError::DuplicateSuite(name.to_string())));
        }
        let name: Arc<str> = Arc::from(name);
        let id = SuiteId(self.suites.len());
        self.names.insert(Arc::clone(&name));
        self.suites.push(Suite {
            id,
            name: Arc::clone(&name),
            tests: Vec::new(),
            hooks: HookChain::default(),
            timeout: None,
        });
        tracing::debug!(suite = %name, id = id.index(), "suite declared");
        Ok(SuiteHandle {
            id,
            name,
            run: self.run,
        })
    }

    /// Declares a test case in a suite.
    ///
    /// # Errors
    /// Returns `LateRegistration` once the run started and `UnknownSuite`
    /// for a handle from another registry.
    pub fn declare_test(&mut self, suite: &SuiteHandle, description: &str, body: Step<C>) -> Result<TestId> {
        self.ensure_idle(|| {
            format!("test '{description}' declared in '{}' after the run started", suite.name)
        })?;
        let entry = match self.suite_mut(suite) {
            Ok(entry) => entry,
            Err(e) => return Err(self.remember(e)),
        };
        let id = TestId {
            suite: entry.id,
            index: entry.tests.len(),
        };
        entry.tests.push(TestCase {
            id,
            description: Arc::from(description),
            body,
        });
        Ok(id)
    }

    /// Declares a before-each hook.
    ///
    /// # Errors
    /// Returns `LateRegistration` once the run started, `UnknownSuite`, or
    /// `DuplicateHook` under the exclusive policy.
    pub fn declare_before_each(&mut self, suite: &SuiteHandle, hook: Step<C>) -> Result<()> {
        self.ensure_idle(|| format!("hook declared in '{}' after the run started", suite.name))?;
        let policy = self.policy;
        let result = self
            .suite_mut(suite)
            .and_then(|entry| entry.hooks.add(policy, &suite.name, hook));
        result.map_err(|e| self.remember(e))
    }

    /// Overrides the completion timeout for one suite.
    ///
    /// # Errors
    /// Returns `LateRegistration`, `UnknownSuite`, or `Config` for a zero timeout.
    pub fn set_suite_timeout(&mut self, suite: &SuiteHandle, timeout: Duration) -> Result<()> {
        self.ensure_idle(|| format!("timeout of '{}' changed after the run started", suite.name))?;
        if timeout.is_zero() {
            return Err(self.remember(HarnessError::config("suite timeout must be greater than 0")));
        }
        match self.suite_mut(suite) {
            Ok(entry) => {
                entry.timeout = Some(timeout);
                Ok(())
            }
            Err(e) => Err(self.remember(e)),
        }
    }

    /// Closes registration and returns the execution plan.
    ///
    /// # Errors
    /// Returns `SetupAborted` if any registration failed, or `InvalidState`
    /// if the run already started.
    pub fn start(&mut self) -> Result<Vec<Suite<C>>> {
        if !self.state.accepts_registration() {
            return Err(HarnessError::state("run already started"));
        }
        if let Some(err) = self.setup_error.clone() {
            return Err(HarnessError::SetupAborted(Box::new(err)));
        }
        self.state = RunState::Running;
        Ok(self.suites.clone())
    }

    /// Marks the run finalized.
    pub fn finish(&mut self) {
        self.state = RunState::Finalized;
    }

    /// Returns the run state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Returns the declared suite names in order.
    #[must_use]
    pub fn suite_names(&self) -> Vec<String> {
        self.suites.iter().map(|s| s.name.to_string()).collect()
    }

    /// Returns the first registration error, if any.
    #[must_use]
    pub const fn setup_error(&self) -> Option<&HarnessError> {
        self.setup_error.as_ref()
    }

    fn ensure_idle(&self, what: impl FnOnce() -> String) -> Result<()> {
        if self.state.accepts_registration() {
            Ok(())
        } else {
            let msg = what();
            tracing::warn!(reason = %msg, "late registration rejected");
            Err(HarnessError::LateRegistration(msg))
        }
    }

    fn suite_mut(&mut self, handle: &SuiteHandle) -> Result<&mut Suite<C>> {
        if handle.run != self.run {
            return Err(HarnessError::UnknownSuite(handle.name.to_string()));
        }
        self.suites
            .get_mut(handle.id.index())
            .ok_or_else(|| HarnessError::UnknownSuite(handle.name.to_string()))
    }

    fn remember(&mut self, err: HarnessError) -> HarnessError {
        if self.setup_error.is_none() {
            tracing::error!(error = %err, "registration failed, run will not start");
            self.setup_error = Some(err.clone());
        }
        err
    }
}
