//! Lifecycle hook runner.
//!
//! Holds the before-each hooks of one suite and runs them ahead of every test
//! case. Under [`HookPolicy::Exclusive`] a suite has at most one hook; under
//! [`HookPolicy::Chain`] hooks run in declaration order and the first failure
//! stops the chain.

use std::time::Duration;

use crate::config::HookPolicy;
use crate::context::TestContext;
use crate::error::{HarnessError, Result};
use crate::gate::WarningSink;
use crate::step::Step;
use crate::types::StepKind;

/// Before-each hooks of one suite.
pub struct HookChain<C> {
    hooks: Vec<Step<C>>,
}

impl<C> Clone for HookChain<C> {
    fn clone(&self) -> Self {
        Self {
            hooks: self.hooks.clone(),
        }
    }
}

impl<C> std::fmt::Debug for HookChain<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.hooks).finish()
    }
}

impl<C> Default for HookChain<C> {
    fn default() -> Self {
        Self { hooks: Vec::new() }
    }
}

impl<C: Send + Sync + 'static> HookChain<C> {
    /// Adds a hook according to `policy`.
    ///
    /// # Errors
    /// Returns `DuplicateHook` if the policy is exclusive and a hook exists.
    pub fn add(&mut self, policy: HookPolicy, suite: &str, hook: Step<C>) -> Result<()> {
        if policy == HookPolicy::Exclusive && !self.hooks.is_empty() {
            return Err(HarnessError::DuplicateHook(suite.to_string()));
        }
        self.hooks.push(hook);
        Ok(())
    }

    /// Returns the number of hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if the suite has no hooks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs every hook before a test case.
    ///
    /// Returns the number of hooks that completed.
    ///
    /// # Errors
    /// Returns `HookTimeout`, `HookFailed` or `CompletionDropped` for the
    /// first hook that does not complete.
    pub async fn run_before(
        &self,
        ctx: &TestContext<C>,
        timeout: Duration,
        warnings: &WarningSink,
    ) -> Result<usize> {
        for (position, hook) in self.hooks.iter().enumerate() {
            tracing::trace!(
                suite = ctx.suite_name(),
                test = ctx.test_name(),
                hook = position,
                "running before-each"
            );
            if let Err(e) = hook.execute(ctx.clone(), StepKind::Hook, timeout, warnings).await {
                tracing::warn!(
                    suite = ctx.suite_name(),
                    test = ctx.test_name(),
                    hook = position,
                    error = %e,
                    "before-each did not complete"
                );
                return Err(e);
            }
        }
        Ok(self.hooks.len())
    }
}
