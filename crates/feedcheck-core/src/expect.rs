//! Expectation engine.
//!
//! `ctx.expect(actual)` builds an [`Expectation`]; `.not()` flips its negation
//! flag and a terminal matcher evaluates it exactly once, recording one
//! [`ExpectationOutcome`] against the running test case.
//!
//! Comparison semantics:
//! - `to_be` is primitive identity (`PartialEq` on the value itself)
//! - `to_equal` is deep structural equality through `PartialEq<U>`: derived
//!   impls compare field by field and collections element by element, so a
//!   `Vec` equals an array with the same items. Values of unrelated shapes
//!   (`Some(v)` against `v`, `None` against `()`) do not compile. Floats keep
//!   IEEE semantics, so `NaN` equals nothing
//! - `to_be_greater_than` / `to_be_less_than` use `PartialOrd`

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::context::CaseRecorder;
use crate::error::Result;

/// Outcome of one evaluated matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectationOutcome {
    /// Matcher name as written, e.g. `not.toBe`.
    pub matcher: String,
    /// Whether the expectation held.
    pub passed: bool,
    /// Failure message; `None` when passed.
    pub message: Option<String>,
}

impl ExpectationOutcome {
    /// Creates a passing outcome.
    #[must_use]
    pub fn pass(matcher: impl Into<String>) -> Self {
        Self {
            matcher: matcher.into(),
            passed: true,
            message: None,
        }
    }

    /// Creates a failing outcome with a message.
    #[must_use]
    pub fn fail(matcher: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            matcher: matcher.into(),
            passed: false,
            message: Some(message.into()),
        }
    }
}

/// Pending expectation over an actual value.
#[must_use = "an expectation does nothing until a matcher is called"]
pub struct Expectation<T> {
    actual: T,
    negated: bool,
    recorder: Arc<CaseRecorder>,
}

impl<T> Expectation<T> {
    pub(crate) fn new(actual: T, recorder: Arc<CaseRecorder>) -> Self {
        Self {
            actual,
            negated: false,
            recorder,
        }
    }

    /// Negates the next matcher.
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Returns true if the next matcher is negated.
    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    fn settle(self, name: &str, holds: bool, actual: String, predicate: String) -> Result<bool> {
        let passed = holds != self.negated;
        let matcher = if self.negated {
            format!("not.{name}")
        } else {
            name.to_string()
        };
        let outcome = if passed {
            ExpectationOutcome::pass(matcher)
        } else {
            let verb = if self.negated { " not" } else { "" };
            ExpectationOutcome::fail(matcher, format!("Expected {actual}{verb} {predicate}."))
        };
        self.recorder.record(outcome)?;
        Ok(passed)
    }
}

impl<T: PartialEq + Debug> Expectation<T> {
    /// Primitive identity: `actual == expected`.
    pub fn to_be(self, expected: T) -> Result<bool> {
        let holds = self.actual == expected;
        let actual = format!("{:?}", self.actual);
        self.settle("toBe", holds, actual, format!("to be {expected:?}"))
    }
}

impl<T: PartialOrd + Debug> Expectation<T> {
    /// Numeric ordering: `actual > expected`.
    pub fn to_be_greater_than(self, expected: T) -> Result<bool> {
        let holds = self.actual > expected;
        let actual = format!("{:?}", self.actual);
        self.settle("toBeGreaterThan", holds, actual, format!("to be greater than {expected:?}"))
    }

    /// Numeric ordering: `actual < expected`.
    pub fn to_be_less_than(self, expected: T) -> Result<bool> {
        let holds = self.actual < expected;
        let actual = format!("{:?}", self.actual);
        self.settle("toBeLessThan", holds, actual, format!("to be less than {expected:?}"))
    }
}

impl<T: Debug> Expectation<T> {
    /// Deep structural equality: `actual == expected`, recursing through
    /// fields and elements.
    ///
    /// Only shapes with a `PartialEq` relation can be compared:
    ///
    /// ```compile_fail
    /// use std::sync::Arc;
    /// use feedcheck_core::{CaseRecorder, TestContext};
    ///
    /// let ctx = TestContext::new("s", "t", Arc::new(()), Arc::new(CaseRecorder::default()));
    /// let _ = ctx.expect(Some(vec![1])).to_equal(vec![1]);
    /// ```
    pub fn to_equal<U: Debug>(self, expected: U) -> Result<bool>
    where
        T: PartialEq<U>,
    {
        let holds = self.actual == expected;
        let actual = format!("{:?}", self.actual);
        self.settle("toEqual", holds, actual, format!("to equal {expected:?}"))
    }
}

impl<T: Debug> Expectation<Option<T>> {
    /// Passes when the value is present.
    pub fn to_be_defined(self) -> Result<bool> {
        let holds = self.actual.is_some();
        let actual = format!("{:?}", self.actual);
        self.settle("toBeDefined", holds, actual, "to be defined".to_string())
    }
}

impl Expectation<bool> {
    /// Passes when the value is `true`.
    pub fn to_be_truthy(self) -> Result<bool> {
        let holds = self.actual;
        self.settle("toBeTruthy", holds, holds.to_string(), "to be truthy".to_string())
    }

    /// Passes when the value is `false`.
    pub fn to_be_falsy(self) -> Result<bool> {
        let holds = !self.actual;
        let actual = self.actual.to_string();
        self.settle("toBeFalsy", holds, actual, "to be falsy".to_string())
    }
}

impl<T: AsRef<str>> Expectation<T> {
    /// Passes when `needle` occurs in the string.
    pub fn to_contain(self, needle: &str) -> Result<bool> {
        let holds = self.actual.as_ref().contains(needle);
        let actual = format!("{:?}", self.actual.as_ref());
        self.settle("toContain", holds, actual, format!("to contain {needle:?}"))
    }
}
