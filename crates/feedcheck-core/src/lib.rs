// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # feedcheck-core
//!
//! Suite-based asynchronous test harness.
//!
//! This crate provides the building blocks of a run:
//!
//! - [`SuiteRegistry`] for declaring suites, test cases and before-each hooks
//! - [`HookChain`] for running hooks ahead of every case
//! - [`Expectation`] matchers recorded against the running case
//! - [`CompletionGate`] and its single-shot [`Done`] token for async steps
//! - [`ResultReporter`] producing an immutable [`Report`]
//! - [`Harness`] driving the run `Idle → Running → Finalized`
//!
//! ## Example
//!
//! ```rust,ignore
//! use feedcheck_core::{Harness, HarnessConfig, Step, TestContext};
//!
//! let harness = Harness::new(HarnessConfig::default(), 41_u32)?;
//! let suite = harness.declare_suite("numbers")?;
//! harness.declare_test(&suite, "grows", Step::sync(|ctx: TestContext<u32>| {
//!     ctx.expect(*ctx.fixture() + 1).to_be(42)?;
//!     Ok(())
//! }))?;
//! let report = harness.run().await?;
//! assert_eq!(report.summary(), "1 passed, 0 failed");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::significant_drop_tightening)]

pub mod config;
pub mod context;
pub mod error;
pub mod expect;
pub mod gate;
pub mod harness;
pub mod hook;
pub mod reporter;
pub mod step;
pub mod suite;
pub mod types;

pub use config::{HarnessConfig, HookPolicy};
pub use context::{CaseRecorder, TestContext};
pub use error::{HarnessError, Result};
pub use expect::{Expectation, ExpectationOutcome};
pub use gate::{CompletionGate, Done, GateOutcome, GateWaiter, LateSignalWarning, Signal, WarningSink};
pub use harness::Harness;
pub use hook::HookChain;
pub use reporter::{CaseOutcome, CaseReport, Report, ResultReporter, SuiteReport};
pub use step::{BoxFuture, Step};
pub use suite::{Suite, SuiteHandle, SuiteRegistry, TestCase};
pub use types::{CasePhase, RunId, RunState, StepKind, SuiteId, TestId};
