//! Feedcheck: suite-based async test harness and the feed reader it verifies.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use feedcheck::prelude::*;
//! use std::time::Duration;
//!
//! # async fn run() -> feedcheck::suites::Result<()> {
//! let report = run_feed_reader(HarnessConfig::default(), udacity_reader(5, Duration::ZERO)).await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub use feedcheck_core as core;
pub use feedcheck_reader as reader;
pub use feedcheck_test as suites;

/// Prelude module for common imports.
pub mod prelude {
    pub use feedcheck_core::{
        Done, Harness, HarnessConfig, HarnessError, HookPolicy, Report, RunState, Step,
        SuiteHandle, TestContext,
    };
    pub use feedcheck_reader::{
        EntrySource, FeedCatalog, FeedDescriptor, ReaderApp, ReaderConfig, StaticEntrySource,
    };
    pub use feedcheck_test::{
        ChaosConfig, ChaosSource, FeedReaderSuites, run_feed_reader, udacity_reader,
    };
}
