// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # feedcheck-test
//!
//! The feed reader suites, ready to run on a [`feedcheck_core::Harness`].
//!
//! This crate provides:
//! - **Suites**: `RSS Feeds`, `The menu`, `Initial Entries`, `New Feed Selection`
//! - **Chaos injection**: latency, failing and empty feeds on the entry source
//! - **Scenario tests**: the harness guarantees, checked end to end
//!
//! ## Example
//!
//! ```rust,ignore
//! use feedcheck_core::HarnessConfig;
//! use feedcheck_test::{run_feed_reader, udacity_reader};
//!
//! let report = run_feed_reader(HarnessConfig::default(), udacity_reader(5, Duration::ZERO)).await?;
//! assert!(report.all_passed());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod chaos;
pub mod error;
pub mod suites;

pub use chaos::{ChaosConfig, ChaosSource};
pub use error::{Result, TestError};
pub use suites::{
    FeedReaderSuites, INITIAL_ENTRIES, NEW_FEED_SELECTION, RSS_FEEDS, THE_MENU, run_feed_reader,
    udacity_reader,
};
