//! Popperian Falsification Tests for feedcheck
//!
//! Category A: ordering and registration (F001-F009)
//! Category B: completion gates and failure isolation (F010-F029)
//! Category C: the feed reader suites (F030-F049)

// Allow test-specific patterns that are denied in production code
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod completion;
mod reader;
