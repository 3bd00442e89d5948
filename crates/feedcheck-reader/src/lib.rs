// Iron Lotus: Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # feedcheck-reader
//!
//! The feed reader verified by the feedcheck suites.
//!
//! - [`FeedCatalog`] of feed descriptors
//! - [`Document`] with the slide menu and the `.feed` container
//! - [`EntrySource`] seam, with [`StaticEntrySource`] for in-memory entries
//! - [`ReaderApp::load_feed`], asynchronous and callback-style
//!
//! ## Example
//!
//! ```rust,ignore
//! use feedcheck_reader::{FeedCatalog, ReaderApp, StaticEntrySource};
//!
//! let catalog = FeedCatalog::udacity_defaults();
//! let app = ReaderApp::new(catalog.clone(), StaticEntrySource::for_catalog(&catalog, 5));
//! app.load_feed(0, || println!("loaded")).await??;
//! assert_eq!(app.document().entry_count(), 5);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod app;
pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod source;

pub use app::ReaderApp;
pub use catalog::{FeedCatalog, FeedDescriptor};
pub use config::ReaderConfig;
pub use document::{Document, Entry, MENU_HIDDEN};
pub use error::{ReaderError, Result};
pub use source::{EntrySource, StaticEntrySource};
