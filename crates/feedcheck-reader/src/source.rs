//! Entry sources.
//!
//! The reader does not fetch or parse real feeds. An [`EntrySource`] hands
//! back already-parsed entries for a feed descriptor.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::catalog::{FeedCatalog, FeedDescriptor};
use crate::document::Entry;
use crate::error::{ReaderError, Result};

/// Provides the entries of one feed.
#[async_trait]
pub trait EntrySource: Send + Sync {
    /// Returns the entries of `feed`, in display order.
    ///
    /// # Errors
    /// Returns `Source` if the feed cannot be served.
    async fn entries(&self, feed: &FeedDescriptor) -> Result<Vec<Entry>>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "entry-source"
    }
}

/// In-memory entries keyed by feed URL, with an optional simulated latency.
#[derive(Debug, Clone, Default)]
pub struct StaticEntrySource {
    entries: HashMap<String, Vec<Entry>>,
    latency: Duration,
}

impl StaticEntrySource {
    /// Creates an empty source without latency.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the simulated latency.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Registers the entries served for `url`.
    #[must_use]
    pub fn with_feed(mut self, url: impl Into<String>, entries: Vec<Entry>) -> Self {
        self.entries.insert(url.into(), entries);
        self
    }

    /// Serves `per_feed` distinct entries for every feed of `catalog` that has a URL.
    #[must_use]
    pub fn for_catalog(catalog: &FeedCatalog, per_feed: usize) -> Self {
        let entries = catalog
            .feeds()
            .iter()
            .filter_map(|feed| {
                let url = feed.url.clone()?;
                let items = (1..=per_feed)
                    .map(|n| {
                        Entry::new(
                            format!("{} #{n}", feed.display_name()),
                            format!("{url}/{n}"),
                            format!("Entry {n} of {}", feed.display_name()),
                        )
                    })
                    .collect();
                Some((url, items))
            })
            .collect();
        Self {
            entries,
            latency: Duration::ZERO,
        }
    }

    /// Returns the simulated latency.
    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl EntrySource for StaticEntrySource {
    async fn entries(&self, feed: &FeedDescriptor) -> Result<Vec<Entry>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let url = feed
            .url
            .as_deref()
            .ok_or_else(|| ReaderError::source(format!("feed '{}' has no URL", feed.display_name())))?;
        self.entries
            .get(url)
            .cloned()
            .ok_or_else(|| ReaderError::source(format!("no entries for {url}")))
    }

    fn name(&self) -> &str {
        "static"
    }
}
