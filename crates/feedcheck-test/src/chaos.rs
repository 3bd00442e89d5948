//! Chaos injection for the entry source.
//!
//! [`ChaosSource`] wraps any [`EntrySource`] and, while active, delays
//! responses, fails chosen feeds or answers them with no entries. Injection
//! is deterministic so that scenarios can assert exact outcomes.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use feedcheck_reader::{Entry, EntrySource, FeedDescriptor, ReaderError};

use crate::error::{Result, TestError};

/// Chaos injection configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChaosConfig {
    /// Delay added to every response.
    pub latency_injection: Option<Duration>,
    /// Feed URLs whose loads fail.
    pub failing_feeds: BTreeSet<String>,
    /// Feed URLs answered with an empty entry list.
    pub empty_feeds: BTreeSet<String>,
}

impl ChaosConfig {
    /// Creates a config with latency injection.
    #[must_use]
    pub fn latency(delay: Duration) -> Self {
        Self {
            latency_injection: Some(delay),
            ..Default::default()
        }
    }

    /// Adds a failing feed.
    #[must_use]
    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.failing_feeds.insert(url.into());
        self
    }

    /// Adds a feed answered with no entries.
    #[must_use]
    pub fn empty(mut self, url: impl Into<String>) -> Self {
        self.empty_feeds.insert(url.into());
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns `Chaos` if a feed is configured to both fail and be empty.
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = self.failing_feeds.intersection(&self.empty_feeds).next() {
            return Err(TestError::chaos(format!("{url} is configured as failing and empty")));
        }
        Ok(())
    }
}

/// Entry source wrapper that injects faults.
pub struct ChaosSource<S> {
    inner: S,
    config: ChaosConfig,
    active: AtomicBool,
    injected: AtomicU64,
}

impl<S: EntrySource> ChaosSource<S> {
    /// Wraps `inner`. Injection starts active.
    ///
    /// # Errors
    /// Returns `Chaos` if the configuration is invalid.
    pub fn new(inner: S, config: ChaosConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner,
            config,
            active: AtomicBool::new(true),
            injected: AtomicU64::new(0),
        })
    }

    /// Resumes injection.
    pub fn start(&self) {
        tracing::warn!(config = ?self.config, "starting chaos injection");
        self.active.store(true, Ordering::SeqCst);
    }

    /// Pauses injection; responses pass through unchanged.
    pub fn stop(&self) {
        tracing::info!("stopping chaos injection");
        self.active.store(false, Ordering::SeqCst);
    }

    /// Returns true while injecting.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of faults injected so far.
    #[must_use]
    pub fn injected(&self) -> u64 {
        self.injected.load(Ordering::SeqCst)
    }

    /// Returns the chaos config.
    #[must_use]
    pub const fn config(&self) -> &ChaosConfig {
        &self.config
    }

    fn record(&self) {
        self.injected.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: EntrySource> EntrySource for ChaosSource<S> {
    async fn entries(&self, feed: &FeedDescriptor) -> feedcheck_reader::Result<Vec<Entry>> {
        if !self.is_active() {
            return self.inner.entries(feed).await;
        }
        if let Some(delay) = self.config.latency_injection {
            tracing::debug!(?delay, "injecting latency");
            self.record();
            tokio::time::sleep(delay).await;
        }
        let url = feed.url.as_deref().unwrap_or_default();
        if self.config.failing_feeds.contains(url) {
            tracing::debug!(url, "injecting failure");
            self.record();
            return Err(ReaderError::source(format!("chaos: {url} unavailable")));
        }
        if self.config.empty_feeds.contains(url) {
            tracing::debug!(url, "injecting empty feed");
            self.record();
            return Ok(Vec::new());
        }
        self.inner.entries(feed).await
    }

    fn name(&self) -> &str {
        "chaos"
    }
}
