//! The reader application.
//!
//! [`ReaderApp::load_feed`] is callback-style: it returns immediately and
//! calls `on_complete` exactly once when the load finished, whether it
//! succeeded or not.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tokio::task::JoinHandle;

use crate::catalog::{FeedCatalog, FeedDescriptor};
use crate::config::ReaderConfig;
use crate::document::{Document, MENU_HIDDEN};
use crate::error::Result;
use crate::source::EntrySource;

/// Feed reader with its page and entry source.
pub struct ReaderApp {
    catalog: FeedCatalog,
    document: Arc<Mutex<Document>>,
    source: Arc<dyn EntrySource>,
    load_delay: Duration,
}

impl std::fmt::Debug for ReaderApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderApp")
            .field("feeds", &self.catalog.len())
            .field("source", &self.source.name())
            .field("load_delay", &self.load_delay)
            .finish_non_exhaustive()
    }
}

impl ReaderApp {
    /// Creates an app over `catalog`, served by `source`.
    pub fn new(catalog: FeedCatalog, source: impl EntrySource + 'static) -> Self {
        Self::with_shared_source(catalog, Arc::new(source))
    }

    /// Creates an app over an already shared source.
    #[must_use]
    pub fn with_shared_source(catalog: FeedCatalog, source: Arc<dyn EntrySource>) -> Self {
        let mut document = Document::new();
        document.set_feed_list(catalog.feeds().iter().map(|f| f.display_name().to_string()).collect());
        Self {
            catalog,
            document: Arc::new(Mutex::new(document)),
            source,
            load_delay: Duration::ZERO,
        }
    }

    /// Creates an app from configuration.
    ///
    /// # Errors
    /// Returns `Config` if the configuration is invalid.
    pub fn from_config(config: &ReaderConfig, source: impl EntrySource + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.catalog(), source).with_load_delay(config.load_delay))
    }

    /// Sets a delay applied before every load.
    #[must_use]
    pub const fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// The feed catalog.
    #[must_use]
    pub const fn catalog(&self) -> &FeedCatalog {
        &self.catalog
    }

    /// Locks the page.
    ///
    /// Do not hold the guard across an await point.
    pub fn document(&self) -> MutexGuard<'_, Document> {
        self.document.lock()
    }

    /// Loads the first feed, as the page does on start-up.
    pub fn init(&self) -> JoinHandle<Result<usize>> {
        self.load_feed(0, || {})
    }

    /// Handles a click on a feed link in the slide menu: closes the menu
    /// and loads the feed.
    pub fn select_feed<F>(&self, index: usize, on_complete: F) -> JoinHandle<Result<usize>>
    where
        F: FnOnce() + Send + 'static,
    {
        self.document().add_body_class(MENU_HIDDEN);
        self.load_feed(index, on_complete)
    }

    /// Loads feed `index` into the `.feed` container.
    ///
    /// On success the container holds exactly the feed's entries and the
    /// header shows the feed name. `on_complete` runs once afterwards, also
    /// when the load failed. The handle yields the number of entries.
    pub fn load_feed<F>(&self, index: usize, on_complete: F) -> JoinHandle<Result<usize>>
    where
        F: FnOnce() + Send + 'static,
    {
        let feed = self.catalog.get(index).cloned();
        let source = Arc::clone(&self.source);
        let document = Arc::clone(&self.document);
        let delay = self.load_delay;

        tokio::spawn(async move {
            let result = render(feed, source.as_ref(), &document, delay).await;
            match &result {
                Ok(count) => tracing::debug!(index, entries = count, "feed loaded"),
                Err(e) => tracing::warn!(index, error = %e, "feed load failed"),
            }
            on_complete();
            result
        })
    }
}

async fn render(
    feed: Result<FeedDescriptor>,
    source: &dyn EntrySource,
    document: &Mutex<Document>,
    delay: Duration,
) -> Result<usize> {
    let feed = feed?;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let entries = source.entries(&feed).await?;
    let count = entries.len();

    let mut doc = document.lock();
    doc.set_header_title(feed.display_name());
    doc.empty();
    for entry in entries {
        doc.append(entry);
    }
    Ok(count)
}
