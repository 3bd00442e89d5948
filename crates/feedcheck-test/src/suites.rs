//! Feed reader suites.
//!
//! Four suites verify the reader: the feed catalog, the slide menu, the
//! initial load and switching feeds. They are declared against a harness
//! whose fixture is the [`ReaderApp`] under test, so the same suites run
//! against any catalog or entry source.

use std::sync::Arc;
use std::time::Duration;

use feedcheck_core::{Done, Harness, HarnessConfig, Report, Step, SuiteHandle, TestContext};
use feedcheck_reader::{Entry, FeedCatalog, MENU_HIDDEN, ReaderApp, StaticEntrySource};
use parking_lot::Mutex;

use crate::error::Result;

/// Suite verifying the feed catalog.
pub const RSS_FEEDS: &str = "RSS Feeds";
/// Suite verifying the slide menu.
pub const THE_MENU: &str = "The menu";
/// Suite verifying the first load.
pub const INITIAL_ENTRIES: &str = "Initial Entries";
/// Suite verifying that switching feeds changes the content.
pub const NEW_FEED_SELECTION: &str = "New Feed Selection";

type HarnessResult<T> = feedcheck_core::Result<T>;
type Ctx = TestContext<ReaderApp>;

/// `.feed` content captured by the New Feed Selection hook.
type Snapshot = Arc<Mutex<Option<Vec<Entry>>>>;

/// Handles of the declared suites.
#[derive(Debug, Clone)]
pub struct FeedReaderSuites {
    /// `RSS Feeds`.
    pub rss_feeds: SuiteHandle,
    /// `The menu`.
    pub menu: SuiteHandle,
    /// `Initial Entries`.
    pub initial_entries: SuiteHandle,
    /// `New Feed Selection`.
    pub new_feed_selection: SuiteHandle,
}

impl FeedReaderSuites {
    /// Declares all four suites, in order.
    ///
    /// # Errors
    /// Returns the first registration error.
    pub fn register(harness: &Harness<ReaderApp>) -> HarnessResult<Self> {
        let rss_feeds = harness.declare_suite(RSS_FEEDS)?;
        harness.declare_test(&rss_feeds, "are defined", Step::sync(feeds_are_defined))?;
        harness.declare_test(
            &rss_feeds,
            "has a URL and the URL is not empty",
            Step::sync(each_feed_has_url),
        )?;
        harness.declare_test(
            &rss_feeds,
            "has a name defined and each name is not empty",
            Step::sync(each_feed_has_name),
        )?;

        let menu = harness.declare_suite(THE_MENU)?;
        harness.declare_test(&menu, "is hidden by default", Step::sync(menu_hidden_by_default))?;
        harness.declare_test(
            &menu,
            "changes visibility when the menu icon is clicked (to hide and show the menu)",
            Step::sync(menu_toggles_on_click),
        )?;

        let initial_entries = harness.declare_suite(INITIAL_ENTRIES)?;
        harness.declare_before_each(&initial_entries, Step::with_done(load_first_feed))?;
        harness.declare_test(
            &initial_entries,
            "there is at least a single .entry element within the .feed container",
            Step::with_done(container_has_entries),
        )?;

        let new_feed_selection = harness.declare_suite(NEW_FEED_SELECTION)?;
        let old_feed = Snapshot::default();
        let slot = Arc::clone(&old_feed);
        harness.declare_before_each(
            &new_feed_selection,
            Step::with_done(move |ctx: Ctx, done: Done| reload_first_feed(ctx, done, Arc::clone(&slot))),
        )?;
        harness.declare_test(
            &new_feed_selection,
            "when a new feed is loaded, the content actually changes",
            Step::with_done(move |ctx: Ctx, done: Done| content_changes(ctx, done, Arc::clone(&old_feed))),
        )?;

        Ok(Self {
            rss_feeds,
            menu,
            initial_entries,
            new_feed_selection,
        })
    }
}

/// Declares the suites on a fresh harness and runs them against `app`.
///
/// # Errors
/// Returns an error if the configuration is invalid or the run cannot start.
pub async fn run_feed_reader(config: HarnessConfig, app: ReaderApp) -> Result<Arc<Report>> {
    let harness = Harness::new(config, app)?;
    FeedReaderSuites::register(&harness)?;
    Ok(harness.run().await?)
}

/// The reader as shipped: the four default feeds, each serving
/// `entries_per_feed` entries after `latency`.
#[must_use]
pub fn udacity_reader(entries_per_feed: usize, latency: Duration) -> ReaderApp {
    let catalog = FeedCatalog::udacity_defaults();
    let source = StaticEntrySource::for_catalog(&catalog, entries_per_feed).with_latency(latency);
    ReaderApp::new(catalog, source)
}

fn feeds_are_defined(ctx: Ctx) -> HarnessResult<()> {
    let catalog = ctx.fixture().catalog();
    ctx.expect(Some(catalog.feeds())).to_be_defined()?;
    ctx.expect(catalog.len()).not().to_be(0)?;
    Ok(())
}

fn each_feed_has_url(ctx: Ctx) -> HarnessResult<()> {
    for feed in ctx.fixture().catalog().feeds() {
        ctx.expect(feed.url.as_deref()).to_be_defined()?;
        ctx.expect(feed.url.as_deref().map_or(0, str::len)).not().to_be(0)?;
    }
    Ok(())
}

fn each_feed_has_name(ctx: Ctx) -> HarnessResult<()> {
    for feed in ctx.fixture().catalog().feeds() {
        ctx.expect(feed.name.as_deref()).to_be_defined()?;
        ctx.expect(feed.name.as_deref().map_or(0, str::len)).not().to_be(0)?;
    }
    Ok(())
}

fn menu_hidden_by_default(ctx: Ctx) -> HarnessResult<()> {
    let hidden = ctx.fixture().document().body_has_class(MENU_HIDDEN);
    ctx.expect(hidden).to_be(true)?;
    Ok(())
}

fn menu_toggles_on_click(ctx: Ctx) -> HarnessResult<()> {
    let app = ctx.fixture();
    app.document().click_menu_icon();
    let hidden = app.document().body_has_class(MENU_HIDDEN);
    ctx.expect(hidden).to_be(false)?;

    app.document().click_menu_icon();
    let hidden = app.document().body_has_class(MENU_HIDDEN);
    ctx.expect(hidden).to_be(true)?;
    Ok(())
}

async fn load_first_feed(ctx: Ctx, done: Done) -> HarnessResult<()> {
    // Detached; completion arrives through `done`.
    drop(ctx.fixture().load_feed(0, done.into_callback()));
    Ok(())
}

async fn container_has_entries(ctx: Ctx, done: Done) -> HarnessResult<()> {
    let entries = ctx.fixture().document().entry_count();
    ctx.expect(entries).to_be_greater_than(0)?;
    done.complete()?;
    Ok(())
}

async fn reload_first_feed(ctx: Ctx, done: Done, old_feed: Snapshot) -> HarnessResult<()> {
    let app = ctx.fixture_arc();
    app.document().empty();
    let signal = done.into_callback();
    let reader = Arc::clone(&app);
    drop(app.load_feed(0, move || {
        *old_feed.lock() = Some(reader.document().content());
        signal();
    }));
    Ok(())
}

async fn content_changes(ctx: Ctx, done: Done, old_feed: Snapshot) -> HarnessResult<()> {
    let app = ctx.fixture_arc();
    let signal = done.into_callback();
    drop(app.load_feed(1, move || {
        let new_feed = ctx.fixture().document().content();
        let old = old_feed.lock().clone();
        let checks = ctx.expect(old.clone()).to_be_defined().and_then(|_| match old {
            Some(old) => ctx.expect(old).not().to_equal(new_feed),
            None => Ok(false),
        });
        if let Err(e) = checks {
            tracing::warn!(error = %e, "content comparison not recorded");
        }
        signal();
    }));
    Ok(())
}
