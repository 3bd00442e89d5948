//! Falsification Tests: Category C - Feed Reader Suites (F030-F049)

use std::sync::Arc;
use std::time::Duration;

use feedcheck_core::{HarnessConfig, HarnessError};
use feedcheck_reader::{
    Entry, EntrySource, FeedCatalog, FeedDescriptor, ReaderApp, ReaderConfig, StaticEntrySource,
};
use feedcheck_test::{
    ChaosConfig, ChaosSource, INITIAL_ENTRIES, NEW_FEED_SELECTION, RSS_FEEDS, THE_MENU,
    run_feed_reader, udacity_reader,
};
use proptest::prelude::*;

const URL_HAS: &str = "has a URL and the URL is not empty";
const NAME_HAS: &str = "has a name defined and each name is not empty";
const HAS_ENTRIES: &str = "there is at least a single .entry element within the .feed container";
const CONTENT_CHANGES: &str = "when a new feed is loaded, the content actually changes";

fn config(timeout: Duration) -> HarnessConfig {
    HarnessConfig::new("feedreader").with_timeout(timeout)
}

fn chaotic_reader(chaos: ChaosConfig) -> (ReaderApp, Arc<ChaosSource<StaticEntrySource>>) {
    let catalog = FeedCatalog::udacity_defaults();
    let inner = StaticEntrySource::for_catalog(&catalog, 3);
    let source = Arc::new(ChaosSource::new(inner, chaos).unwrap());
    let shared: Arc<dyn EntrySource> = source.clone();
    (ReaderApp::with_shared_source(catalog, shared), source)
}

fn feed_url(index: usize) -> String {
    FeedCatalog::udacity_defaults().get(index).unwrap().url.clone().unwrap()
}

// =============================================================================
// F030-F033: The shipped reader
// =============================================================================

/// F030: All seven cases pass against the reader as shipped
///
/// # Falsification Attempt
/// Run every suite with realistic load latency; any failure falsifies the claim.
#[tokio::test]
async fn f030_shipped_reader_passes() {
    let report = run_feed_reader(
        config(Duration::from_secs(1)),
        udacity_reader(5, Duration::from_millis(10)),
    )
    .await
    .unwrap();

    assert_eq!(report.summary(), "7 passed, 0 failed", "F030 FALSIFIED:\n{report}");
    let names: Vec<_> = report.suites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, [RSS_FEEDS, THE_MENU, INITIAL_ENTRIES, NEW_FEED_SELECTION]);
    assert!(report.warnings.is_empty());
}

/// F031: The menu toggles on each click
#[tokio::test]
async fn f031_menu_toggle_recorded() {
    let report = run_feed_reader(config(Duration::from_secs(1)), udacity_reader(1, Duration::ZERO))
        .await
        .unwrap();
    let case = report
        .case(THE_MENU, "changes visibility when the menu icon is clicked (to hide and show the menu)")
        .unwrap();
    assert_eq!(case.expectations.len(), 2);
    assert!(case.expectations.iter().all(|e| e.passed && e.matcher == "toBe"));
    assert!(report.case(THE_MENU, "is hidden by default").unwrap().passed());
}

/// F032: A three-entry feed satisfies Initial Entries and the container holds exactly those entries
#[tokio::test]
async fn f032_initial_entries_with_three_entries() {
    let catalog = FeedCatalog::udacity_defaults();
    let source = StaticEntrySource::for_catalog(&catalog, 3);
    let app = Arc::new(ReaderApp::new(catalog, source));
    let harness =
        feedcheck_core::Harness::with_shared_fixture(config(Duration::from_secs(1)), Arc::clone(&app))
            .unwrap();
    feedcheck_test::FeedReaderSuites::register(&harness).unwrap();

    let report = harness.run().await.unwrap();
    assert!(report.case(INITIAL_ENTRIES, HAS_ENTRIES).unwrap().passed());
    let doc = app.document();
    assert_eq!(doc.entry_count(), 3, "F032 FALSIFIED: container does not hold the loaded entries");
    assert_eq!(doc.header_title(), "CSS Tricks");
}

/// F033: Switching between identical feeds fails New Feed Selection
///
/// # Falsification Attempt
/// Serve the same entries for feeds 0 and 1; if the switch still passes,
/// the suite does not actually compare content.
#[tokio::test]
async fn f033_identical_feeds_fail_switch() {
    let same = vec![Entry::new("Same", "http://example.com/same", "identical")];
    let catalog = FeedCatalog::udacity_defaults();
    let source = StaticEntrySource::for_catalog(&catalog, 2)
        .with_feed(feed_url(0), same.clone())
        .with_feed(feed_url(1), same);

    let report = run_feed_reader(config(Duration::from_secs(1)), ReaderApp::new(catalog, source))
        .await
        .unwrap();
    let case = report.case(NEW_FEED_SELECTION, CONTENT_CHANGES).unwrap();
    assert!(!case.passed(), "F033 FALSIFIED: identical feeds passed the switch");
    assert!(case.error.is_none());
    let messages = case.failure_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("not to equal"));
    assert_eq!(report.summary(), "6 passed, 1 failed");
}

// =============================================================================
// F034-F035: Malformed catalogs
// =============================================================================

/// F034: An empty catalog fails through expectations, never through a crash or timeout
#[tokio::test]
async fn f034_empty_catalog_fails_cleanly() {
    let app = ReaderApp::new(FeedCatalog::default(), StaticEntrySource::new());
    let report = run_feed_reader(config(Duration::from_secs(1)), app).await.unwrap();

    let defined = report.case(RSS_FEEDS, "are defined").unwrap();
    assert!(!defined.passed());
    assert!(defined.error.is_none());
    assert!(defined.expectations.iter().any(|e| !e.passed));

    for (suite, case) in [(INITIAL_ENTRIES, HAS_ENTRIES), (NEW_FEED_SELECTION, CONTENT_CHANGES)] {
        let case = report.case(suite, case).unwrap();
        assert!(!case.passed());
        assert!(
            case.error.is_none(),
            "F034 FALSIFIED: {suite} failed with {:?} instead of an expectation",
            case.error
        );
    }
    assert_eq!(report.summary(), "4 passed, 3 failed");
}

/// F035: A feed without a URL fails "has a URL"
#[tokio::test]
async fn f035_missing_url_detected() {
    let mut catalog = FeedCatalog::udacity_defaults();
    catalog.push(FeedDescriptor {
        name: Some("No URL".into()),
        url: None,
    });
    let source = StaticEntrySource::for_catalog(&catalog, 2);
    let report = run_feed_reader(config(Duration::from_secs(1)), ReaderApp::new(catalog, source))
        .await
        .unwrap();

    let case = report.case(RSS_FEEDS, URL_HAS).unwrap();
    assert!(!case.passed(), "F035 FALSIFIED: missing URL went unnoticed");
    assert!(report.case(RSS_FEEDS, NAME_HAS).unwrap().passed());
    assert_eq!(report.failed(), 1);
}

// =============================================================================
// F036-F038: Chaos on the entry source
// =============================================================================

/// F036: Loads slower than the timeout fail the async suites with `HookTimeout`
#[tokio::test]
async fn f036_latency_beyond_timeout() {
    let timeout = Duration::from_millis(50);
    let (app, chaos) = chaotic_reader(ChaosConfig::latency(Duration::from_millis(200)));
    let report = run_feed_reader(config(timeout), app).await.unwrap();

    for (suite, case) in [(INITIAL_ENTRIES, HAS_ENTRIES), (NEW_FEED_SELECTION, CONTENT_CHANGES)] {
        assert_eq!(
            report.case(suite, case).unwrap().error,
            Some(HarnessError::HookTimeout(timeout))
        );
    }
    assert_eq!(report.summary(), "5 passed, 2 failed");
    assert!(chaos.injected() >= 2);
}

/// F037: A failing second feed fails the switch through an expectation
#[tokio::test]
async fn f037_failing_feed_fails_switch() {
    let (app, chaos) = chaotic_reader(ChaosConfig::default().failing(feed_url(1)));
    let report = run_feed_reader(config(Duration::from_secs(1)), app).await.unwrap();

    let case = report.case(NEW_FEED_SELECTION, CONTENT_CHANGES).unwrap();
    assert!(!case.passed());
    assert!(case.error.is_none(), "F037 FALSIFIED: load failure escaped as {:?}", case.error);
    assert_eq!(report.summary(), "6 passed, 1 failed");
    assert_eq!(chaos.injected(), 1);
}

/// F038: An empty first feed fails Initial Entries with the matcher message
#[tokio::test]
async fn f038_empty_first_feed() {
    let (app, _chaos) = chaotic_reader(ChaosConfig::default().empty(feed_url(0)));
    let report = run_feed_reader(config(Duration::from_secs(1)), app).await.unwrap();

    let case = report.case(INITIAL_ENTRIES, HAS_ENTRIES).unwrap();
    assert_eq!(
        case.failure_messages(),
        vec!["Expected 0 to be greater than 0.".to_string()]
    );
    assert!(report.case(NEW_FEED_SELECTION, CONTENT_CHANGES).unwrap().passed());
}

/// F039: Stopped chaos leaves the reader passing
#[tokio::test]
async fn f039_stopped_chaos_passes() {
    let (app, chaos) = chaotic_reader(ChaosConfig::default().failing(feed_url(0)).empty(feed_url(1)));
    chaos.stop();
    let report = run_feed_reader(config(Duration::from_secs(1)), app).await.unwrap();
    assert!(report.all_passed(), "F039 FALSIFIED:\n{report}");
    assert_eq!(chaos.injected(), 0);
}

// =============================================================================
// F040-F042: Reports and configuration
// =============================================================================

/// F040: The JSON report names every suite and case
#[tokio::test]
async fn f040_json_report() {
    let report = run_feed_reader(config(Duration::from_secs(1)), udacity_reader(2, Duration::ZERO))
        .await
        .unwrap();
    let json = report.to_json().unwrap();
    for name in [RSS_FEEDS, THE_MENU, INITIAL_ENTRIES, NEW_FEED_SELECTION, HAS_ENTRIES] {
        assert!(json.contains(name), "F040 FALSIFIED: {name} missing from JSON");
    }
}

/// F041: A reader built from TOML configuration passes
#[tokio::test]
async fn f041_reader_from_config() {
    let reader_config = ReaderConfig::from_toml(
        r#"
load_delay = "5ms"

[[feeds]]
name = "First"
url = "http://example.com/first"

[[feeds]]
name = "Second"
url = "http://example.com/second"
"#,
    )
    .unwrap();
    let source = StaticEntrySource::for_catalog(&reader_config.catalog(), 2);
    let app = ReaderApp::from_config(&reader_config, source).unwrap();

    let report = run_feed_reader(config(Duration::from_secs(1)), app).await.unwrap();
    assert!(report.all_passed(), "F041 FALSIFIED:\n{report}");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// F042: Any non-empty feed size passes every suite
    #[test]
    fn f042_prop_any_feed_size_passes(per_feed in 1usize..6) {
        let report = tokio_test::block_on(run_feed_reader(
            config(Duration::from_secs(1)),
            udacity_reader(per_feed, Duration::ZERO),
        ))
        .unwrap();
        prop_assert!(report.all_passed());
        prop_assert_eq!(report.passed(), 7);
    }
}
