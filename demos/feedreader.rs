// Examples are allowed to use expect/unwrap for simplicity
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Feed Reader Example
//!
//! Runs the four feed reader suites against the shipped reader and prints
//! the report.
//!
//! # Usage
//!
//! ```bash
//! # Run against the default feeds
//! cargo run --example feedreader
//!
//! # Slow every load down and print the JSON report
//! cargo run --example feedreader -- --latency-ms 50 --json
//!
//! # Load the reader from a TOML file and inject a failing feed
//! cargo run --example feedreader -- --config reader.toml --fail-feed http://feeds.feedburner.com/CssTricks
//!
//! # Verbose harness logs
//! RUST_LOG=feedcheck_core=debug cargo run --example feedreader
//! ```

use std::sync::Arc;
use std::time::Duration;

use feedcheck::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Options {
    json: bool,
    latency: Duration,
    config: Option<String>,
    fail_feed: Option<String>,
}

fn parse_args() -> Options {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--latency-ms" => {
                let ms = args.next().and_then(|v| v.parse().ok()).unwrap_or(0);
                options.latency = Duration::from_millis(ms);
            }
            "--config" => options.config = args.next(),
            "--fail-feed" => options.fail_feed = args.next(),
            other => eprintln!("ignoring unknown argument {other}"),
        }
    }
    options
}

fn build_reader(options: &Options) -> ReaderApp {
    let reader_config = match &options.config {
        Some(path) => ReaderConfig::load(path).expect("reader config"),
        None => ReaderConfig::default().with_load_delay(options.latency),
    };
    let catalog = reader_config.catalog();
    let inner = StaticEntrySource::for_catalog(&catalog, 5);

    let source: Arc<dyn EntrySource> = match &options.fail_feed {
        Some(url) => {
            let chaos = ChaosConfig::default().failing(url.clone());
            Arc::new(ChaosSource::new(inner, chaos).expect("chaos config"))
        }
        None => Arc::new(inner),
    };
    ReaderApp::with_shared_source(catalog, source).with_load_delay(reader_config.load_delay)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = parse_args();
    let app = build_reader(&options);
    println!("[RUN] {app:?}");

    let config = HarnessConfig::new("feedreader").with_timeout(Duration::from_secs(5));
    let report = run_feed_reader(config, app).await.expect("harness run");

    if options.json {
        println!("{}", report.to_json().expect("serialize report"));
    } else {
        print!("{report}");
        for suite in &report.suites {
            println!("[SUITE] {} ({} passed, {} failed)", suite.name, suite.passed(), suite.failed());
        }
    }

    if !report.all_passed() {
        std::process::exit(1);
    }
}
