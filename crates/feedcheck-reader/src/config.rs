//! Reader configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::catalog::{FeedCatalog, FeedDescriptor};
use crate::error::{ReaderError, Result};

/// Longest simulated load delay accepted by `validate`.
pub const MAX_LOAD_DELAY: Duration = Duration::from_secs(60);

/// Feed reader configuration.
///
/// ```toml
/// load_delay = "25ms"
///
/// [[feeds]]
/// name = "Udacity Blog"
/// url = "http://blog.udacity.com/feed"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Feeds shown in the menu, in order.
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedDescriptor>,

    /// Simulated latency of every feed load.
    #[serde(default = "default_load_delay")]
    #[serde(with = "humantime_serde")]
    pub load_delay: Duration,
}

fn default_feeds() -> Vec<FeedDescriptor> {
    FeedCatalog::udacity_defaults().feeds().to_vec()
}

const fn default_load_delay() -> Duration {
    Duration::from_millis(10)
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            load_delay: default_load_delay(),
        }
    }
}

impl ReaderConfig {
    /// Sets the simulated load delay.
    #[must_use]
    pub const fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Replaces the feed list.
    #[must_use]
    pub fn with_feeds(mut self, feeds: Vec<FeedDescriptor>) -> Self {
        self.feeds = feeds;
        self
    }

    /// Builds the catalog.
    #[must_use]
    pub fn catalog(&self) -> FeedCatalog {
        FeedCatalog::new(self.feeds.clone())
    }

    /// Validates the configuration.
    ///
    /// An empty or incomplete feed list is accepted; the suites report it.
    ///
    /// # Errors
    /// Returns `Config` if the load delay exceeds [`MAX_LOAD_DELAY`].
    pub fn validate(&self) -> Result<()> {
        if self.load_delay > MAX_LOAD_DELAY {
            return Err(ReaderError::config(format!(
                "load_delay {} exceeds {}",
                humantime::format_duration(self.load_delay),
                humantime::format_duration(MAX_LOAD_DELAY)
            )));
        }
        Ok(())
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the string cannot be parsed or is invalid.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ReaderError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
