//! Feed catalog.
//!
//! An ordered list of feed descriptors. Fields are optional so that a
//! malformed catalog can be expressed and caught by the suites rather than
//! rejected at load time.

use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, Result};

/// One feed the reader can load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedDescriptor {
    /// Display name, shown as the header title once loaded.
    #[serde(default)]
    pub name: Option<String>,
    /// Feed URL, used as the key into the entry source.
    #[serde(default)]
    pub url: Option<String>,
}

impl FeedDescriptor {
    /// Creates a descriptor with both fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
        }
    }

    /// Name, or the empty string.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Ordered feed descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedCatalog {
    #[serde(default)]
    feeds: Vec<FeedDescriptor>,
}

impl FeedCatalog {
    /// Creates a catalog from descriptors.
    #[must_use]
    pub const fn new(feeds: Vec<FeedDescriptor>) -> Self {
        Self { feeds }
    }

    /// The four feeds the reader ships with.
    #[must_use]
    pub fn udacity_defaults() -> Self {
        Self::new(vec![
            FeedDescriptor::new("Udacity Blog", "http://blog.udacity.com/feed"),
            FeedDescriptor::new("CSS Tricks", "http://feeds.feedburner.com/CssTricks"),
            FeedDescriptor::new("HTML5 Rocks", "http://feeds.feedburner.com/html5rocks"),
            FeedDescriptor::new(
                "Linear Digressions",
                "http://feeds.feedburner.com/udacity-linear-digressions",
            ),
        ])
    }

    /// Parses a catalog from TOML with `[[feeds]]` tables.
    ///
    /// # Errors
    /// Returns `Config` if the TOML is malformed.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ReaderError::config(e.to_string()))
    }

    /// Returns the descriptor at `index`.
    ///
    /// # Errors
    /// Returns `FeedIndexOutOfRange` past the end.
    pub fn get(&self, index: usize) -> Result<&FeedDescriptor> {
        self.feeds.get(index).ok_or(ReaderError::FeedIndexOutOfRange {
            index,
            len: self.feeds.len(),
        })
    }

    /// All descriptors in order.
    #[must_use]
    pub fn feeds(&self) -> &[FeedDescriptor] {
        &self.feeds
    }

    /// Number of feeds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    /// Returns true if the catalog has no feeds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Appends a descriptor.
    pub fn push(&mut self, feed: FeedDescriptor) {
        self.feeds.push(feed);
    }
}
