//! Document model of the reader page.
//!
//! Only the parts the suites observe are modelled: the body class list, the
//! menu icon, the header title, the feed list in the slide menu and the
//! `.feed` container with its `.entry` children.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Body class present while the slide menu is hidden.
pub const MENU_HIDDEN: &str = "menu-hidden";

/// One feed entry rendered into the `.feed` container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry title.
    pub title: String,
    /// Link to the article.
    pub link: String,
    /// Short content snippet.
    #[serde(default)]
    pub snippet: String,
}

impl Entry {
    /// Creates an entry.
    #[must_use]
    pub fn new(title: impl Into<String>, link: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }
}

/// The reader page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    body_classes: BTreeSet<String>,
    header_title: String,
    feed_list: Vec<String>,
    feed: Vec<Entry>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates the page as first served: menu hidden, empty feed container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            body_classes: BTreeSet::from([MENU_HIDDEN.to_string()]),
            header_title: String::new(),
            feed_list: Vec::new(),
            feed: Vec::new(),
        }
    }

    /// Returns true if the body carries `class`.
    #[must_use]
    pub fn body_has_class(&self, class: &str) -> bool {
        self.body_classes.contains(class)
    }

    /// Adds a class to the body.
    pub fn add_body_class(&mut self, class: &str) {
        self.body_classes.insert(class.to_string());
    }

    /// Clicks `.menu-icon-link`, toggling `menu-hidden` on the body.
    pub fn click_menu_icon(&mut self) {
        if !self.body_classes.remove(MENU_HIDDEN) {
            self.body_classes.insert(MENU_HIDDEN.to_string());
        }
        tracing::trace!(hidden = self.body_has_class(MENU_HIDDEN), "menu icon clicked");
    }

    /// Returns true while the slide menu is hidden.
    #[must_use]
    pub fn is_menu_hidden(&self) -> bool {
        self.body_has_class(MENU_HIDDEN)
    }

    /// Header title text.
    #[must_use]
    pub fn header_title(&self) -> &str {
        &self.header_title
    }

    /// Sets the header title text.
    pub fn set_header_title(&mut self, title: impl Into<String>) {
        self.header_title = title.into();
    }

    /// Links in the slide menu's feed list.
    #[must_use]
    pub fn feed_list(&self) -> &[String] {
        &self.feed_list
    }

    /// Replaces the slide menu's feed list.
    pub fn set_feed_list(&mut self, names: Vec<String>) {
        self.feed_list = names;
    }

    /// Number of `.entry` elements in the `.feed` container.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.feed.len()
    }

    /// Snapshot of the `.feed` container.
    #[must_use]
    pub fn content(&self) -> Vec<Entry> {
        self.feed.clone()
    }

    /// Removes every child of the `.feed` container.
    pub fn empty(&mut self) {
        self.feed.clear();
    }

    /// Appends an entry to the `.feed` container.
    pub fn append(&mut self, entry: Entry) {
        self.feed.push(entry);
    }
}
