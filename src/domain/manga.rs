//! Catalogue entries and pages.
//!
//! A [`MangasPage`] is one unit of delivery from a data source. The controller keeps
//! the ordered concatenation of accepted pages as its visible list.

use serde::{Deserialize, Serialize};

/// Summary of one catalogue entry as listed by a source.
///
/// Identity is carried by `id` alone; two summaries with the same id describe the same
/// entry even when other fields differ (a thumbnail discovered later, for instance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangaSummary {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl MangaSummary {
    /// Creates a summary without a thumbnail.
    ///
    /// ```
    /// use catalogue_browser::MangaSummary;
    ///
    /// let manga = MangaSummary::new(7, "Naruto");
    /// assert_eq!(manga.id, 7);
    /// assert!(manga.thumbnail_url.is_none());
    /// ```
    #[must_use]
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            thumbnail_url: None,
        }
    }

    #[must_use]
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    /// Returns true if both summaries refer to the same catalogue entry.
    #[must_use]
    pub const fn same_entry(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// One page of results for a `(source, query, index)` request.
///
/// `has_next` is the source's explicit continuation signal. Sources that cannot tell
/// leave it `None`, in which case an empty page marks the end of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MangasPage {
    pub index: u32,
    pub items: Vec<MangaSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next: Option<bool>,
}

impl MangasPage {
    #[must_use]
    pub const fn new(index: u32, items: Vec<MangaSummary>) -> Self {
        Self {
            index,
            items,
            has_next: None,
        }
    }

    /// Attaches an explicit continuation flag.
    #[must_use]
    pub fn with_continuation(mut self, has_next: bool) -> Self {
        self.has_next = Some(has_next);
        self
    }

    /// Returns true if no further page should be requested after this one.
    ///
    /// ```
    /// use catalogue_browser::{MangaSummary, MangasPage};
    ///
    /// assert!(MangasPage::new(3, vec![]).is_last());
    /// assert!(!MangasPage::new(0, vec![MangaSummary::new(1, "a")]).is_last());
    /// assert!(MangasPage::new(0, vec![MangaSummary::new(1, "a")])
    ///     .with_continuation(false)
    ///     .is_last());
    /// ```
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.has_next.map_or(self.items.is_empty(), |has_next| !has_next)
    }
}
