//! JSON-backed catalogue.
//!
//! [`FixtureCatalogue`] serves a fixed set of entries per source, filtered by a fuzzy
//! title match and sliced into pages. It backs the terminal binary and the tests.
//!
//! # File Format
//!
//! ```json
//! {
//!   "sources": [
//!     { "id": 1, "name": "Batoto", "headers": { "Referer": "https://bato.to" } }
//!   ],
//!   "manga": {
//!     "1": [
//!       { "id": 10, "title": "Naruto", "thumbnail_url": "https://img/10.jpg" }
//!     ]
//!   }
//! }
//! ```

use super::{CatalogueSource, SourceRegistry};
use crate::domain::error::{CatalogueError, Result};
use crate::domain::{MangaSummary, MangasPage, SourceDescriptor, SourceId};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default number of entries per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FixtureData {
    #[serde(default)]
    sources: Vec<SourceDescriptor>,
    #[serde(default)]
    manga: BTreeMap<SourceId, Vec<MangaSummary>>,
}

/// In-memory catalogue loaded from JSON.
pub struct FixtureCatalogue {
    data: FixtureData,
    page_size: usize,
    matcher: SkimMatcherV2,
}

impl FixtureCatalogue {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            data: FixtureData::default(),
            page_size: page_size.max(1),
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Loads a catalogue file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalogue.
    pub fn load(path: &Path, page_size: usize) -> Result<Self> {
        tracing::debug!(path = ?path, page_size, "loading fixture catalogue");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents, page_size)
    }

    /// Parses a catalogue from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Config`] if the JSON does not match the format.
    pub fn from_json(json: &str, page_size: usize) -> Result<Self> {
        let data: FixtureData = serde_json::from_str(json)
            .map_err(|e| CatalogueError::Config(format!("invalid catalogue file: {e}")))?;

        tracing::debug!(
            sources = data.sources.len(),
            entries = data.manga.values().map(Vec::len).sum::<usize>(),
            "fixture catalogue parsed"
        );

        Ok(Self {
            data,
            page_size: page_size.max(1),
            matcher: SkimMatcherV2::default(),
        })
    }

    /// Registers a source together with its entries.
    #[must_use]
    pub fn with_source(mut self, descriptor: SourceDescriptor, manga: Vec<MangaSummary>) -> Self {
        self.data.manga.insert(descriptor.id, manga);
        self.data.sources.retain(|s| s.id != descriptor.id);
        self.data.sources.push(descriptor);
        self
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns true if every whitespace token of `query` fuzzily matches `title`.
    fn matches(&self, title: &str, tokens: &[String]) -> bool {
        let title = title.to_lowercase();
        tokens
            .iter()
            .all(|token| self.matcher.fuzzy_match(&title, token).is_some())
    }
}

impl CatalogueSource for FixtureCatalogue {
    fn fetch_page(&mut self, source_id: SourceId, query: &str, page_index: u32) -> Result<MangasPage> {
        let _span = tracing::debug_span!("fixture_fetch_page",
            source_id = %source_id,
            query = %query,
            page_index
        ).entered();

        let entries = self
            .data
            .manga
            .get(&source_id)
            .ok_or_else(|| CatalogueError::Fetch(format!("unknown source: {source_id}")))?;

        let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

        let start = usize::try_from(page_index)
            .unwrap_or(usize::MAX)
            .saturating_mul(self.page_size);

        let mut matching = entries.iter().filter(|m| self.matches(&m.title, &tokens));
        let items: Vec<MangaSummary> = matching
            .by_ref()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        let has_next = matching.next().is_some();

        tracing::debug!(item_count = items.len(), has_next, "fixture page served");
        Ok(MangasPage::new(page_index, items).with_continuation(has_next))
    }
}

impl SourceRegistry for FixtureCatalogue {
    fn source(&self, id: SourceId) -> Option<SourceDescriptor> {
        self.data.sources.iter().find(|s| s.id == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue(page_size: usize) -> FixtureCatalogue {
        let manga = ["Naruto", "Boruto", "One Piece", "Bleach", "Berserk"]
            .iter()
            .zip(1..)
            .map(|(title, id)| MangaSummary::new(id, *title))
            .collect();
        FixtureCatalogue::new(page_size)
            .with_source(SourceDescriptor::new(SourceId(1), "Test"), manga)
    }

    #[test]
    fn pages_slice_the_listing() {
        let mut source = catalogue(2);

        let first = source.fetch_page(SourceId(1), "", 0).unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.has_next, Some(true));

        let last = source.fetch_page(SourceId(1), "", 2).unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.is_last());

        let past_end = source.fetch_page(SourceId(1), "", 9).unwrap();
        assert!(past_end.items.is_empty());
        assert!(past_end.is_last());
    }

    #[test]
    fn query_filters_titles_fuzzily() {
        let mut source = catalogue(10);
        let page = source.fetch_page(SourceId(1), "ruto", 0).unwrap();
        let titles: Vec<&str> = page.items.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Naruto", "Boruto"]);
    }

    #[test]
    fn unknown_source_is_a_fetch_failure() {
        let mut source = catalogue(10);
        assert!(matches!(
            source.fetch_page(SourceId(9), "", 0),
            Err(CatalogueError::Fetch(_))
        ));
    }

    #[test]
    fn parses_catalogue_file_format() {
        let json = r#"{
            "sources": [{ "id": 2, "name": "Batoto", "headers": { "Referer": "https://bato.to" } }],
            "manga": { "2": [{ "id": 5, "title": "Vagabond" }] }
        }"#;
        let mut source = FixtureCatalogue::from_json(json, 5).unwrap();
        assert_eq!(source.page_size(), 5);

        let descriptor = source.source(SourceId(2)).unwrap();
        assert_eq!(descriptor.name, "Batoto");
        assert_eq!(descriptor.headers.get("Referer").map(String::as_str), Some("https://bato.to"));
        assert_eq!(source.fetch_page(SourceId(2), "", 0).unwrap().items.len(), 1);
        assert!(source.source(SourceId(3)).is_none());
    }

    #[test]
    fn malformed_catalogue_is_a_config_error() {
        assert!(matches!(
            FixtureCatalogue::from_json("{ nope", 5),
            Err(CatalogueError::Config(_))
        ));
    }
}
