//! Data source abstractions.
//!
//! The controller never calls a data source itself. [`CatalogueSource`] runs on the
//! worker thread and answers one page request at a time. [`SourceRegistry`] resolves
//! navigation arguments into a [`SourceDescriptor`] when a view is created.
//!
//! # Implementations
//!
//! - [`FixtureCatalogue`]: JSON-backed catalogue with fuzzy title filtering

pub mod fixture;

pub use fixture::FixtureCatalogue;

use crate::domain::{MangasPage, Result, SourceDescriptor, SourceId};

/// A paged catalogue listing.
///
/// Implementations must be idempotent per `(source_id, query, page_index)`; the
/// controller requests each triple at most once per query session.
pub trait CatalogueSource: Send {
    /// Fetches one page of results.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Fetch`](crate::CatalogueError::Fetch) (or any other
    /// variant) when the page is unavailable. The caller does not distinguish causes.
    fn fetch_page(&mut self, source_id: SourceId, query: &str, page_index: u32) -> Result<MangasPage>;
}

/// Lookup of registered sources.
pub trait SourceRegistry {
    /// Returns the descriptor for `id`, or `None` if no such source exists.
    fn source(&self, id: SourceId) -> Option<SourceDescriptor>;
}
