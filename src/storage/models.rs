//! Persisted record types.
//!
//! [`SavedViewState`] is what survives a process-level teardown of the catalogue view:
//! the source, the query and page position, plus the accepted items so the view can be
//! redrawn without touching the network.

use crate::app::pagination::{FetchState, PaginationSnapshot};
use crate::domain::{MangaSummary, SourceId};
use serde::{Deserialize, Serialize};

/// Serializable snapshot of one catalogue view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedViewState {
    /// Source being browsed.
    pub source_id: SourceId,

    /// Active query; empty for the unfiltered listing.
    #[serde(default)]
    pub query: String,

    /// Index of the last requested page.
    #[serde(default)]
    pub page_index: u32,

    /// Fetch lifecycle at save time.
    #[serde(default)]
    pub fetch_state: FetchState,

    /// Accepted items, in display order.
    #[serde(default)]
    pub items: Vec<MangaSummary>,

    /// Unix timestamp of the save.
    pub saved_at: i64,
}

impl SavedViewState {
    /// Creates a record from pagination internals and the visible list.
    ///
    /// ```
    /// use catalogue_browser::app::pagination::{FetchState, PaginationSnapshot};
    /// use catalogue_browser::storage::SavedViewState;
    /// use catalogue_browser::SourceId;
    ///
    /// let snapshot = PaginationSnapshot {
    ///     source_id: SourceId(1),
    ///     query: "naruto".to_string(),
    ///     page_index: 2,
    ///     state: FetchState::HasMore,
    /// };
    /// let saved = SavedViewState::new(snapshot, vec![]);
    /// assert_eq!(saved.query, "naruto");
    /// assert_eq!(saved.page_index, 2);
    /// ```
    #[must_use]
    pub fn new(snapshot: PaginationSnapshot, items: Vec<MangaSummary>) -> Self {
        Self {
            source_id: snapshot.source_id,
            query: snapshot.query,
            page_index: snapshot.page_index,
            fetch_state: snapshot.state,
            items,
            saved_at: chrono::Utc::now().timestamp(),
        }
    }

    #[must_use]
    pub fn pagination(&self) -> PaginationSnapshot {
        PaginationSnapshot {
            source_id: self.source_id,
            query: self.query.clone(),
            page_index: self.page_index,
            state: self.fetch_state,
        }
    }
}
