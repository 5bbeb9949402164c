//! Paging state machine.
//!
//! [`PaginationController`] owns the active query, the index of the last requested page
//! and the fetch lifecycle. It never performs I/O: every transition that needs data
//! returns a [`PageRequest`] for the caller to dispatch, and every result is fed back
//! through [`PaginationController::on_page_arrived`] or
//! [`PaginationController::on_fetch_error`] together with the query it was issued for.
//!
//! # State Machine
//!
//! ```text
//! Idle ──start──▶ FetchingFirstPage ──page──▶ HasMore ──next──▶ FetchingNextPage
//!                   ▲        │                  │  ▲                 │
//!                   │        └──empty──▶ Exhausted └─────page────────┘
//!        restart ───┘ (from any state)         Failed ◀── error (while fetching)
//! ```
//!
//! Results are matched against the current query and the page index in flight. A result
//! for a superseded query is dropped even if the fetch that produced it could not be
//! cancelled in time.

use crate::domain::{MangasPage, SourceId};
use serde::{Deserialize, Serialize};

/// Lifecycle of the paged fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Page 0 of the current query is in flight.
    FetchingFirstPage,
    /// A later page of the current query is in flight.
    FetchingNextPage,
    /// The last accepted page said more is available.
    HasMore,
    /// The last accepted page was the final one.
    Exhausted,
    /// The last fetch failed. Only a restart leaves this state.
    Failed,
}

impl FetchState {
    #[must_use]
    pub const fn is_fetching(self) -> bool {
        matches!(self, Self::FetchingFirstPage | Self::FetchingNextPage)
    }
}

/// A fetch the caller must dispatch to the data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub source_id: SourceId,
    pub query: String,
    pub page_index: u32,
}

/// Snapshot of the pagination internals used for save and restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationSnapshot {
    pub source_id: SourceId,
    pub query: String,
    pub page_index: u32,
    pub state: FetchState,
}

/// Query, page index and fetch lifecycle for one catalogue view.
#[derive(Debug, Clone)]
pub struct PaginationController {
    source_id: Option<SourceId>,
    query: String,
    page_index: u32,
    state: FetchState,
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new()
    }
}

impl PaginationController {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            source_id: None,
            query: String::new(),
            page_index: 0,
            state: FetchState::Idle,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub const fn page_index(&self) -> u32 {
        self.page_index
    }

    #[must_use]
    pub const fn state(&self) -> FetchState {
        self.state
    }

    #[must_use]
    pub const fn source_id(&self) -> Option<SourceId> {
        self.source_id
    }

    /// True iff another page may be requested right now.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.state == FetchState::HasMore
    }

    /// Begins browsing `source_id` with the empty query.
    ///
    /// Only valid from [`FetchState::Idle`]; otherwise a no-op returning `None`.
    pub fn start_requesting(&mut self, source_id: SourceId) -> Option<PageRequest> {
        if self.state != FetchState::Idle {
            tracing::debug!(state = ?self.state, "start ignored, pagination already started");
            return None;
        }

        self.source_id = Some(source_id);
        self.query.clear();
        self.page_index = 0;
        self.state = FetchState::FetchingFirstPage;

        tracing::debug!(source_id = %source_id, "starting catalogue requests");
        Some(self.current_request(source_id))
    }

    /// Switches to `new_query` and requests its first page.
    ///
    /// A query equal to the current one changes nothing. Whatever was in flight for the
    /// old query is left to be discarded on arrival.
    pub fn restart_request(&mut self, new_query: &str) -> Option<PageRequest> {
        if self.query == new_query {
            tracing::trace!(query = %new_query, "restart ignored, query unchanged");
            return None;
        }
        let Some(source_id) = self.source_id else {
            tracing::debug!(query = %new_query, "restart ignored, no source selected");
            return None;
        };

        tracing::debug!(
            old_query = %self.query,
            new_query = %new_query,
            superseded_state = ?self.state,
            "restarting request"
        );

        new_query.clone_into(&mut self.query);
        self.page_index = 0;
        self.state = FetchState::FetchingFirstPage;
        Some(self.current_request(source_id))
    }

    /// Requests the page after the last accepted one.
    ///
    /// Only valid in [`FetchState::HasMore`]; in every other state (including while a
    /// fetch is in flight) this is a silent no-op.
    pub fn request_next(&mut self) -> Option<PageRequest> {
        if self.state != FetchState::HasMore {
            tracing::trace!(state = ?self.state, "next page request ignored");
            return None;
        }
        let source_id = self.source_id?;

        self.page_index = self.page_index.saturating_add(1);
        self.state = FetchState::FetchingNextPage;

        tracing::debug!(query = %self.query, page_index = self.page_index, "requesting next page");
        Some(self.current_request(source_id))
    }

    /// Accepts or discards a page delivered for `query`.
    ///
    /// Returns the page to apply when it belongs to the current query and matches the
    /// fetch in flight; `None` means it was stale and nothing changed.
    pub fn on_page_arrived(&mut self, query: &str, page: MangasPage) -> Option<MangasPage> {
        if !self.is_current(query, page.index) {
            tracing::debug!(
                tagged_query = %query,
                current_query = %self.query,
                page_index = page.index,
                state = ?self.state,
                "discarding stale page"
            );
            return None;
        }

        self.state = if page.is_last() {
            FetchState::Exhausted
        } else {
            FetchState::HasMore
        };

        tracing::debug!(
            query = %self.query,
            page_index = page.index,
            item_count = page.items.len(),
            state = ?self.state,
            "page accepted"
        );
        Some(page)
    }

    /// Records a failed fetch for `query` and `page_index`.
    ///
    /// Returns true when the failure belonged to the fetch in flight and the state moved
    /// to [`FetchState::Failed`]. There is no automatic retry.
    pub fn on_fetch_error(&mut self, query: &str, page_index: u32) -> bool {
        if !self.is_current(query, page_index) {
            tracing::debug!(tagged_query = %query, page_index, "discarding stale fetch error");
            return false;
        }

        self.state = FetchState::Failed;
        tracing::debug!(query = %self.query, page_index, "fetch failed");
        true
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<PaginationSnapshot> {
        self.source_id.map(|source_id| PaginationSnapshot {
            source_id,
            query: self.query.clone(),
            page_index: self.page_index,
            state: self.state,
        })
    }

    /// Reinstates a saved snapshot. Only valid from [`FetchState::Idle`].
    ///
    /// A fetch that was in flight when the snapshot was taken is gone. An interrupted
    /// next-page fetch rolls back to the last accepted page in [`FetchState::HasMore`]
    /// so the next scroll requests it again. If the first page never arrived, its
    /// request is issued again and returned.
    pub fn restore(&mut self, snapshot: PaginationSnapshot) -> Option<PageRequest> {
        if self.state != FetchState::Idle {
            tracing::debug!(state = ?self.state, "restore ignored, pagination already started");
            return None;
        }

        self.source_id = Some(snapshot.source_id);
        self.query = snapshot.query;

        let (page_index, state, reissue) = match snapshot.state {
            FetchState::Idle | FetchState::FetchingFirstPage => {
                (0, FetchState::FetchingFirstPage, true)
            }
            FetchState::FetchingNextPage => (
                snapshot.page_index.saturating_sub(1),
                FetchState::HasMore,
                false,
            ),
            settled => (snapshot.page_index, settled, false),
        };
        self.page_index = page_index;
        self.state = state;

        tracing::debug!(
            query = %self.query,
            page_index,
            state = ?state,
            reissue,
            "pagination restored"
        );

        reissue.then(|| self.current_request(snapshot.source_id))
    }

    fn is_current(&self, query: &str, page_index: u32) -> bool {
        self.state.is_fetching() && self.query == query && self.page_index == page_index
    }

    fn current_request(&self, source_id: SourceId) -> PageRequest {
        PageRequest {
            source_id,
            query: self.query.clone(),
            page_index: self.page_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MangaSummary;

    const SOURCE: SourceId = SourceId(1);

    fn page(index: u32, count: usize) -> MangasPage {
        let items = (0..count)
            .map(|i| MangaSummary::new(i64::from(index) * 1000 + i as i64, format!("title {i}")))
            .collect();
        MangasPage::new(index, items)
    }

    fn started() -> PaginationController {
        let mut pagination = PaginationController::new();
        pagination.start_requesting(SOURCE);
        pagination
    }

    #[test]
    fn start_issues_first_page_for_empty_query() {
        let mut pagination = PaginationController::new();
        assert_eq!(pagination.source_id(), None);
        let request = pagination.start_requesting(SOURCE);
        assert_eq!(pagination.source_id(), Some(SOURCE));

        assert_eq!(
            request,
            Some(PageRequest {
                source_id: SOURCE,
                query: String::new(),
                page_index: 0,
            })
        );
        assert_eq!(pagination.state(), FetchState::FetchingFirstPage);
        assert_eq!(pagination.start_requesting(SOURCE), None);
    }

    #[test]
    fn restart_with_same_query_changes_nothing() {
        let mut pagination = started();
        pagination.on_page_arrived("", page(0, 40));
        let before = pagination.snapshot();

        assert_eq!(pagination.restart_request(""), None);
        assert_eq!(pagination.snapshot(), before);
        assert_eq!(pagination.state(), FetchState::HasMore);
    }

    #[test]
    fn has_next_page_tracks_state() {
        let mut pagination = started();
        assert!(!pagination.has_next_page());

        pagination.on_page_arrived("", page(0, 40));
        assert!(pagination.has_next_page());

        pagination.request_next();
        pagination.on_page_arrived("", page(1, 0));
        assert_eq!(pagination.state(), FetchState::Exhausted);
        assert!(!pagination.has_next_page());
    }

    #[test]
    fn request_next_while_fetching_is_ignored() {
        let mut pagination = started();
        assert_eq!(pagination.request_next(), None);
        assert_eq!(pagination.state(), FetchState::FetchingFirstPage);

        pagination.on_page_arrived("", page(0, 10));
        assert!(pagination.request_next().is_some());
        assert_eq!(pagination.request_next(), None);
        assert_eq!(pagination.state(), FetchState::FetchingNextPage);
        assert_eq!(pagination.page_index(), 1);
    }

    #[test]
    fn page_for_superseded_query_is_discarded() {
        let mut pagination = started();
        pagination.on_page_arrived("", page(0, 10));
        pagination.request_next();
        pagination.restart_request("x");

        assert_eq!(pagination.on_page_arrived("", page(1, 10)), None);
        assert_eq!(pagination.state(), FetchState::FetchingFirstPage);
        assert_eq!(pagination.query(), "x");

        assert!(pagination.on_page_arrived("x", page(0, 5)).is_some());
        assert_eq!(pagination.state(), FetchState::HasMore);
    }

    #[test]
    fn duplicate_delivery_is_discarded() {
        let mut pagination = started();
        assert!(pagination.on_page_arrived("", page(0, 10)).is_some());
        assert_eq!(pagination.on_page_arrived("", page(0, 10)), None);
    }

    #[test]
    fn explicit_continuation_overrides_emptiness() {
        let mut pagination = started();
        pagination.on_page_arrived("", page(0, 10).with_continuation(false));
        assert_eq!(pagination.state(), FetchState::Exhausted);
    }

    #[test]
    fn errors_fail_only_the_current_fetch() {
        let mut pagination = started();
        pagination.restart_request("bleach");

        assert!(!pagination.on_fetch_error("", 0));
        assert_eq!(pagination.state(), FetchState::FetchingFirstPage);

        assert!(pagination.on_fetch_error("bleach", 0));
        assert_eq!(pagination.state(), FetchState::Failed);
        assert_eq!(pagination.request_next(), None);
        assert!(pagination.restart_request("berserk").is_some());
    }

    #[test]
    fn restart_before_start_is_ignored() {
        let mut pagination = PaginationController::new();
        assert_eq!(pagination.restart_request("x"), None);
        assert_eq!(pagination.state(), FetchState::Idle);
    }

    #[test]
    fn restore_rolls_back_interrupted_next_page() {
        let mut pagination = PaginationController::new();
        let request = pagination.restore(PaginationSnapshot {
            source_id: SOURCE,
            query: "one piece".to_string(),
            page_index: 3,
            state: FetchState::FetchingNextPage,
        });

        assert_eq!(request, None);
        assert_eq!(pagination.state(), FetchState::HasMore);
        assert_eq!(pagination.page_index(), 2);
        assert_eq!(pagination.request_next().map(|r| r.page_index), Some(3));
    }

    #[test]
    fn restore_reissues_missing_first_page() {
        let mut pagination = PaginationController::new();
        let request = pagination.restore(PaginationSnapshot {
            source_id: SOURCE,
            query: "monster".to_string(),
            page_index: 0,
            state: FetchState::FetchingFirstPage,
        });

        assert_eq!(request.map(|r| r.query), Some("monster".to_string()));
        assert_eq!(pagination.state(), FetchState::FetchingFirstPage);
    }

    #[test]
    fn restore_keeps_settled_state_without_fetching() {
        let mut pagination = PaginationController::new();
        let request = pagination.restore(PaginationSnapshot {
            source_id: SOURCE,
            query: String::new(),
            page_index: 4,
            state: FetchState::Exhausted,
        });

        assert_eq!(request, None);
        assert_eq!(pagination.state(), FetchState::Exhausted);
        assert_eq!(pagination.page_index(), 4);
        assert_eq!(pagination.start_requesting(SOURCE), None);
    }
}
