//! Catalogue view orchestration.
//!
//! [`CatalogueViewController`] ties the search debouncer, the pagination state machine
//! and the scroll trigger to the visible list. It is the single owner of everything the
//! view shows and is only ever touched from the control thread; results computed on
//! other threads reach it as events.
//!
//! # Control Flow
//!
//! ```text
//! search widget ──▶ on_search_event ──▶ SearchDebouncer ──timer──▶ restart_request ─┐
//! scroll/layout ──▶ on_scroll ──▶ ScrollTrigger ──▶ request_next_page ──────────────┤
//!                                                                                   ▼
//!                                                    PaginationController ──▶ Action::PostToWorker
//! worker ──▶ on_worker_response ──▶ PaginationController (stale check) ──▶ on_add_page / on_add_page_error
//! ```
//!
//! # Lifecycle
//!
//! [`CatalogueViewController::create`] either starts a fresh listing or restores a saved
//! one. Restoring redraws the saved items and issues no fetch unless the first page was
//! still missing when the state was saved.

use super::actions::Action;
use super::debouncer::{SearchDebouncer, Submission, TimerToken, SEARCH_TIMEOUT};
use super::pagination::{FetchState, PageRequest, PaginationController};
use super::scroll::{ScrollTrigger, Viewport, VISIBLE_THRESHOLD};
use crate::domain::error::{CatalogueError, Result};
use crate::domain::{MangaSummary, MangasPage, SourceDescriptor, SourceId};
use crate::source::SourceRegistry;
use crate::storage::SavedViewState;
use crate::ui::viewmodel::{CatalogueViewModel, DisplayItem, EmptyState, HeaderInfo};
use crate::worker::{WorkerMessage, WorkerResponse};
use std::collections::BTreeMap;
use std::time::Duration;

/// Navigation argument naming the source to browse.
pub const SOURCE_ID_ARG: &str = "source_id";

/// Tunables for a controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Quiet period for debounced search input.
    pub debounce: Duration,
    /// Rows left below the window at which the next page is requested.
    pub scroll_threshold: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            debounce: SEARCH_TIMEOUT,
            scroll_threshold: VISIBLE_THRESHOLD,
        }
    }
}

/// Visibility of the two loading indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingIndicators {
    /// Full-view spinner shown while a first page loads.
    pub primary: bool,
    /// Trailing spinner shown while a later page loads.
    pub secondary: bool,
}

/// Orchestrator for one catalogue view.
#[derive(Debug)]
pub struct CatalogueViewController {
    source: SourceDescriptor,
    pagination: PaginationController,
    debouncer: SearchDebouncer,
    scroll: ScrollTrigger,
    visible: Vec<MangaSummary>,
    indicators: LoadingIndicators,
    restored: bool,
    revision: u64,
}

/// Reads the source id from navigation arguments.
///
/// # Errors
///
/// Returns [`CatalogueError::Config`] if the argument is missing or not a valid id.
pub fn resolve_source_id(args: &BTreeMap<String, String>) -> Result<SourceId> {
    let raw = args
        .get(SOURCE_ID_ARG)
        .ok_or_else(|| CatalogueError::Config(format!("missing navigation argument `{SOURCE_ID_ARG}`")))?;

    raw.parse::<SourceId>()
        .map_err(|e| CatalogueError::Config(format!("invalid source id `{raw}`: {e}")))
}

fn fetch(request: PageRequest) -> Action {
    Action::PostToWorker(WorkerMessage::fetch_page(request))
}

fn cancel(token: TimerToken) -> Action {
    Action::CancelTimer { token }
}

impl CatalogueViewController {
    /// Creates the controller for a view.
    ///
    /// Resolves the source from `args`, shows the loading indicator, then restores
    /// `saved` when it belongs to the same source or starts a fresh listing otherwise.
    /// The returned actions must be executed by the host.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Config`] if `source_id` is missing, malformed or not
    /// registered.
    pub fn create(
        args: &BTreeMap<String, String>,
        registry: &dyn SourceRegistry,
        saved: Option<SavedViewState>,
        settings: ControllerSettings,
    ) -> Result<(Self, Vec<Action>)> {
        let source_id = resolve_source_id(args)?;
        let source = registry
            .source(source_id)
            .ok_or_else(|| CatalogueError::Config(format!("unknown source: {source_id}")))?;

        let _span = tracing::debug_span!("create_catalogue_view",
            source_id = %source_id,
            source_name = %source.name,
            restoring = saved.is_some()
        ).entered();

        let mut controller = Self {
            source,
            pagination: PaginationController::new(),
            debouncer: SearchDebouncer::new(settings.debounce),
            scroll: ScrollTrigger::new(settings.scroll_threshold),
            visible: Vec::new(),
            indicators: LoadingIndicators {
                primary: true,
                secondary: false,
            },
            restored: false,
            revision: 0,
        };

        let actions = match saved {
            Some(saved) if saved.source_id == source_id => controller.restore(saved),
            Some(saved) => {
                tracing::warn!(
                    saved_source = %saved.source_id,
                    source_id = %source_id,
                    "ignoring saved state for another source"
                );
                controller.start()
            }
            None => controller.start(),
        };

        Ok((controller, actions))
    }

    fn start(&mut self) -> Vec<Action> {
        self.pagination
            .start_requesting(self.source.id)
            .map(fetch)
            .into_iter()
            .collect()
    }

    /// Reinstates a saved view.
    ///
    /// Only valid before any fetch was issued by this controller; afterwards it is a
    /// no-op. Saved items are redrawn as they were. A fetch is returned only if the
    /// saved view was still waiting for its first page.
    pub fn restore(&mut self, saved: SavedViewState) -> Vec<Action> {
        if self.pagination.state() != FetchState::Idle {
            tracing::debug!(state = ?self.pagination.state(), "restore ignored, requests already started");
            return vec![];
        }
        if saved.source_id != self.source.id {
            tracing::warn!(saved_source = %saved.source_id, "restore ignored, source mismatch");
            return vec![];
        }

        let reissue = self.pagination.restore(saved.pagination());
        self.scroll.reset();
        self.restored = true;
        self.touch();

        if let Some(request) = reissue {
            self.visible.clear();
            self.indicators.primary = true;
            return vec![fetch(request)];
        }

        tracing::debug!(
            query = %saved.query,
            item_count = saved.items.len(),
            "view restored without fetching"
        );
        self.visible = saved.items;
        self.hide_indicators();
        vec![]
    }

    /// Called when the view becomes active (visible and interactive).
    pub fn activate(&mut self) -> Vec<Action> {
        self.debouncer.activate();
        vec![]
    }

    /// Called when the view stops. No debounced search is delivered afterwards.
    pub fn deactivate(&mut self) -> Vec<Action> {
        self.debouncer.deactivate().map(cancel).into_iter().collect()
    }

    /// Called when the search widget is built.
    ///
    /// An active query is pushed into the widget without it emitting a change event.
    #[must_use]
    pub fn on_search_widget_built(&self) -> Vec<Action> {
        let query = self.pagination.query();
        if query.is_empty() {
            return vec![];
        }
        vec![Action::PresetSearch {
            query: query.to_string(),
        }]
    }

    /// Entry point for both "text changed" (`immediate == false`) and "submitted"
    /// (`immediate == true`) widget events.
    ///
    /// A value equal to the active query does nothing beyond dropping a pending
    /// debounced value, which would otherwise fire later with outdated text.
    pub fn on_search_event(&mut self, value: &str, immediate: bool) -> Vec<Action> {
        if value == self.pagination.query() {
            return self.debouncer.cancel().map(cancel).into_iter().collect();
        }

        match self.debouncer.submit(value, immediate) {
            Submission::Deliver { value, cancelled } => {
                let mut actions: Vec<Action> = cancelled.map(cancel).into_iter().collect();
                actions.extend(self.restart_request(&value));
                actions
            }
            Submission::Schedule {
                token,
                delay,
                replaced,
            } => {
                let mut actions: Vec<Action> = replaced.map(cancel).into_iter().collect();
                actions.push(Action::ScheduleTimer { token, delay });
                actions
            }
            Submission::Dropped => vec![],
        }
    }

    /// Called when a debounce timer expires.
    pub fn on_timer(&mut self, token: TimerToken) -> Vec<Action> {
        self.debouncer
            .on_timer(token)
            .map(|value| self.restart_request(&value))
            .unwrap_or_default()
    }

    /// Starts over with `query`.
    ///
    /// The visible list is cleared and the view scrolled to the top. A query equal to
    /// the active one is a no-op.
    pub fn restart_request(&mut self, query: &str) -> Vec<Action> {
        let Some(request) = self.pagination.restart_request(query) else {
            return vec![];
        };

        self.visible.clear();
        self.scroll.reset();
        self.indicators = LoadingIndicators {
            primary: true,
            secondary: false,
        };
        self.touch();

        vec![Action::ScrollToTop, fetch(request)]
    }

    /// Called on every scroll or layout pass of the list view.
    pub fn on_scroll(&mut self, viewport: Viewport) -> Vec<Action> {
        if self.scroll.on_scroll(viewport) {
            self.request_next_page()
        } else {
            vec![]
        }
    }

    /// Requests the next page if one is available.
    pub fn request_next_page(&mut self) -> Vec<Action> {
        if !self.pagination.has_next_page() {
            return vec![];
        }
        let Some(request) = self.pagination.request_next() else {
            return vec![];
        };

        self.indicators.secondary = true;
        self.touch();
        vec![fetch(request)]
    }

    /// Feeds a worker result through the stale-result check.
    ///
    /// Returns true if the visible state changed.
    pub fn on_worker_response(&mut self, response: WorkerResponse) -> bool {
        match response {
            WorkerResponse::PageLoaded { query, page } => {
                match self.pagination.on_page_arrived(&query, page) {
                    Some(page) => {
                        self.on_add_page(page);
                        true
                    }
                    None => false,
                }
            }
            WorkerResponse::PageFailed {
                query,
                page_index,
                message,
            } => {
                if self.pagination.on_fetch_error(&query, page_index) {
                    tracing::warn!(query = %query, page_index, error = %message, "page unavailable");
                    self.on_add_page_error();
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Applies an accepted page to the visible list.
    ///
    /// Page 0 replaces the list; later pages are appended in arrival order. The scroll
    /// trigger is re-armed only after the list has been updated.
    pub fn on_add_page(&mut self, page: MangasPage) {
        self.hide_indicators();

        if page.index == 0 {
            self.visible.clear();
            self.scroll.reset();
        }
        self.visible.extend(page.items);
        self.scroll.rearm();
        self.touch();
    }

    /// Applies a failed fetch. The list and the fetch state are left as they are.
    pub fn on_add_page_error(&mut self) {
        self.hide_indicators();
        self.touch();
    }

    /// Reloads the thumbnail of `manga` if its row is currently materialized.
    ///
    /// The stored summary is replaced either way, so a row that scrolls back into view
    /// binds the new thumbnail by itself.
    pub fn update_image(&mut self, manga: &MangaSummary) -> Vec<Action> {
        let Some(position) = self.visible.iter().rposition(|m| m.same_entry(manga)) else {
            tracing::trace!(manga_id = manga.id, "image update for entry not in list");
            return vec![];
        };
        if self.visible[position] != *manga {
            self.visible[position] = manga.clone();
            self.touch();
        }

        let viewport = self.scroll.viewport();
        if !viewport.contains(position) {
            tracing::trace!(manga_id = manga.id, position, "image update for row outside window");
            return vec![];
        }
        let Some(url) = manga.thumbnail_url.clone() else {
            return vec![];
        };

        vec![Action::LoadThumbnail {
            position,
            slot: position - viewport.first_visible,
            url,
            headers: self.source.headers.clone(),
        }]
    }

    /// Opens the detail view for the entry at `position`.
    #[must_use]
    pub fn select(&self, position: usize) -> Vec<Action> {
        self.visible
            .get(position)
            .map(|manga| Action::OpenDetail {
                manga: manga.clone(),
                from_network: true,
            })
            .into_iter()
            .collect()
    }

    /// Captures the view for persistence.
    #[must_use]
    pub fn save_state(&self) -> Option<SavedViewState> {
        self.pagination
            .snapshot()
            .map(|snapshot| SavedViewState::new(snapshot, self.visible.clone()))
    }

    #[must_use]
    pub const fn source(&self) -> &SourceDescriptor {
        &self.source
    }

    #[must_use]
    pub fn query(&self) -> &str {
        self.pagination.query()
    }

    #[must_use]
    pub const fn fetch_state(&self) -> FetchState {
        self.pagination.state()
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.pagination.has_next_page()
    }

    #[must_use]
    pub fn visible_items(&self) -> &[MangaSummary] {
        &self.visible
    }

    #[must_use]
    pub const fn indicators(&self) -> LoadingIndicators {
        self.indicators
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.scroll.viewport()
    }

    /// True if this controller was populated from saved state.
    #[must_use]
    pub const fn was_restored(&self) -> bool {
        self.restored
    }

    /// Monotonic counter bumped whenever something the view renders changes.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Computes a renderable view model for `rows` rows starting at `first_visible`.
    #[must_use]
    pub fn compute_viewmodel(&self, first_visible: usize, rows: usize) -> CatalogueViewModel {
        let start = first_visible.min(self.visible.len());
        let end = start.saturating_add(rows).min(self.visible.len());

        let display_items = self.visible[start..end]
            .iter()
            .enumerate()
            .map(|(offset, manga)| DisplayItem {
                position: start + offset,
                title: manga.title.clone(),
                has_thumbnail: manga.thumbnail_url.is_some(),
            })
            .collect();

        let empty_state = (self.visible.is_empty() && !self.indicators.primary).then(|| {
            if self.pagination.state() == FetchState::Failed {
                EmptyState {
                    message: "Catalogue unavailable".to_string(),
                    subtitle: "The source could not be reached".to_string(),
                }
            } else {
                EmptyState {
                    message: "No results".to_string(),
                    subtitle: "Try a different search".to_string(),
                }
            }
        });

        CatalogueViewModel {
            header: HeaderInfo {
                title: self.source.name.clone(),
                query: self.pagination.query().to_string(),
                count: self.visible.len(),
            },
            display_items,
            first_visible: start,
            total_count: self.visible.len(),
            loading: self.indicators.primary,
            loading_more: self.indicators.secondary,
            empty_state,
        }
    }

    fn hide_indicators(&mut self) {
        self.indicators = LoadingIndicators::default();
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
