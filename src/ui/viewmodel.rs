//! View model types representing renderable catalogue state.
//!
//! View models are created via
//! [`CatalogueViewController::compute_viewmodel`](crate::app::CatalogueViewController::compute_viewmodel)
//! and consumed by the renderer. They contain no behaviour, only display-ready data for
//! the rows inside the current window.

/// Complete view model for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueViewModel {
    /// Title bar information.
    pub header: HeaderInfo,

    /// Rows inside the visible window, in list order.
    pub display_items: Vec<DisplayItem>,

    /// Absolute position of the first row in `display_items`.
    pub first_visible: usize,

    /// Number of entries in the whole visible list.
    pub total_count: usize,

    /// Full-view loading indicator.
    pub loading: bool,

    /// Trailing loading indicator below the last row.
    pub loading_more: bool,

    /// Shown instead of the list when there is nothing to display.
    pub empty_state: Option<EmptyState>,
}

/// One list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    /// Absolute position in the visible list.
    pub position: usize,

    pub title: String,

    /// Whether a thumbnail URL is known for the entry.
    pub has_thumbnail: bool,
}

/// Title bar information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    /// Source name.
    pub title: String,

    /// Active search query, empty when browsing the whole catalogue.
    pub query: String,

    /// Number of entries loaded so far.
    pub count: usize,
}

/// Empty state message display information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    /// Primary message (e.g., "No results").
    pub message: String,

    /// Secondary explanatory text.
    pub subtitle: String,
}
