//! Interfaces the host drives on behalf of the controller.
//!
//! All collaborators are called on the control thread only.

use crate::domain::MangaSummary;
use crate::ui::CatalogueViewModel;
use std::collections::BTreeMap;

/// Opens other screens.
pub trait Navigator {
    /// Opens the detail view. `from_network` is true for entries browsed from a source.
    fn open_detail(&mut self, manga: &MangaSummary, from_network: bool);
}

/// Loads images out of band.
pub trait ImageLoader {
    /// Loads `url` into the materialized row `slot` showing list `position`.
    fn load_thumbnail(&mut self, position: usize, slot: usize, url: &str, headers: &BTreeMap<String, String>);
}

/// The search input.
pub trait SearchWidget {
    /// Shows `query` in the widget without emitting a change event.
    fn preset_query(&mut self, query: &str);
}

/// The list view.
pub trait ViewRenderer {
    /// Number of rows the view can show at once.
    fn rows(&self) -> usize;

    fn render(&mut self, vm: &CatalogueViewModel);

    fn scroll_to_top(&mut self);
}

/// The full set of collaborators a host needs.
pub struct Collaborators {
    pub navigator: Box<dyn Navigator>,
    pub images: Box<dyn ImageLoader>,
    pub search: Box<dyn SearchWidget>,
    pub renderer: Box<dyn ViewRenderer>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
