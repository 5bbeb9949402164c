//! Event handling for the catalogue view.
//!
//! Every input the view receives, whether from the user, the host's timers or the
//! background worker, is modelled as an [`Event`]. [`handle_event`] routes it to the
//! controller and reports whether the view needs to be redrawn along with the actions
//! the host must execute.
//!
//! # Event Types
//!
//! - **Lifecycle**: `Activated`, `Deactivated`, `SearchWidgetBuilt`
//! - **Input**: `SearchTextChanged`, `SearchSubmitted`, `Scrolled`, `ItemSelected`
//! - **System**: `TimerElapsed`, `MangaUpdated`
//! - **Worker**: `WorkerResponse` with typed result variants
//!
//! # Example
//!
//! ```rust
//! use catalogue_browser::app::{handle_event, CatalogueViewController, ControllerSettings, Event};
//! use catalogue_browser::domain::{SourceDescriptor, SourceId};
//! use catalogue_browser::source::FixtureCatalogue;
//! use std::collections::BTreeMap;
//!
//! let registry = FixtureCatalogue::new(20)
//!     .with_source(SourceDescriptor::new(SourceId(1), "Batoto"), vec![]);
//! let args = BTreeMap::from([("source_id".to_string(), "1".to_string())]);
//! let (mut controller, _) =
//!     CatalogueViewController::create(&args, &registry, None, ControllerSettings::default())?;
//!
//! let (_, actions) = handle_event(&mut controller, &Event::SearchSubmitted("berserk".into()));
//! assert_eq!(actions.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use super::actions::Action;
use super::controller::CatalogueViewController;
use super::debouncer::TimerToken;
use super::scroll::Viewport;
use crate::domain::MangaSummary;
use crate::worker::WorkerResponse;

/// Inputs delivered to the catalogue view on the control thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The view became visible and interactive.
    Activated,
    /// The view stopped.
    Deactivated,
    /// The search widget was built and can be pre-populated.
    SearchWidgetBuilt,
    /// The search text changed; debounced.
    SearchTextChanged(String),
    /// The search text was submitted explicitly; delivered at once.
    SearchSubmitted(String),
    /// A debounce timer armed through [`Action::ScheduleTimer`] expired.
    TimerElapsed(TimerToken),
    /// The list view scrolled or completed a layout pass.
    Scrolled(Viewport),
    /// The user tapped the row at this absolute position.
    ItemSelected(usize),
    /// Details for an entry arrived out of band, typically with a thumbnail URL.
    MangaUpdated(MangaSummary),
    /// Wraps a response from the background worker thread.
    WorkerResponse(WorkerResponse),
}

/// Processes an event and returns `(should_render, actions)`.
///
/// `should_render` is true when anything the view model shows has changed. Actions must
/// be executed in order.
pub fn handle_event(controller: &mut CatalogueViewController, event: &Event) -> (bool, Vec<Action>) {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();
    let revision = controller.revision();

    let actions = match event {
        Event::Activated => controller.activate(),
        Event::Deactivated => controller.deactivate(),
        Event::SearchWidgetBuilt => controller.on_search_widget_built(),
        Event::SearchTextChanged(value) => controller.on_search_event(value, false),
        Event::SearchSubmitted(value) => controller.on_search_event(value, true),
        Event::TimerElapsed(token) => controller.on_timer(*token),
        Event::Scrolled(viewport) => controller.on_scroll(*viewport),
        Event::ItemSelected(position) => {
            let actions = controller.select(*position);
            if actions.is_empty() {
                tracing::debug!(position, "selection outside list ignored");
            }
            actions
        }
        Event::MangaUpdated(manga) => controller.update_image(manga),
        Event::WorkerResponse(response) => {
            if !controller.on_worker_response(response.clone()) {
                tracing::debug!("stale worker response discarded");
            }
            vec![]
        }
    };

    (controller.revision() != revision, actions)
}
