//! Application layer coordinating the catalogue view.
//!
//! This layer sits between the host runtime and the domain/source/storage layers. It
//! owns no threads and no clocks: inputs arrive as [`Event`]s and every side effect
//! leaves as an [`Action`].
//!
//! ```text
//! Input → Events → handle_event → CatalogueViewController → Actions → Host
//!            ↑                                                   ↓
//!            └──────────── timers, worker responses ─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands executed by the host
//! - [`controller`]: The orchestrator owning the visible list and loading indicators
//! - [`debouncer`]: Coalescing of search keystrokes
//! - [`handler`]: Event routing and redraw detection
//! - [`pagination`]: Query/page/fetch-state machine with stale-result detection
//! - [`scroll`]: End-of-list proximity trigger

pub mod actions;
pub mod controller;
pub mod debouncer;
pub mod handler;
pub mod pagination;
pub mod scroll;

pub use actions::Action;
pub use controller::{CatalogueViewController, ControllerSettings, LoadingIndicators, SOURCE_ID_ARG};
pub use handler::{handle_event, Event};
pub use pagination::{FetchState, PageRequest, PaginationController, PaginationSnapshot};
pub use scroll::Viewport;
