//! User interface layer.
//!
//! ```text
//! CatalogueViewController → compute_viewmodel → CatalogueViewModel → render → text frame
//! ```
//!
//! # Modules
//!
//! - [`viewmodel`]: View model types representing renderable state
//! - [`renderer`]: Plain-text frame rendering

pub mod renderer;
pub mod viewmodel;

pub use renderer::render;
pub use viewmodel::{CatalogueViewModel, DisplayItem, EmptyState, HeaderInfo};
