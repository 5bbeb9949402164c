//! Host runtime: threads, timers and collaborators around the controller.
//!
//! - `collaborators`: Interfaces for navigation, images, search widget and list view
//! - `host`: [`CatalogueHost`], the control-thread event pump

pub mod collaborators;
pub mod host;

pub use collaborators::{Collaborators, ImageLoader, Navigator, SearchWidget, ViewRenderer};
pub use host::CatalogueHost;
