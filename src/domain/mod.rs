//! Domain layer for the catalogue browser.
//!
//! Core value types shared by the controller, the worker and the data sources. Nothing
//! here depends on threads, timers or rendering.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`manga`]: Catalogue entries and pages
//! - [`source`]: Source identity and per-source request metadata

pub mod error;
pub mod manga;
pub mod source;

pub use error::{CatalogueError, Result};
pub use manga::{MangaSummary, MangasPage};
pub use source::{SourceDescriptor, SourceId};
