//! Storage layer for persisted view state.
//!
//! The host saves a [`SavedViewState`] when the catalogue view is torn down and hands
//! it back on recreation, so the view can be redrawn without repeating network work.
//!
//! # Modules
//!
//! - `backend`: Storage trait abstraction
//! - `json`: JSON file-based implementation with atomic writes
//! - `models`: Persisted record types

pub mod backend;
pub mod json;
pub mod models;

pub use backend::StateStore;
pub use json::JsonStateStore;
pub use models::SavedViewState;
