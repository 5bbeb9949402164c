//! Storage backend abstraction.
//!
//! [`StateStore`] keeps at most one saved view per source. The trait is deliberately
//! small; each method maps to one moment in the view lifecycle.

use crate::domain::error::Result;
use crate::domain::SourceId;
use crate::storage::models::SavedViewState;

/// Persistence of catalogue view state across process teardown.
///
/// # Implementations
///
/// - [`JsonStateStore`](crate::storage::JsonStateStore): JSON file with atomic writes
pub trait StateStore: Send {
    /// Returns the saved view for `source_id`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self, source_id: SourceId) -> Result<Option<SavedViewState>>;

    /// Saves `state`, replacing any previous view for the same source.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn save(&mut self, state: &SavedViewState) -> Result<()>;

    /// Forgets the saved view for `source_id`. Missing entries are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn clear(&mut self, source_id: SourceId) -> Result<()>;
}
