//! JSON file-based state store.
//!
//! Keeps every saved view in one human-readable JSON document and rewrites it atomically
//! (write-to-temp + rename) so a crash mid-write never leaves a corrupt file.

use crate::domain::error::{CatalogueError, Result};
use crate::domain::SourceId;
use crate::storage::backend::StateStore;
use crate::storage::models::SavedViewState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// Top-level structure serialized to disk.
///
/// ```json
/// {
///   "version": 1,
///   "views": {
///     "1": { "source_id": 1, "query": "naruto", "page_index": 2, "fetch_state": "HasMore",
///            "items": [...], "saved_at": 1700000000 }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreData {
    version: u32,
    #[serde(default)]
    views: BTreeMap<SourceId, SavedViewState>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            views: BTreeMap::new(),
        }
    }
}

/// JSON file state store.
///
/// Data is kept in memory and written through on every modification.
pub struct JsonStateStore {
    file_path: PathBuf,
    data: StoreData,
}

impl JsonStateStore {
    /// Opens or creates a store at `file_path`.
    ///
    /// Parent directories are created automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or an existing file cannot be
    /// read or parsed.
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON state store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            StoreData::default()
        };

        tracing::debug!(view_count = data.views.len(), "state store initialized");
        Ok(Self { file_path, data })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<StoreData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StoreData = serde_json::from_str(&contents)
            .map_err(|e| CatalogueError::Storage(format!("failed to parse JSON: {e}")))?;

        if data.version != FORMAT_VERSION {
            return Err(CatalogueError::Storage(format!(
                "unsupported state file version {}",
                data.version
            )));
        }
        Ok(data)
    }

    fn save_to_file(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| CatalogueError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        tracing::trace!(path = ?self.file_path, "state store written");
        Ok(())
    }
}

impl StateStore for JsonStateStore {
    fn load(&self, source_id: SourceId) -> Result<Option<SavedViewState>> {
        let state = self.data.views.get(&source_id).cloned();
        tracing::debug!(source_id = %source_id, found = state.is_some(), "saved view lookup");
        Ok(state)
    }

    fn save(&mut self, state: &SavedViewState) -> Result<()> {
        let _span = tracing::debug_span!("json_save_view",
            source_id = %state.source_id,
            query = %state.query,
            item_count = state.items.len()
        ).entered();

        self.data.views.insert(state.source_id, state.clone());
        self.save_to_file()
    }

    fn clear(&mut self, source_id: SourceId) -> Result<()> {
        if self.data.views.remove(&source_id).is_some() {
            self.save_to_file()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pagination::FetchState;
    use crate::domain::MangaSummary;

    fn saved(source: u32, query: &str) -> SavedViewState {
        SavedViewState {
            source_id: SourceId(source),
            query: query.to_string(),
            page_index: 1,
            fetch_state: FetchState::HasMore,
            items: vec![MangaSummary::new(1, "Naruto").with_thumbnail("https://img/1.jpg")],
            saved_at: 1_700_000_000,
        }
    }

    #[test]
    fn saved_views_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("views.json");

        let mut store = JsonStateStore::new(path.clone()).unwrap();
        store.save(&saved(1, "naruto")).unwrap();
        store.save(&saved(2, "")).unwrap();
        drop(store);

        let reopened = JsonStateStore::new(path).unwrap();
        assert_eq!(reopened.load(SourceId(1)).unwrap(), Some(saved(1, "naruto")));
        assert_eq!(reopened.load(SourceId(2)).unwrap().map(|s| s.query), Some(String::new()));
        assert_eq!(reopened.load(SourceId(3)).unwrap(), None);
    }

    #[test]
    fn save_replaces_previous_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStateStore::new(dir.path().join("views.json")).unwrap();

        store.save(&saved(1, "bleach")).unwrap();
        store.save(&saved(1, "berserk")).unwrap();

        assert_eq!(store.load(SourceId(1)).unwrap().map(|s| s.query), Some("berserk".to_string()));
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStateStore::new(dir.path().join("views.json")).unwrap();

        store.save(&saved(1, "x")).unwrap();
        store.clear(SourceId(1)).unwrap();
        store.clear(SourceId(1)).unwrap();
        assert_eq!(store.load(SourceId(1)).unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("views.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(JsonStateStore::new(path), Err(CatalogueError::Storage(_))));
    }
}
