//! Catalogue browser: an endless, searchable listing of one manga source.
//!
//! The crate provides the control logic behind a catalogue screen:
//! - Debounced search-as-you-type with explicit submit
//! - Endless scroll that requests the next page near the end of the list
//! - Query-tagged paging so results for an outdated query are never shown
//! - View state that survives process teardown and redraws without refetching
//! - Fetches on a background worker thread with trace propagation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Terminal host (main.rs) / CatalogueHost (runtime/) │  ← Threads, timers
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← Pure state machines
//! │  - Debouncer, pagination, scroll trigger            │
//! │  - CatalogueViewController + event handler          │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Storage Layer │   │ Worker Layer  │
//! │ (ui/)         │   │ (storage/)    │   │ (worker/)     │
//! │ - View model  │   │ - JSON I/O    │   │ - Page fetch  │
//! │ - Text render │   │ - StateStore  │   │ - Trace ctx   │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                                                  │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain, sources, infrastructure, observability     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! Configuration comes from a TOML file or a key/value map:
//!
//! ```toml
//! source_id = 1
//! catalogue_file = "~/catalogue.json"
//! debounce_ms = 1000
//! scroll_threshold = 5
//! page_size = 20
//! visible_rows = 10
//! trace_level = "debug"
//! ```
//!
//! # Example
//!
//! ```rust
//! use catalogue_browser::source::FixtureCatalogue;
//! use catalogue_browser::domain::{SourceDescriptor, SourceId};
//! use catalogue_browser::storage::JsonStateStore;
//! use catalogue_browser::{handle_event, initialize, Config, Event};
//!
//! let dir = tempfile::tempdir()?;
//! let catalogue = FixtureCatalogue::new(20)
//!     .with_source(SourceDescriptor::new(SourceId(1), "Batoto"), vec![]);
//! let store = JsonStateStore::new(dir.path().join("state.json"))?;
//! let config = Config { source_id: Some(SourceId(1)), ..Config::default() };
//!
//! let (mut controller, actions) = initialize(&config, &catalogue, &store)?;
//! assert_eq!(actions.len(), 1);
//!
//! let (_, actions) = handle_event(&mut controller, &Event::SearchSubmitted("berserk".into()));
//! assert_eq!(controller.query(), "berserk");
//! # let _ = actions;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod runtime;
pub mod source;
pub mod storage;
pub mod worker;

pub mod ui;

pub mod observability;

pub use app::{handle_event, Action, CatalogueViewController, ControllerSettings, Event};
pub use domain::{CatalogueError, MangaSummary, MangasPage, Result, SourceId};

use app::controller::SOURCE_ID_ARG;
use serde::Deserialize;
use source::SourceRegistry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storage::StateStore;

/// State file name inside the data directory.
pub const STATE_FILE: &str = "catalogue-state.json";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source to browse.
    pub source_id: Option<SourceId>,

    /// JSON fixture catalogue to serve pages from.
    pub catalogue_file: Option<String>,

    /// Saved view state file. Default: `<data_dir>/catalogue-state.json`
    pub state_file: Option<String>,

    /// Search debounce quiet period in milliseconds. Default: 1000
    pub debounce_ms: u64,

    /// Rows left below the window that trigger the next page. Default: 5
    pub scroll_threshold: usize,

    /// Entries per fixture page. Default: 20
    pub page_size: usize,

    /// Rows shown at once by the terminal host. Default: 10
    pub visible_rows: usize,

    /// Tracing filter. Options: `trace`, `debug`, `info`, `warn`, `error`.
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_id: None,
            catalogue_file: None,
            state_file: None,
            debounce_ms: 1000,
            scroll_threshold: app::scroll::VISIBLE_THRESHOLD,
            page_size: source::fixture::DEFAULT_PAGE_SIZE,
            visible_rows: 10,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from a key/value map.
    ///
    /// Each field falls back to its default when missing, empty or unparsable.
    ///
    /// ```rust
    /// use catalogue_browser::Config;
    /// use std::collections::BTreeMap;
    ///
    /// let map = BTreeMap::from([
    ///     ("source_id".to_string(), "3".to_string()),
    ///     ("debounce_ms".to_string(), "abc".to_string()),
    /// ]);
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.source_id.map(|id| id.0), Some(3));
    /// assert_eq!(config.debounce_ms, 1000);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| {
            map.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let number = |key: &str, fallback: usize| {
            text(key)
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(fallback)
        };

        Self {
            source_id: text(SOURCE_ID_ARG).and_then(|v| v.parse().ok()),
            catalogue_file: text("catalogue_file"),
            state_file: text("state_file"),
            debounce_ms: text("debounce_ms")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.debounce_ms),
            scroll_threshold: number("scroll_threshold", defaults.scroll_threshold),
            page_size: number("page_size", defaults.page_size).max(1),
            visible_rows: number("visible_rows", defaults.visible_rows).max(1),
            trace_level: text("trace_level"),
        }
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Config`] if the document is malformed.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| CatalogueError::Config(format!("invalid configuration: {e}")))
    }

    /// Reads a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Io`] if the file cannot be read, or
    /// [`CatalogueError::Config`] if it is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Navigation arguments for [`CatalogueViewController::create`].
    #[must_use]
    pub fn navigation_args(&self) -> BTreeMap<String, String> {
        self.source_id
            .map(|id| (SOURCE_ID_ARG.to_string(), id.to_string()))
            .into_iter()
            .collect()
    }

    /// Controller tunables derived from this configuration.
    #[must_use]
    pub const fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            scroll_threshold: self.scroll_threshold,
        }
    }

    /// Resolved path of the saved view state file.
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.state_file.as_deref().map_or_else(
            || infrastructure::data_dir().join(STATE_FILE),
            infrastructure::expand_tilde,
        )
    }

    /// Resolved path of the fixture catalogue, if configured.
    #[must_use]
    pub fn catalogue_path(&self) -> Option<PathBuf> {
        self.catalogue_file.as_deref().map(infrastructure::expand_tilde)
    }
}

/// Creates the controller for `config`, restoring any view saved in `store`.
///
/// A saved view that cannot be read is logged and ignored.
///
/// # Errors
///
/// Returns [`CatalogueError::Config`] if the configured source is missing or unknown.
pub fn initialize(
    config: &Config,
    registry: &dyn SourceRegistry,
    store: &dyn StateStore,
) -> Result<(CatalogueViewController, Vec<Action>)> {
    tracing::debug!(source_id = ?config.source_id, "initializing catalogue view");

    let saved = config.source_id.and_then(|id| {
        store.load(id).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load saved view, starting fresh");
            None
        })
    });

    CatalogueViewController::create(
        &config.navigation_args(),
        registry,
        saved,
        config.controller_settings(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = Config::from_toml_str("source_id = 4\npage_size = 5\n").expect("config");
        assert_eq!(config.source_id, Some(SourceId(4)));
        assert_eq!(config.page_size, 5);
        assert_eq!(config.debounce_ms, 1000);
        assert_eq!(config.visible_rows, 10);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            Config::from_toml_str("source_id = ["),
            Err(CatalogueError::Config(_))
        ));
    }

    #[test]
    fn navigation_args_carry_source_id() {
        let config = Config {
            source_id: Some(SourceId(9)),
            ..Config::default()
        };
        assert_eq!(
            config.navigation_args().get(SOURCE_ID_ARG).map(String::as_str),
            Some("9")
        );
        assert!(Config::default().navigation_args().is_empty());
    }

    #[test]
    fn empty_map_values_fall_back() {
        let map = BTreeMap::from([
            ("visible_rows".to_string(), "0".to_string()),
            ("trace_level".to_string(), "  ".to_string()),
        ]);
        let config = Config::from_map(&map);
        assert_eq!(config.visible_rows, 1);
        assert_eq!(config.trace_level, None);
    }
}
