//! Error types for the catalogue browser.
//!
//! This module defines the centralized error type [`CatalogueError`] and a type alias
//! [`Result`] used throughout the crate. All errors are implemented with the `thiserror`
//! crate.

use thiserror::Error;

/// The main error type for catalogue browsing operations.
///
/// Only [`CatalogueError::Config`] is fatal to view initialization. Fetch failures are
/// absorbed by the controller and never escape it; they appear here so that data
/// sources have a typed way to report them.
///
/// # Examples
///
/// ```
/// use catalogue_browser::CatalogueError;
///
/// fn resolve() -> Result<(), CatalogueError> {
///     Err(CatalogueError::Config("missing source_id".to_string()))
/// }
/// assert!(resolve().is_err());
/// ```
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// Configuration is invalid or missing.
    ///
    /// Raised when navigation arguments lack a usable `source_id`, when the id does not
    /// name a registered source, or when a configuration file cannot be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The data source could not produce a page.
    ///
    /// Network and parse problems are not distinguished; every cause means "page
    /// unavailable".
    #[error("Fetch failure: {0}")]
    Fetch(String),

    /// Persisted view state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The background fetch worker is unreachable.
    #[error("Worker communication error: {0}")]
    Worker(String),
}

/// A specialized `Result` type for catalogue operations.
pub type Result<T> = std::result::Result<T, CatalogueError>;
