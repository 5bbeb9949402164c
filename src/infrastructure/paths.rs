//! Filesystem locations for state and traces.

use std::path::PathBuf;

/// Directory name used under the platform data directory.
const APP_DIR: &str = "catalogue-browser";

/// Returns the data directory for saved view state and trace files.
///
/// Resolves to `catalogue-browser` under the platform data directory
/// (`$XDG_DATA_HOME` or `~/.local/share` on Linux), falling back to
/// `./.catalogue-browser` when the platform has none.
#[must_use]
pub fn data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(format!(".{APP_DIR}")), |d| d.join(APP_DIR))
}

/// Expands a leading `~` to the home directory.
///
/// Paths without a leading `~`, and all paths when no home directory is known, are
/// returned unchanged.
///
/// ```
/// use catalogue_browser::infrastructure::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(path);
    };

    if path == "~" {
        home
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}
