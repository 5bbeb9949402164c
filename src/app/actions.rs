//! Actions representing side effects to be executed by the host runtime.
//!
//! The controller never touches threads, timers or views directly. Each operation
//! returns a `Vec<Action>` and the host executes them in order on the control thread.
//!
//! # Example
//!
//! ```rust
//! use catalogue_browser::app::Action;
//! use catalogue_browser::app::debouncer::TimerToken;
//! use std::time::Duration;
//!
//! let actions = vec![
//!     Action::ScrollToTop,
//!     Action::ScheduleTimer { token: TimerToken(0), delay: Duration::from_millis(1000) },
//! ];
//! assert_eq!(actions.len(), 2);
//! ```

use crate::app::debouncer::TimerToken;
use crate::domain::MangaSummary;
use crate::worker::WorkerMessage;
use std::collections::BTreeMap;
use std::time::Duration;

/// Commands the host executes on behalf of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Posts a fetch to the background worker.
    PostToWorker(WorkerMessage),

    /// Arms a single-shot timer; on expiry the host delivers
    /// [`Event::TimerElapsed`](crate::app::Event::TimerElapsed) with the same token.
    ScheduleTimer {
        /// Token identifying this timer.
        token: TimerToken,
        /// Delay before expiry.
        delay: Duration,
    },

    /// Disarms a previously scheduled timer. Unknown tokens are ignored.
    CancelTimer {
        /// Token of the timer to drop.
        token: TimerToken,
    },

    /// Scrolls the list view back to its first row.
    ScrollToTop,

    /// Pre-populates the search widget without it emitting a change event.
    PresetSearch {
        /// Query to show in the widget.
        query: String,
    },

    /// Loads a thumbnail out of band into a materialized row.
    LoadThumbnail {
        /// Absolute list position of the entry.
        position: usize,
        /// Index of the materialized row inside the visible window.
        slot: usize,
        /// Image URL.
        url: String,
        /// Source-specific request headers.
        headers: BTreeMap<String, String>,
    },

    /// Opens the detail view for an entry.
    OpenDetail {
        /// The selected entry.
        manga: MangaSummary,
        /// True when the entry came from network browsing rather than the local library.
        from_network: bool,
    },
}
