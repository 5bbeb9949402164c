//! Endless-scroll trigger.
//!
//! [`ScrollTrigger`] watches layout and scroll positions and fires once when the number
//! of rows below the visible window drops to a small threshold. It then stays quiet
//! until the owner reports that the list was cleared or extended.

use serde::{Deserialize, Serialize};

/// Rows left below the window at which the next page is requested.
pub const VISIBLE_THRESHOLD: usize = 5;

/// Position of the visible window over the rendered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Index of the first row inside the window.
    pub first_visible: usize,
    /// Number of rows inside the window.
    pub visible_count: usize,
    /// Number of rows in the whole list.
    pub total_count: usize,
}

impl Viewport {
    #[must_use]
    pub const fn new(first_visible: usize, visible_count: usize, total_count: usize) -> Self {
        Self {
            first_visible,
            visible_count,
            total_count,
        }
    }

    /// Rows below the last visible one.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.total_count
            .saturating_sub(self.first_visible.saturating_add(self.visible_count))
    }

    /// True if `position` lies inside the window.
    #[must_use]
    pub const fn contains(&self, position: usize) -> bool {
        position >= self.first_visible
            && position < self.first_visible.saturating_add(self.visible_count)
    }
}

/// One-shot proximity detector for the end of the list.
#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    threshold: usize,
    requested: bool,
    viewport: Viewport,
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self::new(VISIBLE_THRESHOLD)
    }
}

impl ScrollTrigger {
    #[must_use]
    pub const fn new(threshold: usize) -> Self {
        Self {
            threshold,
            requested: false,
            viewport: Viewport::new(0, 0, 0),
        }
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        !self.requested
    }

    /// Records a scroll or layout pass.
    ///
    /// Returns true when the caller should request the next page. An empty list never
    /// triggers.
    pub fn on_scroll(&mut self, viewport: Viewport) -> bool {
        self.viewport = viewport;

        if self.requested || viewport.total_count == 0 {
            return false;
        }
        if viewport.remaining() > self.threshold {
            return false;
        }

        self.requested = true;
        tracing::trace!(
            first_visible = viewport.first_visible,
            total_count = viewport.total_count,
            "end of list reached"
        );
        true
    }

    /// The rendered list was cleared; forget the window and re-arm.
    pub fn reset(&mut self) {
        self.requested = false;
        self.viewport = Viewport::default();
    }

    /// The rendered list grew; allow a fresh crossing to trigger again.
    pub fn rearm(&mut self) {
        self.requested = false;
    }
}
