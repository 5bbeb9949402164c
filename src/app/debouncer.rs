//! Debouncing of search text events.
//!
//! [`SearchDebouncer`] coalesces a burst of text changes into a single delivery of the
//! last value once the input has been quiet for a fixed duration. It owns no clock: each
//! scheduled delivery is identified by a [`TimerToken`], the host arms a single-shot
//! timer for it, and reports expiry back through [`SearchDebouncer::on_timer`]. A token
//! that is no longer current is ignored, which makes cancellation a purely local
//! operation that is always safe to repeat.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quiet period after the last keystroke before a search is issued.
pub const SEARCH_TIMEOUT: Duration = Duration::from_millis(1000);

/// Identifies one armed debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

/// Outcome of [`SearchDebouncer::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Forward `value` now. `cancelled` is the timer that was pending, if any.
    Deliver {
        value: String,
        cancelled: Option<TimerToken>,
    },
    /// Arm a timer for `token`. `replaced` is the timer it supersedes, if any.
    Schedule {
        token: TimerToken,
        delay: Duration,
        replaced: Option<TimerToken>,
    },
    /// The debouncer is inactive and the value was discarded.
    Dropped,
}

#[derive(Debug, Clone)]
struct Pending {
    token: TimerToken,
    value: String,
}

/// Single-slot debouncer for search input.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    quiet: Duration,
    active: bool,
    next_token: u64,
    pending: Option<Pending>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_TIMEOUT)
    }
}

impl SearchDebouncer {
    /// Creates an inactive debouncer with the given quiet period.
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            active: false,
            next_token: 0,
            pending: None,
        }
    }

    #[must_use]
    pub const fn quiet(&self) -> Duration {
        self.quiet
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn pending_value(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.value.as_str())
    }

    /// Starts accepting debounced submissions with an empty slot.
    pub fn activate(&mut self) {
        self.pending = None;
        self.active = true;
        tracing::debug!("search debouncer activated");
    }

    /// Stops accepting submissions and cancels the pending delivery.
    ///
    /// Returns the token of the cancelled timer so the host can disarm it.
    pub fn deactivate(&mut self) -> Option<TimerToken> {
        self.active = false;
        let cancelled = self.cancel();
        tracing::debug!(cancelled = ?cancelled, "search debouncer deactivated");
        cancelled
    }

    /// Drops the pending value without delivering it.
    pub fn cancel(&mut self) -> Option<TimerToken> {
        self.pending.take().map(|p| p.token)
    }

    /// Submits a search value.
    ///
    /// Immediate values bypass the quiet period and also discard any pending value, so
    /// an older keystroke cannot fire after an explicit submit. Immediate delivery does
    /// not depend on the debouncer being active.
    pub fn submit(&mut self, value: impl Into<String>, immediate: bool) -> Submission {
        let value = value.into();

        if immediate {
            let cancelled = self.cancel();
            tracing::trace!(value = %value, cancelled = ?cancelled, "immediate search submission");
            return Submission::Deliver { value, cancelled };
        }

        if !self.active {
            tracing::trace!(value = %value, "debouncer inactive, dropping submission");
            return Submission::Dropped;
        }

        let token = TimerToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        let replaced = self.pending.replace(Pending { token, value }).map(|p| p.token);

        Submission::Schedule {
            token,
            delay: self.quiet,
            replaced,
        }
    }

    /// Reports that the timer for `token` expired.
    ///
    /// Returns the held value exactly once, and only if `token` is still the current
    /// timer of an active debouncer.
    pub fn on_timer(&mut self, token: TimerToken) -> Option<String> {
        if !self.active {
            return None;
        }
        match &self.pending {
            Some(pending) if pending.token == token => self.pending.take().map(|p| p.value),
            _ => {
                tracing::trace!(token = ?token, "ignoring stale debounce timer");
                None
            }
        }
    }
}
