//! Control-thread scheduler for one catalogue view.
//!
//! [`CatalogueHost`] is the only owner of the controller. Worker responses, input events
//! posted through [`CatalogueHost::mailbox`] and expired debounce timers are all
//! funnelled through [`CatalogueHost::pump`], which handles exactly one of them per call
//! on the calling thread. That thread is the control thread.

use super::collaborators::Collaborators;
use crate::app::debouncer::TimerToken;
use crate::app::{handle_event, Action, CatalogueViewController, Event, Viewport};
use crate::domain::error::{CatalogueError, Result};
use crate::source::CatalogueSource;
use crate::storage::SavedViewState;
use crate::worker::{CatalogueWorker, WorkerHandle, WorkerResponse};
use crossbeam_channel::{Receiver, Sender};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Upper bound on consecutive layout passes after one render.
const MAX_LAYOUT_PASSES: usize = 4;

enum Incoming {
    Worker(WorkerResponse),
    Event(Event),
    Idle,
}

/// Runs a [`CatalogueViewController`] against real threads and timers.
#[derive(Debug)]
pub struct CatalogueHost {
    controller: CatalogueViewController,
    collaborators: Collaborators,
    worker: Option<WorkerHandle>,
    responses: Receiver<WorkerResponse>,
    mailbox: Sender<Event>,
    inbox: Receiver<Event>,
    timers: BTreeMap<TimerToken, Instant>,
    first_visible: usize,
}

impl CatalogueHost {
    /// Spawns the worker for `source`, executes `initial_actions` and draws the first frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn new(
        controller: CatalogueViewController,
        initial_actions: Vec<Action>,
        source: Box<dyn CatalogueSource>,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let (response_tx, responses) = crossbeam_channel::unbounded();
        let (mailbox, inbox) = crossbeam_channel::unbounded();
        let worker = CatalogueWorker::new(source).spawn(response_tx)?;

        let mut host = Self {
            controller,
            collaborators,
            worker: Some(worker),
            responses,
            mailbox,
            inbox,
            timers: BTreeMap::new(),
            first_visible: 0,
        };

        for action in initial_actions {
            host.execute_action(action)?;
        }
        host.render()?;

        Ok(host)
    }

    /// Sender for events produced on other threads (typically input).
    #[must_use]
    pub fn mailbox(&self) -> Sender<Event> {
        self.mailbox.clone()
    }

    #[must_use]
    pub const fn controller(&self) -> &CatalogueViewController {
        &self.controller
    }

    /// Number of armed debounce timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    fn take_due_timer(&mut self, now: Instant) -> Option<TimerToken> {
        let token = self
            .timers
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .min_by_key(|(_, deadline)| **deadline)
            .map(|(token, _)| *token)?;
        self.timers.remove(&token);
        Some(token)
    }

    /// Handles at most one event, waiting up to `max_wait` for one to arrive.
    ///
    /// Returns true if something was handled.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Worker`] if the worker thread has gone away.
    pub fn pump(&mut self, max_wait: Duration) -> Result<bool> {
        let now = Instant::now();
        if let Some(token) = self.take_due_timer(now) {
            self.dispatch(&Event::TimerElapsed(token))?;
            return Ok(true);
        }

        let wait = self
            .timers
            .values()
            .min()
            .map_or(max_wait, |deadline| deadline.saturating_duration_since(now).min(max_wait));

        let responses = self.responses.clone();
        let inbox = self.inbox.clone();
        let incoming = crossbeam_channel::select! {
            recv(responses) -> msg => match msg {
                Ok(response) => Incoming::Worker(response),
                Err(_) => return Err(CatalogueError::Worker("worker disconnected".to_string())),
            },
            recv(inbox) -> msg => msg.map_or(Incoming::Idle, Incoming::Event),
            default(wait) => Incoming::Idle,
        };

        match incoming {
            Incoming::Worker(response) => self.dispatch(&Event::WorkerResponse(response))?,
            Incoming::Event(event) => self.dispatch(&event)?,
            Incoming::Idle => match self.take_due_timer(Instant::now()) {
                Some(token) => self.dispatch(&Event::TimerElapsed(token))?,
                None => return Ok(false),
            },
        }
        Ok(true)
    }

    /// Pumps until `done` holds or `timeout` elapses. Returns whether `done` held.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`pump`](Self::pump).
    pub fn pump_until<F>(&mut self, timeout: Duration, mut done: F) -> Result<bool>
    where
        F: FnMut(&CatalogueViewController) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if done(&self.controller) {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            self.pump(deadline - now)?;
        }
    }

    /// Routes one event through the handler and executes the resulting actions.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Worker`] if a fetch cannot be posted.
    pub fn dispatch(&mut self, event: &Event) -> Result<()> {
        if let Event::Scrolled(viewport) = event {
            self.first_visible = viewport.first_visible;
        }

        let (should_render, actions) = handle_event(&mut self.controller, event);
        tracing::debug!(
            action_count = actions.len(),
            should_render = should_render,
            "event handled"
        );

        for action in actions {
            self.execute_action(action)?;
        }
        if should_render || matches!(event, Event::Scrolled(_)) {
            self.render()?;
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn execute_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::PostToWorker(message) => {
                if let Some(worker) = &self.worker {
                    worker.post(message)?;
                }
            }
            Action::ScheduleTimer { token, delay } => {
                self.timers.insert(token, Instant::now() + delay);
            }
            Action::CancelTimer { token } => {
                self.timers.remove(&token);
            }
            Action::ScrollToTop => {
                self.first_visible = 0;
                self.collaborators.renderer.scroll_to_top();
            }
            Action::PresetSearch { query } => self.collaborators.search.preset_query(&query),
            Action::LoadThumbnail {
                position,
                slot,
                url,
                headers,
            } => self
                .collaborators
                .images
                .load_thumbnail(position, slot, &url, &headers),
            Action::OpenDetail {
                manga,
                from_network,
            } => self.collaborators.navigator.open_detail(&manga, from_network),
        }
        Ok(())
    }

    /// Draws a frame, then reports the resulting layout back to the controller, which may
    /// request the next page when the list is short.
    fn render(&mut self) -> Result<()> {
        for _ in 0..MAX_LAYOUT_PASSES {
            let rows = self.collaborators.renderer.rows();
            let vm = self.controller.compute_viewmodel(self.first_visible, rows);
            self.first_visible = vm.first_visible;
            self.collaborators.renderer.render(&vm);

            let layout = Viewport::new(vm.first_visible, vm.display_items.len(), vm.total_count);
            let (changed, actions) = handle_event(&mut self.controller, &Event::Scrolled(layout));
            for action in actions {
                self.execute_action(action)?;
            }
            if !changed {
                break;
            }
        }
        Ok(())
    }

    /// Stops the view, joins the worker and returns the state to persist.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Worker`] if the worker thread panicked.
    pub fn shutdown(mut self) -> Result<Option<SavedViewState>> {
        self.dispatch(&Event::Deactivated)?;
        self.timers.clear();
        if let Some(worker) = self.worker.take() {
            worker.shutdown()?;
        }
        Ok(self.controller.save_state())
    }
}
