//! Worker thread implementation for page fetches.
//!
//! The worker owns the [`CatalogueSource`] and is the only place that calls it. Requests
//! arrive over a channel, are executed one at a time in arrival order, and every request
//! produces exactly one [`WorkerResponse`]. A source that panics is reported as a failed
//! page rather than taking the worker down.

use crate::domain::error::{CatalogueError, Result};
use crate::domain::{MangasPage, SourceId};
use crate::source::CatalogueSource;
use crate::worker::{WorkerMessage, WorkerResponse};
use crossbeam_channel::{Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

/// Worker state: the data source it fetches from.
pub struct CatalogueWorker {
    source: Box<dyn CatalogueSource>,
}

impl std::fmt::Debug for CatalogueWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogueWorker").finish_non_exhaustive()
    }
}

/// Handle to a running worker thread.
#[derive(Debug)]
pub struct WorkerHandle {
    requests: Sender<WorkerMessage>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Queues a message for the worker.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Worker`] if the worker thread has exited.
    pub fn post(&self, message: WorkerMessage) -> Result<()> {
        self.requests
            .send(message)
            .map_err(|_| CatalogueError::Worker("worker thread has exited".to_string()))
    }

    /// Closes the request channel and waits for in-flight work to finish.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Worker`] if the worker thread panicked.
    pub fn shutdown(self) -> Result<()> {
        drop(self.requests);
        self.thread
            .join()
            .map_err(|_| CatalogueError::Worker("worker thread panicked".to_string()))
    }
}

impl CatalogueWorker {
    #[must_use]
    pub fn new(source: Box<dyn CatalogueSource>) -> Self {
        Self { source }
    }

    /// Attaches the parent trace context from a message to the current thread.
    ///
    /// Spans created while the returned guard is held are children of the span that
    /// issued the request on the control thread.
    fn attach_parent_trace_context(message: &WorkerMessage) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_context = message.trace_context()?;

        let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
        let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );

        let otel_context = opentelemetry::Context::current().with_remote_span_context(span_context);

        Some(otel_context.attach())
    }

    fn fetch(&mut self, source_id: SourceId, query: &str, page_index: u32) -> Result<MangasPage> {
        let source = &mut self.source;
        panic::catch_unwind(AssertUnwindSafe(|| source.fetch_page(source_id, query, page_index)))
            .unwrap_or_else(|payload| {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(ToString::to_string)
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(CatalogueError::Fetch(format!("source panicked: {reason}")))
            })
    }

    /// Executes one message and returns its response.
    pub fn handle_message(&mut self, message: WorkerMessage) -> WorkerResponse {
        let _context_guard = Self::attach_parent_trace_context(&message);

        let span = tracing::debug_span!("worker_handle_message", message_type = ?message);
        let _guard = span.entered();

        match message {
            WorkerMessage::FetchPage {
                source_id,
                query,
                page_index,
                ..
            } => match self.fetch(source_id, &query, page_index) {
                Ok(mut page) => {
                    page.index = page_index;
                    tracing::debug!(
                        query = %query,
                        page_index,
                        item_count = page.items.len(),
                        "page fetched"
                    );
                    WorkerResponse::PageLoaded { query, page }
                }
                Err(e) => {
                    tracing::debug!(query = %query, page_index, error = %e, "page fetch failed");
                    WorkerResponse::PageFailed {
                        query,
                        page_index,
                        message: e.to_string(),
                    }
                }
            },
        }
    }

    /// Moves the worker onto its own thread.
    ///
    /// Responses are sent to `responses` in request order. The thread exits when the
    /// returned handle is shut down or dropped, or when `responses` is disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Io`] if the thread cannot be spawned.
    pub fn spawn(mut self, responses: Sender<WorkerResponse>) -> Result<WorkerHandle> {
        let (requests, inbox): (Sender<WorkerMessage>, Receiver<WorkerMessage>) =
            crossbeam_channel::unbounded();

        let thread = thread::Builder::new()
            .name("catalogue-worker".to_string())
            .spawn(move || {
                tracing::debug!("catalogue worker started");
                while let Ok(message) = inbox.recv() {
                    let response = self.handle_message(message);
                    if responses.send(response).is_err() {
                        tracing::debug!("response channel closed, worker exiting");
                        break;
                    }
                }
                tracing::debug!("catalogue worker stopped");
            })?;

        Ok(WorkerHandle { requests, thread })
    }
}
