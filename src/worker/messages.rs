//! Worker message types for cross-thread communication.
//!
//! This module defines the request and response protocol between the control thread and
//! the background thread that talks to the data source. Every response is tagged with
//! the query its request was issued for so the controller can recognise stale results.
//! Requests also carry tracing context so worker spans join the controller's trace.

use crate::app::pagination::PageRequest;
use crate::domain::{MangasPage, SourceId};
use serde::{Deserialize, Serialize};

/// Distributed tracing context for cross-thread span propagation.
///
/// Captures the current trace and span IDs from OpenTelemetry so the worker can link
/// its fetch span to the span that issued the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking spans across threads.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Creates a trace context from the current tracing span.
    ///
    /// Returns `None` if no OpenTelemetry layer is installed or the span context is not
    /// valid.
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let otel_context = tracing::Span::current().context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }
}

/// Messages sent from the control thread to the worker thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerMessage {
    /// Fetch one page of a source listing.
    FetchPage {
        /// Source to query.
        source_id: SourceId,

        /// Filter string; empty lists the whole catalogue.
        query: String,

        /// Zero-based page index.
        page_index: u32,

        /// Trace context for linking spans across threads.
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
}

impl WorkerMessage {
    /// Builds a fetch message for `request` with the current trace context attached.
    #[must_use]
    pub fn fetch_page(request: PageRequest) -> Self {
        Self::FetchPage {
            source_id: request.source_id,
            query: request.query,
            page_index: request.page_index,
            trace_context: TraceContext::from_current(),
        }
    }

    #[must_use]
    pub const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::FetchPage { trace_context, .. } => trace_context.as_ref(),
        }
    }
}

/// Responses sent from the worker thread back to the control thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerResponse {
    /// The source produced a page.
    PageLoaded {
        /// Query the request was issued for.
        query: String,

        /// The delivered page; `page.index` is the requested index.
        page: MangasPage,
    },

    /// The source failed to produce a page.
    PageFailed {
        /// Query the request was issued for.
        query: String,

        /// Requested page index.
        page_index: u32,

        /// Human-readable failure description.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_message_without_subscriber_has_no_trace_context() {
        let message = WorkerMessage::fetch_page(PageRequest {
            source_id: SourceId(3),
            query: "dorohedoro".to_string(),
            page_index: 2,
        });

        assert_eq!(message.trace_context(), None);
        let json = serde_json::to_string(&message).unwrap_or_default();
        assert!(!json.contains("trace_context"));
        assert!(json.contains("dorohedoro"));
    }
}
