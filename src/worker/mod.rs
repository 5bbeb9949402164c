//! Background worker thread for catalogue fetches.
//!
//! Fetching a page may block for a long time, so it never happens on the control
//! thread. The worker receives typed requests over a channel and answers each with a
//! response tagged by the query it was issued for. Requests carry tracing context so
//! spans on both threads end up in one trace.
//!
//! # Architecture
//!
//! - `messages`: Request/response protocol types with trace context propagation
//! - `handler`: Worker implementation, panic isolation and thread spawning

pub mod handler;
pub mod messages;

pub use handler::{CatalogueWorker, WorkerHandle};
pub use messages::{TraceContext, WorkerMessage, WorkerResponse};
