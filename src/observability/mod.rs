//! OpenTelemetry-based observability with file-based trace export.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → OpenTelemetry SDK → FileSpanExporter → JSON lines
//! ```
//!
//! Traces land in `<data_dir>/catalogue-otlp.json`, rotated at 10 MB with three backups.
//!
//! The filter is taken from:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` configuration option
//! 3. Default: `"info"`
//!
//! # Modules
//!
//! - [`init`]: Subscriber setup
//! - [`exporter`]: OTLP JSON span exporter and rotating file

pub mod exporter;
mod init;

pub use init::{init_tracing, SERVICE_NAME, TRACE_FILE};
