//! Tracing initialization and subscriber setup.

use super::exporter;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use std::path::Path;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Service and scope name reported with every span.
pub const SERVICE_NAME: &str = "catalogue-browser";

/// Trace file name inside the data directory.
pub const TRACE_FILE: &str = "catalogue-otlp.json";

/// Resolves the filter directive: `RUST_LOG`, then `trace_level`, then `info`.
fn filter_for(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.trace_level.as_deref().unwrap_or("info");
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Installs the global subscriber exporting spans to `<data_dir>/catalogue-otlp.json`.
///
/// Observability is optional: if the data directory cannot be created, nothing is
/// installed. Only the first call in a process takes effect.
///
/// ```rust
/// use catalogue_browser::observability::init_tracing;
/// use catalogue_browser::Config;
///
/// let dir = tempfile::tempdir()?;
/// init_tracing(&Config::default(), dir.path());
/// tracing::debug!("tracing is now active");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn init_tracing(config: &Config, data_dir: &Path) {
    if std::fs::create_dir_all(data_dir).is_err() {
        return;
    }

    let resource = Resource::new(vec![opentelemetry::KeyValue::new("service.name", SERVICE_NAME)]);
    let provider = exporter::create_tracer_provider(data_dir.join(TRACE_FILE), resource, SERVICE_NAME);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    let _ = tracing_subscriber::registry()
        .with(filter_for(config))
        .with(otel_layer)
        .try_init();
}
