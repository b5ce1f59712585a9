//! Subscriber setup.

use super::exporter;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

/// Installs the global tracing subscriber.
///
/// - `RUST_LOG` wins over `config.trace_level`, which defaults to `"info"`
/// - events go to stderr through a `fmt` layer
/// - when `config.trace_file` is set, spans are also exported as OTLP JSON
///   lines to that file (its parent directory is created if needed)
///
/// Never fails: a trace file that cannot be prepared only disables the
/// export, and a second call leaves the first subscriber in place.
///
/// # Example
///
/// ```rust
/// use refdesk::observability::init_tracing;
/// use refdesk::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(config)));

    let mut export_error = None;
    let provider = config.trace_file.as_ref().and_then(|path| {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                export_error = Some(format!("{}: {e}", parent.display()));
                return None;
            }
        }
        let resource = Resource::new(vec![
            KeyValue::new("service.name", "refdesk"),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]);
        Some(exporter::file_tracer_provider(path.clone(), resource))
    });
    let otel_layer = provider
        .as_ref()
        .map(|provider| OpenTelemetryLayer::new(provider.tracer("refdesk")));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(otel_layer)
        .try_init()
        .is_ok();

    if !installed {
        return;
    }
    if let Some(provider) = provider {
        // The global slot keeps the provider alive for the whole process.
        let _ = opentelemetry::global::set_tracer_provider(provider);
    }
    if let Some(error) = export_error {
        tracing::warn!(error = %error, "span export disabled, trace directory unavailable");
    }
}

fn level_directive(config: &Config) -> String {
    config
        .trace_level
        .clone()
        .filter(|level| !level.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}
