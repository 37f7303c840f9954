//! Telemetry initialization and configuration

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Boxed error returned by the init functions
pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Output format for console logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

fn env_filter() -> Result<EnvFilter, InitError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    Ok(filter)
}

/// Initialize basic telemetry with console logging
///
/// Only the first call installs a subscriber; later calls are no-ops.
///
/// # Arguments
/// * `service_name` - Name of the service for trace identification
///
/// # Example
/// ```
/// use labeval_telemetry::init_telemetry;
/// init_telemetry("labeval").expect("Failed to initialize telemetry");
/// ```
pub fn init_telemetry(service_name: &str) -> Result<(), InitError> {
    init_with_format(service_name, LogFormat::Text)
}

/// Initialize console logging with an explicit output format
pub fn init_with_format(service_name: &str, format: LogFormat) -> Result<(), InitError> {
    let mut result = Ok(());

    INIT.call_once(|| {
        result = env_filter().and_then(|filter| {
            let registry = tracing_subscriber::registry().with(filter);
            match format {
                LogFormat::Text => registry
                    .with(tracing_subscriber::fmt::layer().with_target(true).with_line_number(true))
                    .try_init()?,
                LogFormat::Json => registry
                    .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
                    .try_init()?,
            }
            Ok(())
        });

        if result.is_ok() {
            tracing::info!(service.name = service_name, "Telemetry initialized");
        }
    });

    result
}

/// Initialize telemetry with OpenTelemetry OTLP span export
///
/// Console logging stays enabled; spans are additionally exported to the collector.
///
/// # Arguments
/// * `service_name` - Name of the service for trace identification
/// * `endpoint` - OTLP collector endpoint (e.g., "http://localhost:4317")
///
/// # Example
/// ```no_run
/// use labeval_telemetry::init_with_otlp;
/// init_with_otlp("labeval", "http://localhost:4317")
///     .expect("Failed to initialize telemetry");
/// ```
pub fn init_with_otlp(service_name: &str, endpoint: &str) -> Result<(), InitError> {
    use opentelemetry_otlp::WithExportConfig;
    use tracing_opentelemetry::OpenTelemetryLayer;

    let mut result = Ok(());

    INIT.call_once(|| {
        result = (|| -> Result<(), InitError> {
            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(opentelemetry_otlp::new_exporter().tonic().with_endpoint(endpoint))
                .with_trace_config(opentelemetry_sdk::trace::config().with_resource(
                    opentelemetry_sdk::Resource::new(vec![opentelemetry::KeyValue::new(
                        "service.name",
                        service_name.to_string(),
                    )]),
                ))
                .install_batch(opentelemetry_sdk::runtime::Tokio)?;

            tracing_subscriber::registry()
                .with(env_filter()?)
                .with(tracing_subscriber::fmt::layer().with_target(true).with_line_number(true))
                .with(OpenTelemetryLayer::new(tracer))
                .try_init()?;
            Ok(())
        })();

        if result.is_ok() {
            tracing::info!(
                service.name = service_name,
                otlp.endpoint = endpoint,
                "Telemetry initialized with OpenTelemetry"
            );
        }
    });

    result
}

/// Shutdown telemetry and flush any pending spans
///
/// Should be called before exit so exported spans are not lost.
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_telemetry("labeval-test").unwrap();
        init_with_format("labeval-test", LogFormat::Json).unwrap();
    }
}
