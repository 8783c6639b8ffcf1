//! Telemetry setup for OpenTelemetry integration

use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

pub type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// OpenTelemetry layer, if enabled
///
/// # Environment Variables
///
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., http://localhost:4317)
/// - `OTEL_SERVICE_NAME`: Service name (default: queue-manager)
///
/// # Example
///
/// ```text
/// OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 \
/// OTEL_SERVICE_NAME=queue-manager-dev \
///     ./queue-manager
/// ```
pub fn layer<S>() -> Result<Option<BoxedLayer<S>>>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    // Runs before the subscriber exists, so nothing here can log
    if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_err() {
        return Ok(None);
    }

    #[cfg(feature = "telemetry")]
    let layer = Some(otel_layer()?);

    #[cfg(not(feature = "telemetry"))]
    let layer = {
        eprintln!("OpenTelemetry endpoint set but feature 'telemetry' not enabled");
        eprintln!("Rebuild with: cargo build --features telemetry");
        None
    };

    Ok(layer)
}

#[cfg(feature = "telemetry")]
fn otel_layer<S>() -> Result<BoxedLayer<S>>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;

    let service_name =
        std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "queue-manager".to_string());
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .build();
    let tracer = provider.tracer(service_name);
    opentelemetry::global::set_tracer_provider(provider);

    Ok(Box::new(tracing_opentelemetry::layer().with_tracer(tracer)))
}

/// Flush spans still buffered in the batch exporter
pub fn shutdown() {
    #[cfg(feature = "telemetry")]
    opentelemetry::global::shutdown_tracer_provider();
}
