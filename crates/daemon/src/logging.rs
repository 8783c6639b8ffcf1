//! Subscriber setup: env filter, pretty or JSON output, optional OTLP export

use crate::config::LogFormat;
use crate::telemetry;
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

const DEFAULT_FILTER: &str = "queue_manager=info";

/// Install the global subscriber.
///
/// The returned guard flushes buffered output on drop; hold it until exit.
pub fn init(format: LogFormat) -> Result<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let fmt_layer = match format {
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(writer).boxed(),
    };

    // EnvFilter gates every layer, wherever it sits in the stack
    tracing_subscriber::registry()
        .with(telemetry::layer::<Registry>()?)
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
