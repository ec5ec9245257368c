//! Telemetry for the KindMind API
//!
//! - `metrics` - Prometheus counters and histograms per gateway action
//! - [`init_tracing`] - JSON log output filtered by `RUST_LOG`

pub mod metrics;

pub use metrics::{GatewayMetrics, GatewayMetricsRegistry, RequestTimer};

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("Failed to encode metrics: {0}")]
    EncodingFailed(String),

    #[error("Failed to initialise logging: {0}")]
    LoggingInit(String),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Install the global JSON subscriber on stderr; `default_filter` applies when `RUST_LOG` is unset
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
