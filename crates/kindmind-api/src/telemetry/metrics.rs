//! Prometheus metrics for gateway actions
//!
//! - `kindmind_gateway_requests_total` (counter) - requests by action, mode and outcome
//! - `kindmind_gateway_request_duration_seconds` (histogram) - latency by action and mode
//! - `kindmind_gateway_errors_total` (counter) - failures by action and error code
//! - `kindmind_gateway_in_flight_requests` (gauge) - actions currently executing
//!
//! # Example
//!
//! ```rust,no_run
//! use kindmind_api::telemetry::GatewayMetricsRegistry;
//!
//! let registry = GatewayMetricsRegistry::new().unwrap();
//! let metrics = registry.gateway();
//!
//! {
//!     let _timer = metrics.start_timer("mood", "mock");
//!     metrics.record_request("mood", "mock", "success");
//! }
//!
//! println!("{}", registry.encode_text().unwrap());
//! ```

use prometheus::{CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry};
use std::sync::Arc;
use std::time::Instant;

use super::{Result, TelemetryError};

const NAMESPACE: &str = "kindmind_gateway";

/// Gateway action metrics
pub struct GatewayMetrics {
    requests_total: CounterVec,
    duration_seconds: HistogramVec,
    errors_total: CounterVec,
    in_flight: Gauge,
}

impl GatewayMetrics {
    /// Create the metrics and register them with `registry`
    pub fn new(registry: Arc<Registry>) -> Result<Self> {
        let requests_total = CounterVec::new(
            Opts::new("requests_total", "Total number of gateway action requests").namespace(NAMESPACE),
            &["action", "mode", "outcome"],
        )?;

        // provider calls for speech and video run for seconds, not milliseconds
        let duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "request_duration_seconds",
                "Gateway action duration in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.005, 0.025, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
            &["action", "mode"],
        )?;

        let errors_total = CounterVec::new(
            Opts::new("errors_total", "Total number of failed gateway actions").namespace(NAMESPACE),
            &["action", "code"],
        )?;

        let in_flight = Gauge::with_opts(
            Opts::new("in_flight_requests", "Gateway actions currently in progress").namespace(NAMESPACE),
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(in_flight.clone()))?;

        Ok(Self {
            requests_total,
            duration_seconds,
            errors_total,
            in_flight,
        })
    }

    pub fn record_request(&self, action: &str, mode: &str, outcome: &str) {
        self.requests_total
            .with_label_values(&[action, mode, outcome])
            .inc();
    }

    pub fn observe_duration(&self, action: &str, mode: &str, duration_secs: f64) {
        self.duration_seconds
            .with_label_values(&[action, mode])
            .observe(duration_secs);
    }

    pub fn record_error(&self, action: &str, code: &str) {
        self.errors_total.with_label_values(&[action, code]).inc();
    }

    /// Number of actions currently in progress
    pub fn in_flight(&self) -> f64 {
        self.in_flight.get()
    }

    /// Start timing an action (returns a guard that records duration on drop)
    pub fn start_timer(&self, action: &str, mode: &str) -> RequestTimer<'_> {
        self.in_flight.inc();
        RequestTimer {
            start: Instant::now(),
            action: action.to_string(),
            mode: mode.to_string(),
            metrics: self,
        }
    }
}

/// RAII guard for timing an action
pub struct RequestTimer<'a> {
    start: Instant,
    action: String,
    mode: String,
    metrics: &'a GatewayMetrics,
}

impl<'a> RequestTimer<'a> {
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl<'a> Drop for RequestTimer<'a> {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.metrics
            .observe_duration(&self.action, &self.mode, duration);
        self.metrics.in_flight.dec();
    }
}

/// Registry owning the gateway metrics
pub struct GatewayMetricsRegistry {
    registry: Arc<Registry>,
    gateway: GatewayMetrics,
}

impl GatewayMetricsRegistry {
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create with an existing Prometheus registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let gateway = GatewayMetrics::new(Arc::clone(&registry))?;
        Ok(Self { registry, gateway })
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    pub fn gateway(&self) -> &GatewayMetrics {
        &self.gateway
    }

    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Encode metrics as text for scraping
    pub fn encode_text(&self) -> Result<String> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.gather(), &mut buffer)
            .map_err(|e| TelemetryError::EncodingFailed(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::EncodingFailed(e.to_string()))
    }
}
