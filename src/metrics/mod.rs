//! Metrics collection for observability

use prometheus::{
    register_counter_vec_with_registry, register_counter_with_registry,
    register_histogram_vec_with_registry, Counter, CounterVec, HistogramVec, Opts, Registry,
};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Lookup metrics
    pub lookup_requests: CounterVec,
    pub lookup_duration: HistogramVec,
    pub provider_errors: Counter,

    // Automation handoff metrics
    pub automation_requests: CounterVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let lookup_requests = register_counter_vec_with_registry!(
            Opts::new("relay_lookup_requests_total", "Total image lookup requests"),
            &["endpoint", "status"],
            registry
        )?;

        let lookup_duration = register_histogram_vec_with_registry!(
            "relay_lookup_duration_seconds",
            "Image lookup duration in seconds",
            &["endpoint"],
            registry
        )?;

        let provider_errors = register_counter_with_registry!(
            Opts::new("relay_provider_errors_total", "Total failed provider calls"),
            registry
        )?;

        let automation_requests = register_counter_vec_with_registry!(
            Opts::new("relay_automation_requests_total", "Total automation handoff requests"),
            &["status"],
            registry
        )?;

        Ok(Self {
            registry,
            lookup_requests,
            lookup_duration,
            provider_errors,
            automation_requests,
        })
    }

    /// Record a finished lookup
    pub fn record_lookup(&self, endpoint: &str, status: &str, elapsed_secs: f64) {
        self.lookup_requests.with_label_values(&[endpoint, status]).inc();
        self.lookup_duration
            .with_label_values(&[endpoint])
            .observe(elapsed_secs);
    }

    /// Record a failed provider call
    pub fn record_provider_error(&self) {
        self.provider_errors.inc();
    }

    /// Record an automation handoff
    pub fn record_automation(&self, success: bool) {
        let status = if success { "success" } else { "error" };
        self.automation_requests.with_label_values(&[status]).inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
