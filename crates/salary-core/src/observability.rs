//! Observability infrastructure for the salary predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency and counts, artifact loading)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.5,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct ServiceMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounterVec,
    prediction_errors_total: IntCounterVec,
    artifact_load_attempts: IntCounter,
    artifact_load_failures: IntCounter,
    artifacts_loaded: IntGauge,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "salary_predictor_prediction_latency_seconds",
                "Time spent encoding features and running the selected regressor",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "salary_predictor_predictions_total",
                "Total number of predictions generated per model",
                &["model"]
            )
            .expect("Failed to register predictions_total"),

            prediction_errors_total: register_int_counter_vec!(
                "salary_predictor_prediction_errors_total",
                "Total number of failed prediction requests per error kind",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            artifact_load_attempts: register_int_counter!(
                "salary_predictor_artifact_load_attempts_total",
                "Total number of artifact load attempts"
            )
            .expect("Failed to register artifact_load_attempts"),

            artifact_load_failures: register_int_counter!(
                "salary_predictor_artifact_load_failures_total",
                "Total number of failed artifact load attempts"
            )
            .expect("Failed to register artifact_load_failures"),

            artifacts_loaded: register_int_gauge!(
                "salary_predictor_artifacts_loaded",
                "Whether the artifact set is loaded (1) or not (0)"
            )
            .expect("Failed to register artifacts_loaded"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self, model: &str) {
        self.inner().predictions_total.with_label_values(&[model]).inc();
    }

    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner().prediction_errors_total.with_label_values(&[kind]).inc();
    }

    /// Record the outcome of one artifact load attempt
    pub fn record_artifact_load(&self, success: bool) {
        self.inner().artifact_load_attempts.inc();
        if success {
            self.inner().artifacts_loaded.set(1);
        } else {
            self.inner().artifact_load_failures.inc();
            self.inner().artifacts_loaded.set(0);
        }
    }

    pub fn predictions_count(&self, model: &str) -> u64 {
        self.inner().predictions_total.with_label_values(&[model]).get()
    }

    pub fn prediction_errors_count(&self, kind: &str) -> u64 {
        self.inner().prediction_errors_total.with_label_values(&[kind]).get()
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for predictions,
/// artifact loading, and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Log a prediction generation event
    pub fn log_prediction(&self, model: &str, predicted_salary: f64, latency_us: u128) {
        info!(
            event = "prediction_generated",
            service = %self.service,
            model = %model,
            predicted_salary = predicted_salary,
            latency_us = latency_us as u64,
            "Generated salary prediction"
        );
    }

    /// Log a failed prediction request
    pub fn log_prediction_failed(&self, model: &str, kind: &str, error: &str) {
        warn!(
            event = "prediction_failed",
            service = %self.service,
            model = %model,
            kind = %kind,
            error = %error,
            "Salary prediction failed"
        );
    }

    pub fn log_artifacts_loaded(&self, source: &str, attempts: u64) {
        info!(
            event = "artifacts_loaded",
            service = %self.service,
            source = %source,
            attempts = attempts,
            "Prediction artifacts loaded"
        );
    }

    pub fn log_artifact_load_failed(&self, source: &str, artifact: Option<&str>, error: &str) {
        warn!(
            event = "artifact_load_failed",
            service = %self.service,
            source = %source,
            artifact = ?artifact,
            error = %error,
            "Failed to load prediction artifacts, predictions unavailable"
        );
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, artifact_source: &str) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            artifact_source = %artifact_source,
            "Salary predictor started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Salary predictor shutting down"
        );
    }
}
