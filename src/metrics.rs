//! Prometheus metrics for the gateway
//!
//! Defines metrics for:
//! - Storage operation counts by operation and status
//! - Storage operation duration

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Registry for all metrics
    pub static ref REGISTRY: Registry = Registry::new();

    /// Storage operation counter by operation and status
    pub static ref STORAGE_OPERATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("kodo_gateway_storage_operations_total", "Total storage operations"),
        &["operation", "status"]
    )
    .expect("Failed to create STORAGE_OPERATIONS metric");

    /// Storage operation duration histogram by operation
    pub static ref STORAGE_OPERATION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "kodo_gateway_storage_operation_duration_seconds",
            "Storage operation duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["operation"]
    )
    .expect("Failed to create STORAGE_OPERATION_DURATION metric");
}

/// Initialize metrics and register with the global registry
pub fn init_metrics() {
    REGISTRY.register(Box::new(STORAGE_OPERATIONS.clone())).unwrap();
    REGISTRY
        .register(Box::new(STORAGE_OPERATION_DURATION.clone()))
        .unwrap();
}

/// Count one finished storage operation
pub fn record_operation(operation: &str, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    STORAGE_OPERATIONS.with_label_values(&[operation, status]).inc();
}
