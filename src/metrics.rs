//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Prometheus metrics for quota decisions
//!
//! Enabled with the `monitoring` feature and attached to a manager through
//! [`QuotaManagerBuilder::metrics`](crate::manager::QuotaManagerBuilder::metrics).
//!
//! # Example
//!
//! ```rust
//! use quotaron::metrics::QuotaMetrics;
//!
//! let metrics = QuotaMetrics::new().unwrap();
//! metrics.record_decision("check", "allowed", std::time::Duration::from_micros(40));
//! assert!(metrics.gather().contains("quota_decisions_total"));
//! ```

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;
use tracing::error;

/// Decision counters and latency histogram
#[derive(Clone)]
pub struct QuotaMetrics {
    /// Decisions by operation and outcome
    pub decisions_total: IntCounterVec,
    /// Counter lookups that found no registered counter
    pub counter_not_found_total: IntCounter,
    /// Errors reported by counters
    pub storage_errors_total: IntCounter,
    /// Decision latency
    pub decision_duration: Histogram,
    registry: Registry,
}

impl QuotaMetrics {
    /// Creates the metrics on a private registry
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Creates the metrics and registers them on `registry`
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let decisions_total = IntCounterVec::new(
            Opts::new("quota_decisions_total", "Total number of quota decisions"),
            &["operation", "outcome"],
        )?;
        let counter_not_found_total = IntCounter::with_opts(Opts::new(
            "quota_counter_not_found_total",
            "Total number of resources without a registered counter",
        ))?;
        let storage_errors_total = IntCounter::with_opts(Opts::new(
            "quota_storage_errors_total",
            "Total number of errors reported by resource counters",
        ))?;
        let decision_duration = Histogram::with_opts(
            HistogramOpts::new(
                "quota_decision_duration_seconds",
                "Duration of quota decisions in seconds",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;

        registry.register(Box::new(decisions_total.clone()))?;
        registry.register(Box::new(counter_not_found_total.clone()))?;
        registry.register(Box::new(storage_errors_total.clone()))?;
        registry.register(Box::new(decision_duration.clone()))?;

        Ok(Self {
            decisions_total,
            counter_not_found_total,
            storage_errors_total,
            decision_duration,
            registry,
        })
    }

    /// Records one decision
    pub fn record_decision(&self, operation: &str, outcome: &str, duration: Duration) {
        self.decisions_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.decision_duration.observe(duration.as_secs_f64());
    }

    pub fn record_counter_not_found(&self) {
        self.counter_not_found_total.inc();
    }

    pub fn record_storage_error(&self) {
        self.storage_errors_total.inc();
    }

    /// Decisions recorded for an operation and outcome
    pub fn decisions(&self, operation: &str, outcome: &str) -> u64 {
        self.decisions_total
            .with_label_values(&[operation, outcome])
            .get()
    }

    /// Gathers every metric in the Prometheus text format
    pub fn gather(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            error!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
