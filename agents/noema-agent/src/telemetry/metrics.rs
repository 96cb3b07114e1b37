//! Prometheus metrics for the invocation boundary
//!
//! - `noema_agent_invocations_total` (counter) - invocations by task type and status
//! - `noema_agent_invocation_duration_seconds` (histogram) - execution step duration
//! - `noema_agent_errors_total` (counter) - execution errors by code
//! - `noema_agent_validation_rejections_total` (counter) - requests rejected before execution
//!
//! `InvocationMetrics` is itself an `EventEmitter`, so it sees exactly the
//! events the log sink sees.

use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

use super::{EventEmitter, Result};
use crate::contracts::{EventName, InvocationEvent};

const NAMESPACE: &str = "noema_agent";

/// Invocation metrics registered against a Prometheus registry
pub struct InvocationMetrics {
    registry: Arc<Registry>,

    /// Invocations by task_type and status
    invocations_total: CounterVec,

    /// Execution duration by task_type
    duration_seconds: HistogramVec,

    /// Execution errors by code
    errors_total: CounterVec,

    /// Requests rejected by validation
    validation_rejections_total: Counter,
}

impl InvocationMetrics {
    /// Create metrics on a fresh registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create metrics and register them with the provided registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let invocations_total = CounterVec::new(
            Opts::new("invocations_total", "Total number of accepted invocations")
                .namespace(NAMESPACE),
            &["task_type", "status"],
        )?;

        let duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "invocation_duration_seconds",
                "Execution step duration in seconds",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["task_type"],
        )?;

        let errors_total = CounterVec::new(
            Opts::new("errors_total", "Total number of execution errors").namespace(NAMESPACE),
            &["code"],
        )?;

        let validation_rejections_total = Counter::with_opts(
            Opts::new(
                "validation_rejections_total",
                "Requests rejected by schema validation",
            )
            .namespace(NAMESPACE),
        )?;

        registry.register(Box::new(invocations_total.clone()))?;
        registry.register(Box::new(duration_seconds.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(validation_rejections_total.clone()))?;

        Ok(Self {
            registry,
            invocations_total,
            duration_seconds,
            errors_total,
            validation_rejections_total,
        })
    }

    /// Count a request rejected before execution
    pub fn record_rejection(&self) {
        self.validation_rejections_total.inc();
    }

    pub fn invocation_count(&self, task_type: &str, status: &str) -> f64 {
        self.invocations_total
            .with_label_values(&[task_type, status])
            .get()
    }

    pub fn error_count(&self, code: &str) -> f64 {
        self.errors_total.with_label_values(&[code]).get()
    }

    pub fn rejection_count(&self) -> f64 {
        self.validation_rejections_total.get()
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl EventEmitter for InvocationMetrics {
    fn emit(&self, event: &InvocationEvent) {
        match event.event_name {
            EventName::InvocationStarted => {}
            EventName::InvocationCompleted => {
                let status = event.status.map(|s| s.as_str()).unwrap_or("unknown");
                self.invocations_total
                    .with_label_values(&[event.task_type.as_str(), status])
                    .inc();
                if let Some(ms) = event.execution_time_ms {
                    self.duration_seconds
                        .with_label_values(&[event.task_type.as_str()])
                        .observe(ms as f64 / 1000.0);
                }
            }
            EventName::ErrorRaised => {
                let code = event.error_code.map(|c| c.as_str()).unwrap_or("unknown");
                self.errors_total.with_label_values(&[code]).inc();
            }
        }
    }
}
