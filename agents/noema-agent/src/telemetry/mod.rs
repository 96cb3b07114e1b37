//! Telemetry module for the invocation boundary
//!
//! This module provides:
//! - The `EventEmitter` collaborator that receives lifecycle events
//! - `TracingEmitter`, which writes one structured record per event through `tracing`
//! - Prometheus metrics fed from the same event stream
//! - Subscriber setup for JSON or human-readable logs (`logging`)
//!
//! The emitter is injected into the executor as a handle; the executor never
//! touches process-wide logging state directly.

pub mod logging;
pub mod metrics;

pub use metrics::InvocationMetrics;

use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::contracts::{EventName, InvocationEvent};

/// Log target used for lifecycle event records
pub const EVENT_TARGET: &str = "noema_agent::events";

/// Telemetry errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("Metrics output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Receives structured lifecycle events.
///
/// Emission must not fail the invocation, so implementations swallow and
/// log their own errors.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: &InvocationEvent);
}

/// Writes each event as one `tracing` record whose fields mirror the event.
///
/// `error_raised` is logged at ERROR, everything else at INFO. Unset optional
/// fields are omitted. The event's own timestamp is recorded as
/// `event_timestamp` so it does not collide with the formatter's.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEmitter;

macro_rules! lifecycle_record {
    ($level:expr, $event:ident) => {
        tracing::event!(
            target: EVENT_TARGET,
            $level,
            event_name = $event.event_name.as_str(),
            event_timestamp = $event.timestamp.as_str(),
            trace_id = %$event.trace_id,
            request_id = $event.request_id.as_str(),
            session_id = $event.session_id.as_str(),
            task_type = $event.task_type.as_str(),
            inputs_hash = $event.inputs_hash.as_deref(),
            status = $event.status.as_ref().map(|s| s.as_str()),
            execution_time_ms = $event.execution_time_ms,
            error_code = $event.error_code.as_ref().map(|c| c.as_str()),
            error_message = $event.error_message.as_deref(),
            recoverable = $event.recoverable,
            "{}",
            $event.event_name
        )
    };
}

impl EventEmitter for TracingEmitter {
    fn emit(&self, event: &InvocationEvent) {
        if event.is_error() {
            lifecycle_record!(tracing::Level::ERROR, event);
        } else {
            lifecycle_record!(tracing::Level::INFO, event);
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEmitter;

impl EventEmitter for NoopEmitter {
    fn emit(&self, _event: &InvocationEvent) {}
}

/// Records events in memory, in emission order
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    events: Mutex<Vec<InvocationEvent>>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<InvocationEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn event_names(&self) -> Vec<EventName> {
        self.events().iter().map(|e| e.event_name).collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl EventEmitter for MemoryEmitter {
    fn emit(&self, event: &InvocationEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

/// Forwards each event to several emitters, in order
#[derive(Default, Clone)]
pub struct FanoutEmitter {
    targets: Vec<Arc<dyn EventEmitter>>,
}

impl FanoutEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.targets.push(emitter);
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl EventEmitter for FanoutEmitter {
    fn emit(&self, event: &InvocationEvent) {
        for target in &self.targets {
            target.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{ExecutionStatus, InvocationRequest};
    use crate::engine::InvocationExecutor;
    use noema_trace::InvocationContext;
    use serde_json::json;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn test_memory_emitter_records_in_order() {
        let ctx = InvocationContext::new("s1", "r1", "echo");
        let emitter = MemoryEmitter::new();
        emitter.emit(&InvocationEvent::started(&ctx, "hash"));
        emitter.emit(&InvocationEvent::completed(&ctx, ExecutionStatus::Success, 1));

        assert_eq!(
            emitter.event_names(),
            vec![EventName::InvocationStarted, EventName::InvocationCompleted]
        );

        emitter.clear();
        assert!(emitter.events().is_empty());
    }

    #[test]
    fn test_fanout_reaches_every_target() {
        let ctx = InvocationContext::new("s1", "r1", "echo");
        let first = Arc::new(MemoryEmitter::new());
        let second = Arc::new(MemoryEmitter::new());
        let fanout = FanoutEmitter::new()
            .with(first.clone())
            .with(second.clone())
            .with(Arc::new(NoopEmitter));

        fanout.emit(&InvocationEvent::started(&ctx, "hash"));

        assert_eq!(fanout.len(), 3);
        assert_eq!(first.events().len(), 1);
        assert_eq!(second.events().len(), 1);
    }

    /// Shared buffer the subscriber writes into
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn records(&self) -> Vec<serde_json::Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    fn capture<F: FnOnce()>(f: F) -> Vec<serde_json::Value> {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber =
            logging::json_subscriber(EnvFilter::new("noema_agent=info"), move || writer.clone());
        tracing::subscriber::with_default(subscriber, f);
        log.records()
    }

    #[test]
    fn test_tracing_emitter_writes_flat_records() {
        let executor = InvocationExecutor::with_emitter(Arc::new(TracingEmitter));
        let request = InvocationRequest::new("s1", "r1", "translate");

        let mut response = None;
        let records = capture(|| response = Some(executor.execute(&request)));
        let response = response.unwrap();

        let records: Vec<_> = records
            .into_iter()
            .filter(|r| r["target"] == EVENT_TARGET)
            .collect();
        assert_eq!(records.len(), 3);

        let names: Vec<_> = records.iter().map(|r| r["event_name"].clone()).collect();
        assert_eq!(names, vec!["invocation_started", "error_raised", "invocation_completed"]);

        let levels: Vec<_> = records.iter().map(|r| r["level"].clone()).collect();
        assert_eq!(levels, vec!["INFO", "ERROR", "INFO"]);

        for record in &records {
            assert_eq!(record["trace_id"], response.trace_id.as_str());
            assert_eq!(record["request_id"], "r1");
            assert_eq!(record["session_id"], "s1");
            assert_eq!(record["task_type"], "translate");
            assert!(record["event_timestamp"].is_string());
        }

        assert!(records[0]["inputs_hash"].is_string());
        assert!(records[0].get("error_code").is_none());

        assert_eq!(records[1]["error_code"], "E-EXEC-001");
        assert_eq!(records[1]["recoverable"], false);
        assert_eq!(records[1]["error_message"], "Unsupported task type: translate");

        assert_eq!(records[2]["status"], "error");
        assert!(records[2]["execution_time_ms"].is_u64());
    }

    #[test]
    fn test_tracing_emitter_success_levels() {
        let executor = InvocationExecutor::with_emitter(Arc::new(TracingEmitter));
        let request = InvocationRequest::new("s1", "r1", "echo");

        let records = capture(|| {
            executor.execute(&request);
        });

        let levels: Vec<_> = records
            .iter()
            .filter(|r| r["target"] == EVENT_TARGET)
            .map(|r| (r["event_name"].clone(), r["level"].clone()))
            .collect();
        assert_eq!(
            levels,
            vec![
                (json!("invocation_started"), json!("INFO")),
                (json!("invocation_completed"), json!("INFO")),
            ]
        );
    }
}
