//! Lifecycle events emitted for every accepted invocation.
//!
//! Each event is a flat record: the correlation fields shared by all events
//! plus the fields specific to its kind. Sequence per invocation:
//! `invocation_started`, then `error_raised` (error outcome only), then
//! `invocation_completed`.

use noema_trace::{now_iso8601, InvocationContext, TraceId};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ErrorCode, ErrorDetail, ExecutionStatus};

/// Kind of lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    InvocationStarted,
    InvocationCompleted,
    ErrorRaised,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::InvocationStarted => "invocation_started",
            EventName::InvocationCompleted => "invocation_completed",
            EventName::ErrorRaised => "error_raised",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured lifecycle record handed to an `EventEmitter`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationEvent {
    pub event_name: EventName,
    pub timestamp: String,
    pub trace_id: TraceId,
    pub request_id: String,
    pub session_id: String,
    pub task_type: String,

    /// SHA-256 of task type and payload (started)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs_hash: Option<String>,

    /// Final status (completed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,

    /// Execution step duration (completed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recoverable: Option<bool>,
}

impl InvocationEvent {
    fn base(name: EventName, ctx: &InvocationContext) -> Self {
        Self {
            event_name: name,
            timestamp: now_iso8601(),
            trace_id: ctx.trace_id.clone(),
            request_id: ctx.request_id.clone(),
            session_id: ctx.session_id.clone(),
            task_type: ctx.task_type.clone(),
            inputs_hash: None,
            status: None,
            execution_time_ms: None,
            error_code: None,
            error_message: None,
            recoverable: None,
        }
    }

    /// Invocation accepted, about to dispatch
    pub fn started(ctx: &InvocationContext, inputs_hash: impl Into<String>) -> Self {
        let mut event = Self::base(EventName::InvocationStarted, ctx);
        event.inputs_hash = Some(inputs_hash.into());
        event
    }

    /// Invocation finished with the given status
    pub fn completed(
        ctx: &InvocationContext,
        status: ExecutionStatus,
        execution_time_ms: u64,
    ) -> Self {
        let mut event = Self::base(EventName::InvocationCompleted, ctx);
        event.status = Some(status);
        event.execution_time_ms = Some(execution_time_ms);
        event
    }

    /// Execution produced a structured error
    pub fn error_raised(ctx: &InvocationContext, error: &ErrorDetail) -> Self {
        let mut event = Self::base(EventName::ErrorRaised, ctx);
        event.error_code = Some(error.code);
        event.error_message = Some(error.message.clone());
        event.recoverable = Some(error.recoverable);
        event
    }

    /// Whether this event should be logged at elevated severity
    pub fn is_error(&self) -> bool {
        self.event_name == EventName::ErrorRaised
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_started_event_is_flat() {
        let ctx = InvocationContext::new("s1", "r1", "echo");
        let event = InvocationEvent::started(&ctx, "abc123");
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["event_name"], "invocation_started");
        assert_eq!(value["trace_id"], ctx.trace_id.as_str());
        assert_eq!(value["request_id"], "r1");
        assert_eq!(value["session_id"], "s1");
        assert_eq!(value["task_type"], "echo");
        assert_eq!(value["inputs_hash"], "abc123");
        assert!(value.get("status").is_none());
        assert!(value.get("error_code").is_none());
    }

    #[test]
    fn test_completed_event_fields() {
        let ctx = InvocationContext::new("s1", "r1", "echo");
        let event = InvocationEvent::completed(&ctx, ExecutionStatus::Success, 7);
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["execution_time_ms"], 7);
        assert!(!event.is_error());
    }

    #[test]
    fn test_error_event_fields() {
        let ctx = InvocationContext::new("s1", "r1", "translate");
        let error = ErrorDetail::unsupported_task(&ctx);
        let event = InvocationEvent::error_raised(&ctx, &error);
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["event_name"], "error_raised");
        assert_eq!(value["error_code"], "E-EXEC-001");
        assert_eq!(value["error_message"], "Unsupported task type: translate");
        assert_eq!(value["recoverable"], false);
        assert!(event.is_error());
    }
}
