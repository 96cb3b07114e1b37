//! Task handler implementations
//!
//! Deterministic handlers for the task types the boundary supports.

use noema_trace::InvocationContext;

use crate::contracts::{ErrorCode, Payload};
use crate::engine::TaskHandler;

/// Structured failure returned by a task handler.
///
/// The executor turns it into an `ErrorDetail` bound to the invocation's
/// trace id.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFailure {
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
}

impl TaskFailure {
    pub fn new(code: ErrorCode, message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            code,
            message: message.into(),
            recoverable,
        }
    }
}

/// Returns the payload unchanged
pub struct EchoHandler;

impl EchoHandler {
    pub const TASK_TYPE: &'static str = "echo";
}

impl TaskHandler for EchoHandler {
    fn task_type(&self) -> &str {
        Self::TASK_TYPE
    }

    fn handle(&self, _ctx: &InvocationContext, payload: &Payload) -> Result<Payload, TaskFailure> {
        Ok(payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_echo_returns_payload_unchanged() {
        let ctx = InvocationContext::new("s1", "r1", "echo");
        let payload = json!({"message": "hi", "nested": {"n": [1, 2, 3]}})
            .as_object()
            .cloned()
            .unwrap();

        let result = EchoHandler.handle(&ctx, &payload).unwrap();
        assert_eq!(result, payload);
    }

    #[test]
    fn test_task_failure_fields() {
        let failure = TaskFailure::new(ErrorCode::ExecutionFailed, "boom", true);
        assert_eq!(failure.code, ErrorCode::ExecutionFailed);
        assert!(failure.recoverable);
    }
}
