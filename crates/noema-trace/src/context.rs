//! Invocation context passed from the executor to task handlers and events.

use serde::{Deserialize, Serialize};

use crate::trace::{new_trace_id, TraceId};

/// Identifiers for one accepted invocation.
///
/// `trace_id` is generated when the context is built; `request_id` and
/// `session_id` are the caller's opaque correlation keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationContext {
    pub trace_id: TraceId,
    pub request_id: String,
    pub session_id: String,
    pub task_type: String,
}

impl InvocationContext {
    /// Build the context for a newly accepted invocation, minting its trace id.
    pub fn new(
        session_id: impl Into<String>,
        request_id: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            trace_id: new_trace_id(),
            request_id: request_id.into(),
            session_id: session_id.into(),
            task_type: task_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_carries_caller_ids() {
        let ctx = InvocationContext::new("s1", "r1", "echo");
        assert_eq!(ctx.session_id, "s1");
        assert_eq!(ctx.request_id, "r1");
        assert_eq!(ctx.task_type, "echo");
    }

    #[test]
    fn test_each_context_gets_its_own_trace_id() {
        let a = InvocationContext::new("s1", "r1", "echo");
        let b = InvocationContext::new("s1", "r1", "echo");
        assert_ne!(a.trace_id, b.trace_id);
    }
}
