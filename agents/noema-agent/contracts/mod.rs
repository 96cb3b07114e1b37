//! Invocation Boundary Contract Definitions
//!
//! This module defines the wire contracts accepted and produced by the
//! noema invocation boundary.
//!
//! # Architecture
//!
//! - Callers send an `InvocationRequest` (closed schema)
//! - The executor answers with an `InvocationResponse`
//! - Execution failures are carried as an `ErrorDetail` inside the response
//! - Optional `EvidenceAttachment`s are lifted out of the payload
//! - Lifecycle `InvocationEvent`s are handed to the event emitter
//!
//! # Design Principles
//!
//! - **Closed schemas**: unknown fields are rejected on every contract type
//! - **Server-owned correlation**: `trace_id` only ever comes from the server
//! - **Immutable values**: contract values are built once per invocation

pub mod events;
pub mod evidence;

use noema_trace::{now_iso8601, InvocationContext, TraceId};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use events::{EventName, InvocationEvent};
pub use evidence::{parse_evidence, EvidenceAttachment, EvidenceError};

/// Task-specific key/value payload.
pub type Payload = serde_json::Map<String, serde_json::Value>;

fn null_as_empty<'de, D>(deserializer: D) -> Result<Payload, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Payload>::deserialize(deserializer)?.unwrap_or_default())
}

/// Request accepted at the invocation boundary.
///
/// Field-level validation with detailed violations lives in
/// [`crate::validation`]; the derive below enforces the same closed set when
/// the type is deserialized directly and, like the validator, reads a `null`
/// payload as empty. Rejecting empty id strings is left to the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvocationRequest {
    /// Opaque session correlation key
    pub session_id: String,

    /// Caller-supplied identifier, unique per call
    pub request_id: String,

    /// Selects the task handler
    pub task_type: String,

    /// Task-specific data
    #[serde(default, deserialize_with = "null_as_empty")]
    pub payload: Payload,

    /// Caller's ISO-8601 hint; never used for correlation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Requested privacy handling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_level: Option<PrivacyLevel>,
}

impl InvocationRequest {
    /// Create a request with an empty payload
    pub fn new(
        session_id: impl Into<String>,
        request_id: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            request_id: request_id.into(),
            task_type: task_type.into(),
            payload: Payload::new(),
            timestamp: None,
            privacy_level: None,
        }
    }

    /// Set the payload
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

}

/// Privacy handling requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    Local,
    Hybrid,
    Cloud,
}

impl PrivacyLevel {
    pub const ALL: [PrivacyLevel; 3] =
        [PrivacyLevel::Local, PrivacyLevel::Hybrid, PrivacyLevel::Cloud];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyLevel::Local => "local",
            PrivacyLevel::Hybrid => "hybrid",
            PrivacyLevel::Cloud => "cloud",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == value)
    }
}

/// Outcome of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Error => "error",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed error codes carried by `ErrorDetail`.
///
/// Only `UnsupportedTask` is raised today. The remaining codes are reserved;
/// their triggering conditions are not defined yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "E-EXEC-001")]
    UnsupportedTask,
    #[serde(rename = "E-VAL-001")]
    ValidationError,
    #[serde(rename = "E-EXEC-002")]
    ExecutionFailed,
    #[serde(rename = "E-PRIV-001")]
    PrivacyViolation,
    #[serde(rename = "E-SIZE-001")]
    PayloadTooLarge,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnsupportedTask => "E-EXEC-001",
            ErrorCode::ValidationError => "E-VAL-001",
            ErrorCode::ExecutionFailed => "E-EXEC-002",
            ErrorCode::PrivacyViolation => "E-PRIV-001",
            ErrorCode::PayloadTooLarge => "E-SIZE-001",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error shared by the response and lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorDetail {
    /// Fixed error code
    pub code: ErrorCode,

    /// Human-readable message
    pub message: String,

    /// Whether a retry might succeed
    pub recoverable: bool,

    /// Trace id of the invocation that failed
    pub trace_id: TraceId,

    /// When the error occurred (ISO-8601)
    pub timestamp: String,
}

impl ErrorDetail {
    /// Create an error bound to the given invocation
    pub fn new(
        ctx: &InvocationContext,
        code: ErrorCode,
        message: impl Into<String>,
        recoverable: bool,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            recoverable,
            trace_id: ctx.trace_id.clone(),
            timestamp: now_iso8601(),
        }
    }

    /// Error for a task type with no registered handler
    pub fn unsupported_task(ctx: &InvocationContext) -> Self {
        Self::new(
            ctx,
            ErrorCode::UnsupportedTask,
            format!("Unsupported task type: {}", ctx.task_type),
            false,
        )
    }
}

/// Response returned for every accepted invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvocationResponse {
    pub session_id: String,
    pub request_id: String,
    pub trace_id: TraceId,
    pub status: ExecutionStatus,

    /// Task output on success, empty on error
    pub result: Payload,

    /// Present only when `status` is `error`
    pub error: Option<ErrorDetail>,

    /// Server response time (ISO-8601)
    pub timestamp: String,

    /// Duration of the execution step only
    pub execution_time_ms: u64,

    /// Evidence lifted from the payload; never absent
    #[serde(default)]
    pub evidence: Vec<EvidenceAttachment>,
}

impl InvocationResponse {
    /// Create a successful response
    pub fn success(
        ctx: &InvocationContext,
        result: Payload,
        evidence: Vec<EvidenceAttachment>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            session_id: ctx.session_id.clone(),
            request_id: ctx.request_id.clone(),
            trace_id: ctx.trace_id.clone(),
            status: ExecutionStatus::Success,
            result,
            error: None,
            timestamp: now_iso8601(),
            execution_time_ms,
            evidence,
        }
    }

    /// Create an error response.
    ///
    /// The error's trace id is overwritten with the context's, so the two
    /// can never diverge.
    pub fn failure(
        ctx: &InvocationContext,
        mut error: ErrorDetail,
        execution_time_ms: u64,
    ) -> Self {
        error.trace_id = ctx.trace_id.clone();
        Self {
            session_id: ctx.session_id.clone(),
            request_id: ctx.request_id.clone(),
            trace_id: ctx.trace_id.clone(),
            status: ExecutionStatus::Error,
            result: Payload::new(),
            error: Some(error),
            timestamp: now_iso8601(),
            execution_time_ms,
            evidence: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_rejects_trace_id() {
        let raw = json!({
            "session_id": "s1",
            "request_id": "r1",
            "task_type": "echo",
            "trace_id": "a1b2c3d4-e5f6-7890-abcd-ef1234567890"
        });
        assert!(serde_json::from_value::<InvocationRequest>(raw).is_err());
    }

    #[test]
    fn test_request_payload_defaults_to_empty() {
        let raw = json!({"session_id": "s1", "request_id": "r1", "task_type": "echo"});
        let request: InvocationRequest = serde_json::from_value(raw).unwrap();
        assert!(request.payload.is_empty());
        assert!(request.privacy_level.is_none());
    }

    #[test]
    fn test_request_null_payload_matches_validator() {
        let raw = json!({
            "session_id": "s1",
            "request_id": "r1",
            "task_type": "echo",
            "payload": null
        });
        let request: InvocationRequest = serde_json::from_value(raw.clone()).unwrap();
        assert!(request.payload.is_empty());
        assert_eq!(crate::validation::validate_request(&raw).unwrap(), request);

        let raw = json!({
            "session_id": "s1",
            "request_id": "r1",
            "task_type": "echo",
            "payload": [1]
        });
        assert!(serde_json::from_value::<InvocationRequest>(raw).is_err());
    }

    #[test]
    fn test_privacy_level_values() {
        for level in ["local", "hybrid", "cloud"] {
            let parsed: PrivacyLevel = serde_json::from_value(json!(level)).unwrap();
            assert_eq!(parsed.as_str(), level);
        }
        assert!(serde_json::from_value::<PrivacyLevel>(json!("public")).is_err());
        assert_eq!(PrivacyLevel::parse("hybrid"), Some(PrivacyLevel::Hybrid));
        assert_eq!(PrivacyLevel::parse("HYBRID"), None);
    }

    #[test]
    fn test_error_code_strings() {
        assert_eq!(
            serde_json::to_value(ErrorCode::UnsupportedTask).unwrap(),
            json!("E-EXEC-001")
        );
        assert_eq!(ErrorCode::PayloadTooLarge.to_string(), "E-SIZE-001");
        let parsed: ErrorCode = serde_json::from_value(json!("E-PRIV-001")).unwrap();
        assert_eq!(parsed, ErrorCode::PrivacyViolation);
    }

    #[test]
    fn test_failure_binds_error_trace_id() {
        let ctx = InvocationContext::new("s1", "r1", "summarize");
        let other = InvocationContext::new("s1", "r1", "summarize");
        let error = ErrorDetail::unsupported_task(&other);

        let response = InvocationResponse::failure(&ctx, error, 0);
        let error = response.error.as_ref().unwrap();
        assert_eq!(error.trace_id, response.trace_id);
        assert_eq!(error.message, "Unsupported task type: summarize");
        assert!(response.result.is_empty());
        assert!(response.evidence.is_empty());
    }

    #[test]
    fn test_success_serializes_null_error_and_empty_evidence() {
        let ctx = InvocationContext::new("s1", "r1", "echo");
        let response = InvocationResponse::success(&ctx, Payload::new(), Vec::new(), 3);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], json!("success"));
        assert_eq!(value["error"], serde_json::Value::Null);
        assert_eq!(value["evidence"], json!([]));
        assert_eq!(value["execution_time_ms"], json!(3));
    }

    #[test]
    fn test_response_rejects_injected_fields() {
        let ctx = InvocationContext::new("s1", "r1", "echo");
        let response = InvocationResponse::success(&ctx, Payload::new(), Vec::new(), 0);
        let mut value = serde_json::to_value(&response).unwrap();
        value["injected"] = json!(true);
        assert!(serde_json::from_value::<InvocationResponse>(value).is_err());
    }
}
