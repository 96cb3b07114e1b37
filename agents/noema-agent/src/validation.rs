//! Request validation for the invocation boundary
//!
//! Turns a raw JSON body into an [`InvocationRequest`] or a
//! [`RequestRejection`] listing every offending field. Validation is strict:
//! the request schema is closed, and a caller-supplied `trace_id` is called
//! out with its own code.
//!
//! Rejected requests never reach the executor and never get a trace id.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::contracts::{InvocationRequest, Payload, PrivacyLevel};

/// Fields accepted on an `InvocationRequest`
pub const REQUEST_FIELDS: [&str; 6] = [
    "session_id",
    "request_id",
    "task_type",
    "payload",
    "timestamp",
    "privacy_level",
];

const REQUIRED_FIELDS: [&str; 3] = ["session_id", "request_id", "task_type"];

/// Machine-readable reason for a field violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    InvalidBody,
    UnknownField,
    TraceIdNotAllowed,
    RequiredFieldMissing,
    TypeMismatch,
    EmptyField,
    InvalidEnumValue,
}

/// One offending field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field name (empty for whole-body violations)
    pub field: String,
    pub code: ViolationCode,
    pub message: String,
}

impl FieldViolation {
    fn new(field: impl Into<String>, code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Request failed schema validation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("request validation failed: {}", summarize(.violations))]
pub struct RequestRejection {
    pub violations: Vec<FieldViolation>,
}

impl RequestRejection {
    fn single(violation: FieldViolation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    /// Whether any violation concerns `field`
    pub fn has_violation(&self, field: &str, code: ViolationCode) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && v.code == code)
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate a raw JSON body against the closed request schema.
///
/// All violations are collected before returning, ordered by field name.
/// Required ids must be non-empty strings; whitespace is kept as given.
pub fn validate_request(raw: &Value) -> Result<InvocationRequest, RequestRejection> {
    let Some(object) = raw.as_object() else {
        return Err(RequestRejection::single(FieldViolation::new(
            "",
            ViolationCode::InvalidBody,
            format!("Request body must be a JSON object, got {}", json_type_name(raw)),
        )));
    };

    let mut violations = Vec::new();

    for key in object.keys() {
        if key == "trace_id" {
            violations.push(FieldViolation::new(
                key.as_str(),
                ViolationCode::TraceIdNotAllowed,
                "trace_id is generated by the server and must not be supplied",
            ));
        } else if !REQUEST_FIELDS.contains(&key.as_str()) {
            violations.push(FieldViolation::new(
                key.as_str(),
                ViolationCode::UnknownField,
                "Extra inputs are not permitted",
            ));
        }
    }

    let [session_id, request_id, task_type] =
        REQUIRED_FIELDS.map(|field| match required_string(object.get(field), field) {
            Ok(value) => Some(value),
            Err(violation) => {
                violations.push(violation);
                None
            }
        });

    let payload = match object.get("payload") {
        None | Some(Value::Null) => Some(Payload::new()),
        Some(Value::Object(map)) => Some(map.clone()),
        Some(other) => {
            violations.push(type_mismatch("payload", "object", other));
            None
        }
    };

    let timestamp = match object.get("timestamp") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            violations.push(type_mismatch("timestamp", "string", other));
            None
        }
    };

    let privacy_level = match object.get("privacy_level") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match PrivacyLevel::parse(s) {
            Some(level) => Some(level),
            None => {
                violations.push(FieldViolation::new(
                    "privacy_level",
                    ViolationCode::InvalidEnumValue,
                    format!("Input should be 'local', 'hybrid' or 'cloud', got '{}'", s),
                ));
                None
            }
        },
        Some(other) => {
            violations.push(type_mismatch("privacy_level", "string", other));
            None
        }
    };

    match (session_id, request_id, task_type, payload) {
        (Some(session_id), Some(request_id), Some(task_type), Some(payload))
            if violations.is_empty() =>
        {
            Ok(InvocationRequest {
                session_id,
                request_id,
                task_type,
                payload,
                timestamp,
                privacy_level,
            })
        }
        _ => {
            violations.sort_by(|a, b| a.field.cmp(&b.field));
            Err(RequestRejection { violations })
        }
    }
}

fn required_string(value: Option<&Value>, field: &str) -> Result<String, FieldViolation> {
    match value {
        None => Err(FieldViolation::new(
            field,
            ViolationCode::RequiredFieldMissing,
            format!("Required field '{}' is missing", field),
        )),
        Some(Value::String(s)) if s.is_empty() => Err(FieldViolation::new(
            field,
            ViolationCode::EmptyField,
            format!("Field '{}' must not be empty", field),
        )),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(type_mismatch(field, "string", other)),
    }
}

fn type_mismatch(field: &str, expected: &str, actual: &Value) -> FieldViolation {
    FieldViolation::new(
        field,
        ViolationCode::TypeMismatch,
        format!(
            "Field '{}' must be a {}, got {}",
            field,
            expected,
            json_type_name(actual)
        ),
    )
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
