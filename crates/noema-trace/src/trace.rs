//! Server-generated trace identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier correlating one invocation's logs and error detail.
///
/// Always rendered in canonical UUID form: lowercase, hyphenated,
/// 36 characters. Trace ids are minted by the server and never taken
/// from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    /// Mint a fresh random trace id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Parse an existing canonical id, e.g. one read back from a response.
    ///
    /// Returns `None` unless `value` is a UUID in hyphenated form.
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() != 36 {
            return None;
        }
        Uuid::parse_str(value)
            .ok()
            .map(|uuid| Self(uuid.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TraceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generate the trace id for a newly accepted invocation.
pub fn new_trace_id() -> TraceId {
    TraceId::generate()
}
