//! Evidence attachments carried in task payloads.
//!
//! Parsing here is best-effort: an attachment that fails validation is
//! dropped from its list and the invocation carries on. This is a separate
//! policy from request validation, which rejects the whole request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Payload;

/// Payload key that holds the evidence list
pub const EVIDENCE_KEY: &str = "evidence";

/// Human-readable citation of a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvidenceAttachment {
    /// Opaque source reference, e.g. `doc-001#p3`
    pub source_id: String,

    /// Free-form category, e.g. `pdf`, `web`, `note`
    pub source_type: String,

    /// Locator within the source, e.g. `p.3`
    pub location: String,

    /// Excerpt from the source; never blank
    pub snippet: String,

    /// Relevance or confidence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Why a single attachment was rejected
#[derive(Error, Debug)]
pub enum EvidenceError {
    #[error("evidence item is not an object")]
    NotAnObject,

    #[error("invalid evidence item: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("evidence snippet is empty")]
    EmptySnippet,
}

impl EvidenceAttachment {
    /// Validate one raw item against the closed attachment schema
    pub fn from_value(value: &serde_json::Value) -> Result<Self, EvidenceError> {
        if !value.is_object() {
            return Err(EvidenceError::NotAnObject);
        }
        let attachment: EvidenceAttachment = serde_json::from_value(value.clone())?;
        if attachment.snippet.trim().is_empty() {
            return Err(EvidenceError::EmptySnippet);
        }
        Ok(attachment)
    }
}

/// Lift valid evidence attachments out of a payload.
///
/// Returns an empty list when `evidence` is absent or not an array. Invalid
/// items are skipped; the order of the valid ones is preserved.
pub fn parse_evidence(payload: &Payload) -> Vec<EvidenceAttachment> {
    let Some(serde_json::Value::Array(items)) = payload.get(EVIDENCE_KEY) else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match EvidenceAttachment::from_value(item) {
            Ok(attachment) => Some(attachment),
            Err(e) => {
                tracing::debug!(index, reason = %e, "Skipping evidence item");
                None
            }
        })
        .collect()
}
