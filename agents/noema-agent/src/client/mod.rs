//! HTTP client for a running noema agent
//!
//! Thin async wrapper over `reqwest`. A 422 from the boundary surfaces as
//! [`ClientError::Rejected`] with the field violations still recoverable
//! through [`ClientError::violations`].

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::contracts::{InvocationRequest, InvocationResponse};
use crate::handler::HealthResponse;
use crate::validation::FieldViolation;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Errors from talking to a remote agent
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ClientError {
    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Field violations carried by a 422 body
    pub fn violations(&self) -> Option<Vec<FieldViolation>> {
        #[derive(Deserialize)]
        struct Detail {
            detail: Vec<FieldViolation>,
        }

        match self {
            ClientError::Rejected { status: 422, body } => serde_json::from_str::<Detail>(body)
                .ok()
                .map(|d| d.detail),
            _ => None,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct NoemaClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for NoemaClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// HTTP client for the invocation boundary
#[derive(Debug, Clone)]
pub struct NoemaClient {
    client: Client,
    config: NoemaClientConfig,
}

impl NoemaClient {
    /// Client with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_config(NoemaClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        Self::with_config(NoemaClientConfig {
            base_url: base_url.into(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    pub fn with_config(mut config: NoemaClientConfig) -> Result<Self, ClientError> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// POST a typed request to `/invoke`
    pub async fn invoke(
        &self,
        request: &InvocationRequest,
    ) -> Result<InvocationResponse, ClientError> {
        self.post_invoke(request).await
    }

    /// POST an arbitrary JSON body to `/invoke`, letting the server validate it
    pub async fn invoke_raw(&self, body: &Value) -> Result<InvocationResponse, ClientError> {
        self.post_invoke(body).await
    }

    /// GET `/health`
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        read_json(response).await
    }

    async fn post_invoke<B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<InvocationResponse, ClientError> {
        let url = format!("{}/invoke", self.config.base_url);
        tracing::debug!(url = %url, "Posting invocation");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = %status, "Remote agent rejected request");
        return Err(ClientError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))
}
