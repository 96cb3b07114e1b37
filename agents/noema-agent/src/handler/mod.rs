//! HTTP boundary for the noema agent
//!
//! ## Architecture
//!
//! - `routes`: route definitions and the `ApiError` mapping
//! - `middleware`: request logging
//!
//! Every invocation is independent. `AppState` carries only immutable shared
//! collaborators, so handlers need no locks.

pub mod middleware;
pub mod routes;

pub use middleware::request_logging_middleware;
pub use routes::{create_router, health_check, invoke, metrics, service_info, ApiError};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AgentConfig;
use crate::engine::InvocationExecutor;
use crate::error::{AgentError, Result};
use crate::telemetry::{self, EventEmitter, FanoutEmitter, InvocationMetrics, TracingEmitter};
use crate::{AGENT_ID, AGENT_VERSION};

/// Shared state handed to every route
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<InvocationExecutor>,
    pub metrics: Option<Arc<InvocationMetrics>>,
    pub max_body_size: usize,
}

impl AppState {
    pub fn new(executor: InvocationExecutor) -> Self {
        Self {
            executor: Arc::new(executor),
            metrics: None,
            max_body_size: AgentConfig::default().max_body_size,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<InvocationMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Wire the executor, log emitter and metrics from configuration
    pub fn from_config(config: &AgentConfig) -> telemetry::Result<Self> {
        let mut emitter = FanoutEmitter::new().with(Arc::new(TracingEmitter));

        let metrics = if config.metrics_enabled {
            let metrics = Arc::new(InvocationMetrics::new()?);
            emitter = emitter.with(metrics.clone() as Arc<dyn EventEmitter>);
            Some(metrics)
        } else {
            None
        };

        Ok(Self {
            executor: Arc::new(InvocationExecutor::with_emitter(Arc::new(emitter))),
            metrics,
            max_body_size: config.max_body_size,
        })
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub executor: String,
    pub supported_tasks: Vec<String>,
}

impl HealthResponse {
    pub fn healthy(supported_tasks: Vec<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            executor: "ready".to_string(),
            supported_tasks,
        }
    }
}

/// Body of `GET /`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    pub description: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: AGENT_ID.to_string(),
            version: AGENT_VERSION.to_string(),
            status: "ready".to_string(),
            description: "Stateless execution layer".to_string(),
        }
    }
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: AgentConfig) -> Result<()> {
    let state = AppState::from_config(&config)
        .map_err(|e| AgentError::InternalError(e.to_string()))?;
    let supported = state.executor.supported_tasks();
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AgentError::config_error(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(
        address = %addr,
        version = AGENT_VERSION,
        supported_tasks = ?supported,
        "noema-agent listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AgentError::InternalError(format!("Server error: {}", e)))?;

    tracing::info!("noema-agent stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_info_defaults() {
        let info = ServiceInfo::default();
        assert_eq!(info.service, "noema-agent");
        assert_eq!(info.status, "ready");
        assert_eq!(info.description, "Stateless execution layer");
    }

    #[test]
    fn test_state_from_config() {
        let state = AppState::from_config(&AgentConfig::default()).unwrap();
        assert!(state.metrics.is_some());
        assert_eq!(state.executor.supported_tasks(), vec!["echo".to_string()]);

        let config = AgentConfig {
            metrics_enabled: false,
            max_body_size: 64,
            ..AgentConfig::default()
        };
        let state = AppState::from_config(&config).unwrap();
        assert!(state.metrics.is_none());
        assert_eq!(state.max_body_size, 64);
    }

    #[test]
    fn test_health_serialization() {
        let json = serde_json::to_value(HealthResponse::healthy(vec!["echo".to_string()])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "healthy",
                "executor": "ready",
                "supported_tasks": ["echo"]
            })
        );
    }
}
