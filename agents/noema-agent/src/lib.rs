//! Noema Agent
//!
//! A stateless invocation boundary. Callers submit a task request; the agent
//! validates it against a closed schema, dispatches it to a registered task
//! handler, and answers with a traced response that carries either a result
//! or a structured error.
//!
//! ## Architecture
//!
//! 1. **Contracts** (`contracts/`): request, response, error detail,
//!    evidence attachments and lifecycle events.
//!
//! 2. **Validation** (`validation`): raw JSON to `InvocationRequest`, or a
//!    rejection listing every offending field.
//!
//! 3. **Engine** (`engine/`): task registry and the executor that mints the
//!    trace id, times the handler and emits lifecycle events.
//!
//! 4. **Telemetry** (`telemetry/`): event emitters (structured log lines,
//!    in-memory capture) and Prometheus metrics.
//!
//! 5. **Handler** (`handler/`): axum routes for `/invoke`, `/health`, `/`
//!    and `/metrics`.
//!
//! 6. **Client** (`client/`) and **CLI** (`cli/`).
//!
//! ## Example
//!
//! ```rust
//! use noema_agent::{InvocationExecutor, InvocationRequest, ExecutionStatus};
//! use serde_json::json;
//!
//! let executor = InvocationExecutor::default();
//! let request = InvocationRequest::new("session-1", "request-1", "echo")
//!     .with_payload(json!({"message": "hi"}).as_object().cloned().unwrap_or_default());
//!
//! let response = executor.execute(&request);
//! assert_eq!(response.status, ExecutionStatus::Success);
//! assert_eq!(response.result["message"], "hi");
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod telemetry;
pub mod validation;

// Contracts module - located at ../contracts relative to src/
#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use client::{ClientError, NoemaClient};
pub use config::{AgentConfig, LogFormat};
pub use contracts::{
    parse_evidence, ErrorCode, ErrorDetail, EventName, EvidenceAttachment, ExecutionStatus,
    InvocationEvent, InvocationRequest, InvocationResponse, Payload, PrivacyLevel,
};
pub use engine::{
    compute_inputs_hash, EchoHandler, InvocationExecutor, RegistryError, TaskFailure,
    TaskHandler, TaskRegistry,
};
pub use error::AgentError;
pub use handler::{create_router, AppState, HealthResponse, ServiceInfo};
pub use telemetry::{EventEmitter, InvocationMetrics, MemoryEmitter, NoopEmitter, TracingEmitter};
pub use validation::{validate_request, FieldViolation, RequestRejection, ViolationCode};

pub use cli::{ExitCode, NoemaCli, NoemaCommands};

/// Agent version (from Cargo.toml)
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Agent identifier
pub const AGENT_ID: &str = "noema-agent";

/// Run the CLI application and map failures to an exit code
pub async fn run_cli(cli: NoemaCli, config: AgentConfig) -> ExitCode {
    match cli::run(cli, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::from_error(&e)
        }
    }
}
