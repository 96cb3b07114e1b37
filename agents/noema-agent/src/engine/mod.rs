//! Invocation executor
//!
//! Deterministic dispatch of validated requests to task handlers through a
//! registry keyed by task type. Each call builds its own context, so nothing
//! is shared between invocations except the immutable registry and the
//! injected event emitter.

mod handlers;

pub use handlers::*;

use noema_trace::{InvocationContext, Stopwatch};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::contracts::*;
use crate::telemetry::{EventEmitter, NoopEmitter};

/// Trait for task handlers
pub trait TaskHandler: Send + Sync {
    /// Task type this handler serves
    fn task_type(&self) -> &str;

    /// Run the task against the payload
    fn handle(&self, ctx: &InvocationContext, payload: &Payload) -> Result<Payload, TaskFailure>;
}

/// Errors from registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Handler for task type '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// Task type to handler mapping
#[derive(Default)]
pub struct TaskRegistry {
    handlers: BTreeMap<String, Arc<dyn TaskHandler>>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in handlers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.handlers.insert(EchoHandler::TASK_TYPE.to_string(), Arc::new(EchoHandler));
        registry
    }

    /// Register a handler under its task type
    pub fn register<H: TaskHandler + 'static>(&mut self, handler: H) -> Result<(), RegistryError> {
        let task_type = handler.task_type().to_string();
        if self.handlers.contains_key(&task_type) {
            return Err(RegistryError::AlreadyRegistered(task_type));
        }
        self.handlers.insert(task_type, Arc::new(handler));
        Ok(())
    }

    pub fn get(&self, task_type: &str) -> Option<Arc<dyn TaskHandler>> {
        self.handlers.get(task_type).cloned()
    }

    /// Registered task types in sorted order
    pub fn supported_tasks(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }
}

/// Executes validated invocation requests
pub struct InvocationExecutor {
    registry: TaskRegistry,
    emitter: Arc<dyn EventEmitter>,
}

impl Default for InvocationExecutor {
    fn default() -> Self {
        Self::new(TaskRegistry::with_defaults(), Arc::new(NoopEmitter))
    }
}

impl InvocationExecutor {
    pub fn new(registry: TaskRegistry, emitter: Arc<dyn EventEmitter>) -> Self {
        Self { registry, emitter }
    }

    /// Executor with the built-in handlers and the given emitter
    pub fn with_emitter(emitter: Arc<dyn EventEmitter>) -> Self {
        Self::new(TaskRegistry::with_defaults(), emitter)
    }

    pub fn supported_tasks(&self) -> Vec<String> {
        self.registry.supported_tasks()
    }

    /// Execute one request.
    ///
    /// A fresh trace id is minted per call. `execution_time_ms` covers the
    /// handler lookup and run only. Unsupported task types produce an error
    /// response; they are never retried or routed elsewhere.
    pub fn execute(&self, request: &InvocationRequest) -> InvocationResponse {
        let ctx = InvocationContext::new(
            request.session_id.as_str(),
            request.request_id.as_str(),
            request.task_type.as_str(),
        );

        self.emitter.emit(&InvocationEvent::started(
            &ctx,
            compute_inputs_hash(&request.task_type, &request.payload),
        ));

        let watch = Stopwatch::start();
        let outcome = match self.registry.get(&request.task_type) {
            Some(handler) => handler
                .handle(&ctx, &request.payload)
                .map_err(|f| ErrorDetail::new(&ctx, f.code, f.message, f.recoverable)),
            None => Err(ErrorDetail::unsupported_task(&ctx)),
        };
        let execution_time_ms = watch.elapsed_ms();

        let response = match outcome {
            Ok(result) => {
                let evidence = parse_evidence(&request.payload);
                InvocationResponse::success(&ctx, result, evidence, execution_time_ms)
            }
            Err(error) => {
                self.emitter.emit(&InvocationEvent::error_raised(&ctx, &error));
                InvocationResponse::failure(&ctx, error, execution_time_ms)
            }
        };

        self.emitter.emit(&InvocationEvent::completed(
            &ctx,
            response.status,
            execution_time_ms,
        ));

        response
    }
}

/// Deterministic hash of the task inputs, for correlating identical requests
pub fn compute_inputs_hash(task_type: &str, payload: &Payload) -> String {
    let mut hasher = Sha256::new();
    hasher.update(task_type.as_bytes());
    if let Ok(json) = serde_json::to_string(payload) {
        hasher.update(json.as_bytes());
    }
    hex::encode(hasher.finalize())
}
