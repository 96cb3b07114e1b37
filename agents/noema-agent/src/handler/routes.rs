//! Route definitions for the noema agent
//!
//! - POST /invoke - validate and execute one invocation
//! - GET /health - executor readiness and supported task types
//! - GET / - service identity
//! - GET /metrics - Prometheus text exposition
//!
//! Transport and schema failures are answered with 4xx before the executor
//! runs. Execution failures are a normal 200 response with `status=error`.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use super::{request_logging_middleware, AppState, HealthResponse, ServiceInfo};
use crate::contracts::InvocationResponse;
use crate::validation::{validate_request, RequestRejection};

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Body is not valid JSON
    MalformedBody(String),
    /// Content type is not `application/json`
    UnsupportedMediaType(String),
    /// Body exceeds the configured limit
    PayloadTooLarge(String),
    /// Body parsed but failed schema validation
    Rejected(RequestRejection),
    NotFound(String),
    InternalError(String),
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MalformedBody(_) => "MALFORMED_BODY",
            ApiError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Rejected(_) => "VALIDATION_FAILED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::UNSUPPORTED_MEDIA_TYPE => {
                ApiError::UnsupportedMediaType(rejection.body_text())
            }
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(rejection.body_text()),
            _ => ApiError::MalformedBody(rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            // Validation failures list every offending field
            ApiError::Rejected(rejection) => json!({ "detail": rejection.violations }),
            ApiError::MalformedBody(msg)
            | ApiError::UnsupportedMediaType(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalError(msg) => json!({
                "code": self.error_code(),
                "detail": msg,
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.max_body_size;

    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/invoke", post(invoke))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /invoke - validate the body, then execute it
///
/// The body is taken as untyped JSON so every schema violation can be
/// reported at once, and so `trace_id` can be flagged by name.
pub async fn invoke(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<InvocationResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Unreadable invocation body");
        ApiError::from(rejection)
    })?;

    let request = validate_request(&body).map_err(|rejection| {
        tracing::debug!(
            violations = rejection.violations.len(),
            error = %rejection,
            "Invocation rejected"
        );
        if let Some(metrics) = &state.metrics {
            metrics.record_rejection();
        }
        ApiError::Rejected(rejection)
    })?;

    Ok(Json(state.executor.execute(&request)))
}

/// GET /health - executor readiness
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.executor.supported_tasks()))
}

/// GET / - service identity
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let metrics = state
        .metrics
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Metrics are disabled".to_string()))?;

    let text = metrics
        .render()
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    )
        .into_response())
}
