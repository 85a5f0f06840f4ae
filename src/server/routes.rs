// src/server/routes.rs

//! HTTP surface: `GET /healthcheck` and `POST /build`.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::pipeline::PipelineRuntime;
use crate::types::BuildRequest;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: Arc<PipelineRuntime>,
}

impl AppState {
    pub fn new(pipeline: PipelineRuntime) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Errors a handler answers with instead of a build result.
#[derive(Debug)]
pub enum ApiError {
    /// The body is not a well-formed build request.
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}

/// Build the application router with tracing and panic recovery.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/build", post(build))
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn healthcheck() -> StatusCode {
    StatusCode::OK
}

/// Run one build synchronously and answer with its [`BuildResult`].
///
/// The build runs on its own task: if the client goes away the build still
/// completes and its workspace is still removed.
///
/// [`BuildResult`]: crate::types::BuildResult
async fn build(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request: BuildRequest = serde_json::from_slice(&body).map_err(|err| {
        warn!(error = %err, "failed to parse build request");
        ApiError::BadRequest(format!("Failed to unmarshal input: {err}"))
    })?;

    request.validate().map_err(|err| {
        warn!(repo = %request.repository, error = %err, "rejected build request");
        ApiError::BadRequest(err.to_string())
    })?;

    let pipeline = Arc::clone(&state.pipeline);
    let report = tokio::spawn(async move { pipeline.run(&request).await })
        .await
        .map_err(|err| {
            error!(error = %err, "build task aborted");
            ApiError::Internal("Build aborted".to_string())
        })?;

    let body = serde_json::to_vec(&report.result).map_err(|err| {
        error!(error = %err, "failed to serialize build result");
        ApiError::Internal("Failed to marshal output".to_string())
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
