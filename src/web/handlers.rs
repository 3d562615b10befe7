//! HTTP request handlers.

use super::AppState;
use crate::diagnostics::DiagnosticError;
use crate::probe::CommandRunner;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::any::Any;

#[derive(Debug, Deserialize)]
pub struct DiagnosticsRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

const UNAVAILABLE: &str = "Failed to run diagnostics";

// ============================================================================
// API: Diagnostics
// ============================================================================

pub async fn handle_diagnostics<R: CommandRunner + 'static>(
    State(state): State<AppState<R>>,
    Json(req): Json<DiagnosticsRequest>,
) -> Response {
    match state.diagnostics.collect(&req.url).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: DiagnosticError) -> Response {
    let (status, message) = match &err {
        DiagnosticError::EmptyTarget | DiagnosticError::InvalidTarget(_) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        DiagnosticError::Internal(_) => {
            tracing::error!("Diagnostic error: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, UNAVAILABLE.to_string())
        }
    };

    (status, Json(ErrorResponse { error: message })).into_response()
}

/// Map a panic inside a handler to the generic failure response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Diagnostic handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: UNAVAILABLE.to_string(),
        }),
    )
        .into_response()
}
