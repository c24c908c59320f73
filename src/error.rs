//! Request-level error kinds and their HTTP rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced while handling a request.
#[derive(Debug, Error)]
pub enum AppError {
    /// A handler ran without the trace middleware in front of it.
    #[error("request context is missing: trace middleware did not run")]
    MissingTraceContext,

    /// Downstream handler panicked.
    #[error("internal server error")]
    Internal,

    /// Downstream processing exceeded the request timeout.
    #[error("request timed out")]
    Timeout,

    /// No route matched.
    #[error("Not Found")]
    NotFound,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingTraceContext | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorBody { detail: self.to_string() })).into_response()
    }
}
