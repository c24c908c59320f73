//! Route handlers.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::error::AppError;
use crate::http::server::AppState;
use crate::observability::tracing::TraceId;

pub const GREETING: &str = "Hello, DevOps World!";

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct Greeting {
    pub message: &'static str,
    pub trace_id: TraceId,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub trace_id: TraceId,
}

pub async fn root(trace_id: TraceId) -> Json<Greeting> {
    Json(Greeting {
        message: GREETING,
        trace_id,
    })
}

/// Static readiness stub; no dependency checks.
pub async fn health(trace_id: TraceId) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        trace_id,
    })
}

/// Prometheus scrape route.
pub async fn scrape(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.render(),
    )
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_root_body_field_order() {
        let trace_id = TraceId::generate();
        let Json(body) = root(trace_id).await;

        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            format!(r#"{{"message":"Hello, DevOps World!","trace_id":"{trace_id}"}}"#)
        );
    }

    #[tokio::test]
    async fn test_health_body() {
        let trace_id = TraceId::generate();
        let Json(body) = health(trace_id).await;

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "status": "ok", "trace_id": trace_id.to_string() })
        );
    }
}
