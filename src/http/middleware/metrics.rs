//! Request instrumentation middleware.
//!
//! Records one `RequestSample` per completed response. Runs inside the trace
//! middleware and outside the panic/timeout stages, so failures are counted
//! with their final status.

use std::time::Instant;

use axum::{
    body::HttpBody,
    extract::{MatchedPath, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;
use crate::observability::metrics::{RequestSample, UNMATCHED_HANDLER};

pub async fn track_metrics(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let handler = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_HANDLER.to_owned());

    if state.metrics.is_excluded(&handler) {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    let request_size = content_length(request.headers()).unwrap_or(0);
    let _in_progress = state.metrics.track_in_progress(&handler, &method);

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    let response_size = response
        .body()
        .size_hint()
        .exact()
        .or_else(|| content_length(response.headers()))
        .unwrap_or(0);

    state.metrics.record(&RequestSample {
        handler,
        method,
        status: response.status().as_u16(),
        duration,
        request_size,
        response_size,
    });

    response
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
