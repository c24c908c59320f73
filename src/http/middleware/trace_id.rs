//! Trace ID middleware.
//!
//! Outermost stage of the pipeline. For every request it:
//! 1. generates a `TraceId` and stores a `RequestContext` in the request extensions,
//! 2. logs `request received`,
//! 3. runs the rest of the chain inside a `request` span,
//! 4. sets exactly one `X-Trace-ID` response header,
//! 5. logs `request completed`.
//!
//! Inner stages turn panics and timeouts into responses, so steps 4 and 5
//! run for failed requests too. If the transport drops the future while
//! step 3 is pending, the completion log is skipped; nothing else needs releasing.

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use crate::observability::tracing::{RequestContext, TraceId, X_TRACE_ID};

pub async fn trace_requests(mut request: Request, next: Next) -> Response {
    let context = RequestContext::new();
    let trace_id = context.trace_id;

    tracing::info!(
        method = %request.method(),
        path = %request.uri().path(),
        trace_id = %trace_id,
        "request received"
    );

    request.extensions_mut().insert(context);

    let span = tracing::info_span!("request", trace_id = %trace_id);
    let mut response = next.run(request).instrument(span).await;

    set_trace_header(&mut response, trace_id);

    let status = response.status();
    if status.is_server_error() {
        tracing::error!(status_code = status.as_u16(), trace_id = %trace_id, "request completed");
    } else {
        tracing::info!(status_code = status.as_u16(), trace_id = %trace_id, "request completed");
    }

    response
}

/// Replace any existing `X-Trace-ID` header with `trace_id`.
pub fn set_trace_header(response: &mut Response, trace_id: TraceId) {
    match HeaderValue::from_str(&trace_id.to_string()) {
        Ok(value) => {
            response.headers_mut().insert(X_TRACE_ID.clone(), value);
        }
        Err(e) => tracing::warn!(trace_id = %trace_id, error = %e, "trace id is not a valid header value"),
    }
}
