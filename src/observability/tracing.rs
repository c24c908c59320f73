//! Per-request trace context.
//!
//! # Responsibilities
//! - Generate a fresh trace ID for every inbound request
//! - Carry it in request-scoped state (request extensions)
//! - Hand it to handlers through an extractor
//!
//! # Design Decisions
//! - IDs are UUID v4: 122 random bits, hyphenated lowercase hex
//! - No inbound propagation: any client-supplied ID is ignored
//! - The context lives in the request's extensions and dies with the request

use std::fmt;
use std::str::FromStr;

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderName};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

/// Response header carrying the trace ID.
pub static X_TRACE_ID: HeaderName = HeaderName::from_static("x-trace-id");

/// A per-request unique identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Generate a new random trace ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s).map(Self)
    }
}

/// Request-scoped state attached by the trace middleware.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: TraceId,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            trace_id: TraceId::generate(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FromRequestParts<S> for TraceId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .map(|ctx| ctx.trace_id)
            .ok_or(AppError::MissingTraceContext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use std::collections::HashSet;

    #[test]
    fn test_display_is_canonical_uuid() {
        let id = TraceId::generate();
        let rendered = id.to_string();

        assert_eq!(rendered.len(), 36);
        assert_eq!(rendered.matches('-').count(), 4);
        assert_eq!(rendered, rendered.to_lowercase());
        assert_eq!(id.as_uuid().get_version_num(), 4);
        assert_eq!(rendered.parse::<TraceId>().unwrap(), id);
    }

    #[test]
    fn test_generate_is_unique() {
        let ids: HashSet<_> = (0..10_000).map(|_| TraceId::generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_serializes_as_string() {
        let id = TraceId::generate();
        assert_eq!(serde_json::to_value(id).unwrap(), serde_json::json!(id.to_string()));
    }

    #[tokio::test]
    async fn test_extractor_reads_context() {
        let ctx = RequestContext::new();
        let mut request = Request::new(());
        request.extensions_mut().insert(ctx.clone());
        let (mut parts, _) = request.into_parts();

        let id = TraceId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(id, ctx.trace_id);
    }

    #[tokio::test]
    async fn test_extractor_without_context() {
        let (mut parts, _) = Request::new(()).into_parts();
        let err = TraceId::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::MissingTraceContext));
    }
}
