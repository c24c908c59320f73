//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up the middleware pipeline around every route and the fallback
//! - Mount the scrape route once, when metrics are enabled
//! - Serve on a bound listener until shutdown

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::http::handlers;
use crate::http::middleware::{track_metrics, trace_requests};
use crate::observability::metrics::HttpMetrics;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<HttpMetrics>,
}

/// HTTP server for the service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server.
    ///
    /// `metrics` is the process-wide registry; the caller owns its lifetime
    /// and may keep a clone to render snapshots directly.
    pub fn new(config: ServiceConfig, metrics: Arc<HttpMetrics>) -> Self {
        let state = AppState { metrics };
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let mut routes = Router::new()
            .route("/", get(handlers::root))
            .route("/health", get(handlers::health));

        if config.metrics.enabled {
            routes = routes.route(&config.metrics.path, get(handlers::scrape));
        }

        let routes = routes
            .fallback(handlers::not_found)
            .with_state(state.clone());

        with_pipeline(routes, config, state)
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until a
    /// value arrives on `shutdown` (or its sender is dropped).
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wrap `routes` in the request pipeline.
///
/// Layers are listed innermost first; the last one added sees the request first.
#[allow(deprecated)]
pub fn with_pipeline(routes: Router, config: &ServiceConfig, state: AppState) -> Router {
    let routes = routes
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(middleware::map_response(timeout_body))
        .layer(CatchPanicLayer::custom(panic_response));

    let routes = if config.metrics.enabled {
        routes.layer(middleware::from_fn_with_state(state, track_metrics))
    } else {
        routes
    };

    routes.layer(middleware::from_fn(trace_requests))
}

/// `TimeoutLayer` answers with a bare 408; give it the same JSON body as
/// every other error.
async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(header::CONTENT_TYPE)
    {
        return AppError::Timeout.into_response();
    }
    response
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "handler panicked");
    AppError::Internal.into_response()
}
