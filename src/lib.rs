//! Minimal HTTP service with request tracing, structured logging and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use error::AppError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::{HttpMetrics, TraceId};
