//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request produces:
//!     → tracing.rs (trace ID in request-scoped context)
//!     → logging.rs (received / completed log lines)
//!     → metrics.rs (counters and histograms, scraped on demand)
//! ```
//!
//! # Design Decisions
//! - Trace ID flows through logs, response headers and response bodies
//! - Metrics are cheap (atomic increments)
//! - No distributed context: IDs start and end with the request

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use self::metrics::HttpMetrics;
pub use self::tracing::{RequestContext, TraceId, X_TRACE_ID};
