//! Request middleware pipeline.
//!
//! # Order (outermost first)
//! ```text
//! trace_id::trace_requests     trace ID, request-scoped context, header, lifecycle logs
//!     → metrics::track_metrics  per-request sample (only when metrics are enabled)
//!     → catch panic             handler panic → 500 JSON
//!     → timeout                 slow request → 408
//!     → route handler / scrape route / 404 fallback
//! ```

pub mod metrics;
pub mod trace_id;

pub use metrics::track_metrics;
pub use trace_id::trace_requests;
