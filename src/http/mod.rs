//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, graceful shutdown)
//!     → middleware/trace_id.rs (trace ID, context, lifecycle logs)
//!     → middleware/metrics.rs (request sample)
//!     → handlers.rs (`/`, `/health`, scrape route, 404)
//!     → back out through the middleware (header, completion log)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{AppState, HttpServer};
