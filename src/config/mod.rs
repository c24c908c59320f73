//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → read once by the composition root in main.rs
//! ```
//!
//! # Design Decisions
//! - All fields have defaults; no file means the stock service on port 8000
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, LogFormat, LoggingConfig, MetricsConfig, ServiceConfig, TimeoutConfig};
