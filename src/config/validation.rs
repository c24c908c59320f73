//! Configuration validation.
//!
//! Serde handles syntax; this module handles meaning. Validation is a pure
//! function `&ServiceConfig -> Result<(), Vec<ValidationError>>` that reports
//! every problem it finds, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("metrics.path {0:?} must start with '/'")]
    MetricsPathRelative(String),

    #[error("metrics.path {0:?} collides with an application route")]
    MetricsPathCollision(String),

    #[error("metrics.path {0:?} must be a literal path without parameters or wildcards")]
    MetricsPathPattern(String),

    #[error("logging.level {0:?} is not a valid filter directive")]
    LogLevel(String),
}

const APPLICATION_ROUTES: &[&str] = &["/", "/health"];

/// True when the router would treat `path` as a fixed route: no `{param}`,
/// no `*` wildcard and no legacy `:param` segment.
fn is_literal_path(path: &str) -> bool {
    !path.contains(['{', '}', '*']) && !path.split('/').any(|segment| segment.starts_with(':'))
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let path = &config.metrics.path;
    if !path.starts_with('/') {
        errors.push(ValidationError::MetricsPathRelative(path.clone()));
    } else if !is_literal_path(path) {
        errors.push(ValidationError::MetricsPathPattern(path.clone()));
    } else if APPLICATION_ROUTES.contains(&path.as_str()) {
        errors.push(ValidationError::MetricsPathCollision(path.clone()));
    }

    if tracing_subscriber::EnvFilter::try_new(&config.logging.level).is_err() {
        errors.push(ValidationError::LogLevel(config.logging.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
