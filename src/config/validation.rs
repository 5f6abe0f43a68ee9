//! Configuration validation.
//!
//! Semantic checks on top of the syntactic validation serde already does.
//! Returns all violations, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic violation in a loaded configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("upstream.host must not be empty")]
    EmptyUpstreamHost,
    #[error("upstream.port must not be zero")]
    ZeroUpstreamPort,
    #[error("listener.bind_address is not a valid socket address: {0}")]
    BadBindAddress(String),
    #[error("listener.max_connections must be at least 1")]
    ZeroMaxConnections,
    #[error("retries.max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("timeouts.attempt_secs must not be zero")]
    ZeroAttemptTimeout,
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.host.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstreamHost);
    }
    if config.upstream.port == 0 {
        errors.push(ValidationError::ZeroUpstreamPort);
    }
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BadBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if config.timeouts.attempt_secs == 0 {
        errors.push(ValidationError::ZeroAttemptTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
