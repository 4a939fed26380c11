//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, concurrency >= 1)
//! - Check addresses and the engine URL parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EvaluatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::EvaluatorConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `engine.url`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &EvaluatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.decision.decision_id.trim().is_empty() {
        errors.push(ValidationError::new("decision.decision_id", "must not be empty"));
    }
    if config.decision.requirements_id.trim().is_empty() {
        errors.push(ValidationError::new(
            "decision.requirements_id",
            "must not be empty",
        ));
    }

    match url::Url::parse(&config.engine.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "engine.url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "engine.url",
            format!("'{}' is not a valid URL: {}", config.engine.url, e),
        )),
    }

    if config.engine.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "engine.connect_timeout_secs",
            "must be greater than zero",
        ));
    }
    if config.engine.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "engine.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.dispatch.concurrency == 0 {
        errors.push(ValidationError::new(
            "dispatch.concurrency",
            "must be at least 1",
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new(
            "security.max_body_size",
            "must be greater than zero",
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
