//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that the selected auth provider has what it needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NotesConfig → Result<(), Vec<ValidationError>>
//! - A missing summarizer credential is NOT a validation error; summarize
//!   requests report it at call time and the rest of the API keeps working

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::config::schema::{AuthProvider, NotesConfig};
use crate::resilience::RetryPolicy;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
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

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &NotesConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    } else if let Some(worst) = RetryPolicy::from(&config.summarizer).worst_case_duration() {
        if Duration::from_secs(config.timeouts.request_secs) < worst {
            errors.push(ValidationError::new(
                "timeouts.request_secs",
                format!(
                    "must cover a fully retried summarize call ({}s)",
                    worst.as_secs_f64().ceil() as u64
                ),
            ));
        }
    }

    let summarizer = &config.summarizer;
    if url::Url::parse(&summarizer.endpoint).is_err() {
        errors.push(ValidationError::new(
            "summarizer.endpoint",
            format!("'{}' is not a valid URL", summarizer.endpoint),
        ));
    }
    if summarizer.timeout_secs == 0 {
        errors.push(ValidationError::new("summarizer.timeout_secs", "must be greater than 0"));
    }
    if summarizer.max_delay_ms < summarizer.base_delay_ms {
        errors.push(ValidationError::new(
            "summarizer.max_delay_ms",
            "must not be smaller than base_delay_ms",
        ));
    }
    if !(0.0..=1.0).contains(&summarizer.jitter_ratio) {
        errors.push(ValidationError::new("summarizer.jitter_ratio", "must be within 0.0..=1.0"));
    }
    if !(0.0..=2.0).contains(&summarizer.temperature) {
        errors.push(ValidationError::new("summarizer.temperature", "must be within 0.0..=2.0"));
    }
    if !(0.0..=1.0).contains(&summarizer.top_p) {
        errors.push(ValidationError::new("summarizer.top_p", "must be within 0.0..=1.0"));
    }

    match config.auth.provider {
        AuthProvider::IdentityToolkit => {
            if url::Url::parse(&config.auth.lookup_url).is_err() {
                errors.push(ValidationError::new(
                    "auth.lookup_url",
                    format!("'{}' is not a valid URL", config.auth.lookup_url),
                ));
            }
            if config.auth.api_key.as_deref().map_or(true, str::is_empty) {
                errors.push(ValidationError::new(
                    "auth.api_key",
                    "required when provider is identity_toolkit",
                ));
            }
        }
        AuthProvider::Static => {
            if config.auth.static_tokens.is_empty() {
                errors.push(ValidationError::new(
                    "auth.static_tokens",
                    "at least one token is required when provider is static",
                ));
            }
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
