//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals and timeouts > 0, queue capacity > 0)
//! - Check the tracking endpoint is a usable URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LoggerConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::LoggerConfig;
use crate::logger::rotation::RotationMode;

/// A single semantic problem with a config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("prefix must not be empty")]
    EmptyPrefix,

    #[error("prefix '{0}' must not contain path separators")]
    PrefixHasSeparator(String),

    #[error("max_size_kb must be greater than zero for size rotation")]
    ZeroMaxSize,

    #[error("tick_interval_ms must be greater than zero")]
    ZeroTickInterval,

    #[error("tracking.timeout_secs must be greater than zero")]
    ZeroTrackingTimeout,

    #[error("tracking.queue_capacity must be greater than zero")]
    ZeroQueueCapacity,

    #[error("tracking.url '{0}' is not a valid URL")]
    InvalidTrackingUrl(String),
}

/// Check a config for semantic errors.
pub fn validate_config(config: &LoggerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.prefix.is_empty() {
        errors.push(ValidationError::EmptyPrefix);
    } else if config.prefix.contains(&['/', '\\'][..]) {
        errors.push(ValidationError::PrefixHasSeparator(config.prefix.clone()));
    }

    if config.rotation == RotationMode::Size && config.max_size_kb == 0 {
        errors.push(ValidationError::ZeroMaxSize);
    }

    if config.tick_interval_ms == 0 {
        errors.push(ValidationError::ZeroTickInterval);
    }

    if config.tracking.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTrackingTimeout);
    }

    if config.tracking.queue_capacity == 0 {
        errors.push(ValidationError::ZeroQueueCapacity);
    }

    if Url::parse(&config.tracking.url).is_err() {
        errors.push(ValidationError::InvalidTrackingUrl(config.tracking.url.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
