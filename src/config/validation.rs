//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and formats.
//! `validate_config` is a pure function that reports every problem,
//! not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::render::HexColor;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field}: {value} is outside 1..={max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("{field}: '{value}' is not a hex color")]
    InvalidColor { field: &'static str, value: String },
}

/// Check a configuration, collecting all problems.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        &mut errors,
        "listener.bind_address",
        &config.listener.bind_address,
    );
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }
    if config.limits.max_size == 0 {
        errors.push(ValidationError::Zero("limits.max_size"));
    }

    let defaults = &config.defaults;
    if defaults.size == 0 || defaults.size > config.limits.max_size {
        errors.push(ValidationError::OutOfRange {
            field: "defaults.size",
            value: defaults.size,
            max: config.limits.max_size,
        });
    }
    if defaults.margin > config.limits.max_margin {
        errors.push(ValidationError::OutOfRange {
            field: "defaults.margin",
            value: defaults.margin,
            max: config.limits.max_margin,
        });
    }

    check_color(&mut errors, "defaults.color", &defaults.color);
    check_color(&mut errors, "defaults.background", &defaults.background);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_color(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<HexColor>().is_err() {
        errors.push(ValidationError::InvalidColor {
            field,
            value: value.to_string(),
        });
    }
}
