//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::handler::OutputFormat;
use crate::render::ErrorCorrection;

/// Root configuration for the QR service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Values used when a request omits a parameter.
    pub defaults: QrDefaults,

    /// Upper bounds applied to caller-supplied render options.
    pub limits: RenderLimits,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Defaults for omitted request parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QrDefaults {
    /// Target image width in pixels.
    pub size: u32,

    /// Quiet zone width in modules.
    pub margin: u32,

    pub error_correction_level: ErrorCorrection,

    /// Dark module color (hex).
    pub color: String,

    /// Light module color (hex).
    pub background: String,

    pub format: OutputFormat,
}

impl Default for QrDefaults {
    fn default() -> Self {
        Self {
            size: 300,
            margin: 1,
            error_correction_level: ErrorCorrection::M,
            color: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
            format: OutputFormat::Base64,
        }
    }
}

/// Caps on caller-supplied render options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderLimits {
    /// Largest accepted `size`; larger values are clamped.
    pub max_size: u32,

    /// Largest accepted `margin`; larger values are clamped.
    pub max_margin: u32,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_size: 4096,
            max_margin: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServiceConfig = toml::from_str(
            r##"
            [listener]
            bind_address = "127.0.0.1:3000"

            [defaults]
            format = "svg"
            color = "#112233"
            "##,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.defaults.format, OutputFormat::Svg);
        assert_eq!(config.defaults.color, "#112233");
        assert_eq!(config.defaults.size, 300);
        assert_eq!(config.defaults.error_correction_level, ErrorCorrection::M);
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_unknown_format_rejected_by_serde() {
        let result: Result<ServiceConfig, _> = toml::from_str(
            r#"
            [defaults]
            format = "gif"
            "#,
        );
        assert!(result.is_err());
    }
}
