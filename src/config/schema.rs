//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every section has defaults so an empty (or absent) file yields a working
//! development configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the prompt gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// CORS policy applied to every response.
    pub cors: CorsConfig,

    /// Upstream Generative Language API settings.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
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

/// CORS policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origin allowed to call the gateway (e.g., "https://example.github.io").
    /// "*" permits any origin and is the development default.
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
        }
    }
}

/// Upstream Generative Language API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the Generative Language API.
    pub base_url: String,

    /// Model identifier appended to the base URL (e.g., "gemini-pro").
    pub model: String,

    /// Inline API key. Takes precedence over the environment variable when
    /// set; intended for test harnesses, not production files.
    pub api_key: Option<String>,

    /// Environment variable consulted for the API key when no inline key
    /// is configured.
    pub api_key_env: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-pro".to_string(),
            api_key: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Deadline for the upstream generateContent call in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 10,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024, // 1 MiB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.cors.allowed_origin, "*");
        assert_eq!(config.upstream.model, "gemini-pro");
        assert_eq!(config.upstream.api_key_env, "GEMINI_API_KEY");
        assert!(config.upstream.api_key.is_none());
        assert_eq!(config.timeouts.upstream_secs, 10);
        assert_eq!(config.limits.max_body_bytes, 1024 * 1024);
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn partial_section_keeps_sibling_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [upstream]
            model = "gemini-1.5-flash"
            "#,
        )
        .unwrap();
        assert_eq!(config.upstream.model, "gemini-1.5-flash");
        assert_eq!(
            config.upstream.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
