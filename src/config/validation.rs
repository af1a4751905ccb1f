//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the CORS origin and upstream URL are well-formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic violation found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    InvalidMetricsAddress(String),

    #[error("cors.allowed_origin '{0}' must be '*' or a bare http(s) origin")]
    InvalidAllowedOrigin(String),

    #[error("upstream.base_url '{0}' is not a valid http(s) URL")]
    InvalidBaseUrl(String),

    #[error("upstream.model must not be empty")]
    EmptyModel,

    #[error("upstream.api_key_env must not be empty")]
    EmptyApiKeyEnv,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if !is_valid_origin(&config.cors.allowed_origin) {
        errors.push(ValidationError::InvalidAllowedOrigin(
            config.cors.allowed_origin.clone(),
        ));
    }

    if !is_http_url(&config.upstream.base_url) {
        errors.push(ValidationError::InvalidBaseUrl(
            config.upstream.base_url.clone(),
        ));
    }

    if config.upstream.model.trim().is_empty() {
        errors.push(ValidationError::EmptyModel);
    }

    if config.upstream.api_key_env.trim().is_empty() {
        errors.push(ValidationError::EmptyApiKeyEnv);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// An origin is "*" or scheme://host[:port] with nothing after the authority.
/// Browsers compare `Access-Control-Allow-Origin` byte-for-byte against the
/// request's `Origin` header, so a trailing slash or path would never match.
fn is_valid_origin(origin: &str) -> bool {
    if origin == "*" {
        return true;
    }
    match Url::parse(origin) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.origin().ascii_serialization() == origin
        }
        Err(_) => false,
    }
}

fn is_http_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
