//! CORS policy middleware.
//!
//! The browser contract requires the CORS headers on every response the
//! gateway emits: successes, handler errors, and responses synthesized by
//! outer layers such as the request timeout. Hanging the policy on a
//! middleware that wraps the whole stack guarantees that. Preflight OPTIONS
//! requests are answered here and never reach the router.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;

/// Methods the gateway accepts, as advertised to browsers.
pub const ALLOW_METHODS: &str = "POST, OPTIONS";

/// Request headers the gateway accepts, as advertised to browsers.
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Preflight cache lifetime advertised to browsers.
pub const MAX_AGE_SECS: &str = "86400";

pub async fn cors_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // 1. Preflight short-circuits before routing.
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors(response.headers_mut(), &state.allowed_origin);
        response.headers_mut().insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(MAX_AGE_SECS),
        );
        return response;
    }

    // 2. Anything else: run the stack, stamp the policy on the way out.
    let mut response = next.run(request).await;
    apply_cors(response.headers_mut(), &state.allowed_origin);
    response
}

fn apply_cors(headers: &mut HeaderMap, origin: &HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

/// Parse the configured origin once, at state construction.
///
/// Config validation rejects malformed origins up front; this guards state
/// built from an unvalidated config and falls back to "*" rather than
/// refusing to serve.
pub fn origin_header_value(allowed_origin: &str) -> HeaderValue {
    match HeaderValue::from_str(allowed_origin) {
        Ok(value) => value,
        Err(_) => {
            tracing::error!(
                origin = %allowed_origin,
                "Configured origin is not a valid header value, falling back to '*'"
            );
            HeaderValue::from_static("*")
        }
    }
}
