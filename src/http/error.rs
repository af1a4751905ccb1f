//! Request error taxonomy and wire mapping.
//!
//! Every failure a request can hit is a variant here, and the conversion to
//! an HTTP response happens exactly once, in [`IntoResponse`]. Client-caused
//! failures get specific messages; server-side detail stays in the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::http::response::ErrorBody;
use crate::upstream::UpstreamError;

/// Failure modes of one gateway request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The proxy endpoint only accepts POST (OPTIONS is short-circuited
    /// earlier by the CORS middleware).
    #[error("expected POST request")]
    MethodNotAllowed,

    /// Body exceeded `limits.max_body_bytes`.
    #[error("request body too large")]
    BodyTooLarge,

    /// Body was not valid JSON.
    #[error("invalid JSON in request body")]
    InvalidJson,

    /// `prompt` was absent, not a string, or empty.
    #[error("missing prompt in request body")]
    MissingPrompt,

    /// No API key in config or environment.
    #[error("API key not configured")]
    MissingApiKey,

    /// Upstream answered with a non-200 status, passed through to the client.
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    /// Upstream deadline expired.
    #[error("upstream request timed out")]
    UpstreamTimeout,

    /// Anything else. The detail is logged, never echoed to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Timeout => ApiError::UpstreamTimeout,
            UpstreamError::Status { status } => ApiError::UpstreamStatus(status),
            UpstreamError::Transport(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Expected POST request".to_string(),
            ),
            ApiError::BodyTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            ),
            ApiError::InvalidJson => (
                StatusCode::BAD_REQUEST,
                "Invalid JSON in request body".to_string(),
            ),
            ApiError::MissingPrompt => (
                StatusCode::BAD_REQUEST,
                "Missing 'prompt' in request body".to_string(),
            ),
            ApiError::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "API key not configured".to_string(),
            ),
            ApiError::UpstreamStatus(code) => (
                StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY),
                format!("Error from Gemini API: Status {}", code),
            ),
            ApiError::UpstreamTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "Upstream request timed out".to_string(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn rendered(err: ApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn method_not_allowed_wire_shape() {
        let (status, body) = rendered(ApiError::MethodNotAllowed).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, r#"{"error":"Expected POST request"}"#);
    }

    #[tokio::test]
    async fn upstream_status_passes_through() {
        let (status, body) = rendered(ApiError::UpstreamStatus(429)).await;
        assert_eq!(status.as_u16(), 429);
        assert_eq!(body, r#"{"error":"Error from Gemini API: Status 429"}"#);
    }

    #[tokio::test]
    async fn internal_error_is_generic() {
        let (status, body) = rendered(ApiError::Internal(
            "connection refused (os error 111)".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"Internal Server Error"}"#);
        assert!(!body.contains("refused"));
    }

    #[tokio::test]
    async fn timeout_is_gateway_timeout() {
        let (status, _) = rendered(ApiError::UpstreamTimeout).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn missing_key_is_500_with_fixed_message() {
        let (status, body) = rendered(ApiError::MissingApiKey).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"API key not configured"}"#);
    }
}
