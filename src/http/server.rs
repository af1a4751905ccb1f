//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy and health handlers
//! - Wire up middleware (tracing, CORS, request ID, timeout)
//! - Validate inbound generation requests
//! - Forward prompts to the upstream Gemini client
//! - Map every failure mode onto the wire contract
//! - Observability (metrics, correlation IDs)

use std::future::Future;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::schema::{GatewayConfig, LimitsConfig};
use crate::http::cors::{cors_middleware, origin_header_value};
use crate::http::error::ApiError;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::http::response::GeneratedText;
use crate::observability::metrics;
use crate::upstream::{ApiKeyProvider, GeminiClient, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub allowed_origin: HeaderValue,
    pub gemini: GeminiClient,
    pub keys: ApiKeyProvider,
    pub limits: LimitsConfig,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let gemini = GeminiClient::new(
            &config.upstream,
            Duration::from_secs(config.timeouts.upstream_secs),
        )?;

        Ok(Self {
            allowed_origin: origin_header_value(&config.cors.allowed_origin),
            gemini,
            keys: ApiKeyProvider::new(
                config.upstream.api_key.clone(),
                config.upstream.api_key_env.clone(),
            ),
            limits: config.limits.clone(),
        })
    }
}

/// HTTP server for the prompt gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Later layers wrap earlier ones; the CORS middleware must stay outside
    /// the timeout so responses synthesized by the timeout layer carry the
    /// policy headers too.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_check).fallback(method_not_allowed))
            .route("/{*path}", any(generate_handler))
            .route("/", any(generate_handler))
            .with_state(state.clone())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(middleware::from_fn_with_state(state, cors_middleware))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown future resolves.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Main generation handler.
/// Validates the request, calls upstream, and maps errors onto responses.
async fn generate_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().to_string();
    let method_str = request.method().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method_str,
        path = %request.uri().path(),
        peer = %addr,
        "Handling generation request"
    );

    let response = match generate(&state, request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    };

    metrics::record_request(&method_str, response.status().as_u16(), start_time);

    tracing::debug!(
        request_id = %request_id,
        status = response.status().as_u16(),
        "Request complete"
    );
    response
}

/// The request pipeline proper. Every early exit is an [`ApiError`], so the
/// conversion to a wire response happens in exactly one place.
async fn generate(state: &AppState, request: Request<Body>) -> Result<Response, ApiError> {
    // 1. Method gate. The CORS middleware already answered OPTIONS.
    if request.method() != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }

    // 2. Resolve the API key before touching the body.
    let api_key = state.keys.resolve().ok_or(ApiError::MissingApiKey)?;

    // 3. Buffer and parse the body, bounded by the configured limit.
    let body_bytes = axum::body::to_bytes(request.into_body(), state.limits.max_body_bytes)
        .await
        .map_err(|_| ApiError::BodyTooLarge)?;
    let body: Value = serde_json::from_slice(&body_bytes).map_err(|_| ApiError::InvalidJson)?;

    // 4. Extract the prompt. Absent, non-string, and empty all count as missing.
    let prompt = body
        .get("prompt")
        .and_then(Value::as_str)
        .filter(|prompt| !prompt.is_empty())
        .ok_or(ApiError::MissingPrompt)?;

    // 5. One upstream call, no retries.
    let text = match state.gemini.generate(prompt, &api_key).await {
        Ok(text) => {
            metrics::record_upstream("ok");
            text
        }
        Err(err) => {
            metrics::record_upstream(upstream_outcome(&err));
            return Err(err.into());
        }
    };

    // 6. Success body.
    Ok((
        StatusCode::OK,
        Json(GeneratedText {
            generated_text: text,
        }),
    )
        .into_response())
}

fn upstream_outcome(err: &UpstreamError) -> &'static str {
    match err {
        UpstreamError::Timeout => "timeout",
        UpstreamError::Transport(_) => "transport",
        UpstreamError::Status { .. } => "status",
    }
}

/// Method fallback for `/health`: same 405 wire shape as every other route.
async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Liveness probe.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
