//! Request identity.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Stamp the ID on the request, its extensions, and the response
//! - Give handlers a typed accessor for log correlation
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An inbound x-request-id is honored, not replaced

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::http::{HeaderValue, Request, Response};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request ID on both request and response.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Identity assigned to one request, readable as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Typed access to the request ID from a request.
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("unknown")
    }
}

/// Tower layer installing [`RequestIdService`].
#[derive(Debug, Clone, Copy)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), S::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        let header_value = match request.headers().get(X_REQUEST_ID) {
            Some(value) => value.clone(),
            None => {
                let generated = Uuid::new_v4().to_string();
                // A hyphenated UUID is always a valid header value.
                HeaderValue::from_str(&generated)
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
            }
        };

        let id = header_value.to_str().unwrap_or("unknown").to_string();
        request
            .headers_mut()
            .insert(X_REQUEST_ID, header_value.clone());
        request.extensions_mut().insert(RequestId(id));

        let future = self.inner.call(request);
        Box::pin(async move {
            let mut response = future.await?;
            response.headers_mut().insert(X_REQUEST_ID, header_value);
            Ok(response)
        })
    }
}
