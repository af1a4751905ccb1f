//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Browser request
//!     → server.rs (Axum setup, trace + request ID layers)
//!     → cors.rs (preflight short-circuit; policy headers on every response)
//!     → server.rs generate pipeline (method gate, key, body, prompt)
//!     → upstream client (generateContent)
//!     → response.rs body shapes / error.rs wire mapping
//!     → Send to client
//! ```

pub mod cors;
pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{shutdown_signal, AppState, HttpServer};
