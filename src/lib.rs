//! CORS-enforcing prompt gateway for the Gemini API.
//!
//! A single-endpoint HTTP proxy: browsers POST `{"prompt": "..."}`, the
//! gateway forwards the prompt to the Generative Language API with a
//! server-side key, and relays `{"generatedText": "..."}` back with the
//! configured CORS policy on every response.

pub mod config;
pub mod http;
pub mod observability;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
