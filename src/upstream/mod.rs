//! Upstream Generative Language API subsystem.
//!
//! # Data Flow
//! ```text
//! validated prompt
//!     → key.rs (resolve API key: inline config, then environment)
//!     → gemini.rs (build payload, POST generateContent, bounded by timeout)
//!     → extract candidates[0].content.parts[0].text
//!     → generated text (or the parse fallback string)
//! ```
//!
//! # Design Decisions
//! - One outbound call per gateway request; no retries
//! - The key travels only as a query parameter on the outbound call and is
//!   stripped from any retained error, so it cannot reach a log line
//! - A 200 with an unexpected body is not an error: the fallback text is
//!   substituted and the gateway request still succeeds

pub mod gemini;
pub mod key;

pub use gemini::{GeminiClient, UpstreamError, PARSE_FALLBACK_TEXT};
pub use key::ApiKeyProvider;
