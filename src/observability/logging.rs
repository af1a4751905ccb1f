//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem once at startup
//! - Configure log level at runtime via RUST_LOG
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Crate-scoped default filter when RUST_LOG is unset

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when RUST_LOG is unset.
const DEFAULT_FILTER: &str = "prompt_proxy=debug,tower_http=debug";

/// Initialize the tracing subscriber. Must be called once, before anything
/// logs; a second call panics.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
