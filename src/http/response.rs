//! Response body shapes.
//!
//! # Responsibilities
//! - Define the two JSON bodies the gateway ever returns
//! - Keep field naming aligned with the browser client (camelCase)
//!
//! # Design Decisions
//! - Success and error bodies are disjoint: a response carries
//!   `generatedText` or `error`, never both

use serde::{Deserialize, Serialize};

/// Success body: `{"generatedText": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedText {
    pub generated_text: String,
}

/// Failure body: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
