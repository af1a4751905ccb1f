//! Gemini upstream client.
//!
//! Issues the generateContent call for a validated prompt and pulls the
//! generated text out of the response.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::schema::UpstreamConfig;

/// Text substituted when a 200 response does not carry the expected
/// candidates/content/parts/text structure.
pub const PARSE_FALLBACK_TEXT: &str = "Sorry, failed to parse the AI response.";

/// Error from a single upstream generation call.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The call did not complete within the configured deadline.
    #[error("upstream request timed out")]
    Timeout,

    /// Transport failure before a status line was received.
    #[error("upstream transport error: {0}")]
    Transport(reqwest::Error),

    /// Upstream answered with a non-200 status.
    #[error("upstream returned status {status}")]
    Status { status: u16 },
}

/// Client for the Generative Language API.
///
/// Built once at startup and shared across requests; the inner reqwest
/// client pools connections and enforces the upstream deadline.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &UpstreamConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Endpoint without the key. The key is attached as a query parameter at
    /// send time so this string is always safe to log.
    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Send one prompt upstream and return the generated text.
    ///
    /// Non-200 statuses and transport failures are errors; a 200 with an
    /// unrecognizable body resolves to [`PARSE_FALLBACK_TEXT`].
    pub async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, UpstreamError> {
        let payload = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status.as_u16() != 200 {
            // Keep the upstream's own error text server-side; the client only
            // ever sees the status code.
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "Gemini API returned an error status"
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        let raw = response.text().await.map_err(classify_transport)?;
        Ok(extract_text(&raw))
    }
}

fn classify_transport(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        // without_url drops the request URL, and with it the key query
        // parameter, from anything that later hits a log line.
        UpstreamError::Transport(err.without_url())
    }
}

/// Extract `candidates[0].content.parts[0].text` from a raw 200 body.
///
/// Every segment is optional: a missing or misshapen level logs the payload
/// and yields the fallback text instead of failing the request.
fn extract_text(raw: &str) -> String {
    let parsed: GenerateContentResponse = match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::error!(error = %err, body = %raw, "Could not parse Gemini response as JSON");
            return PARSE_FALLBACK_TEXT.to_string();
        }
    };

    let text = parsed
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.first())
        .and_then(|part| part.text.clone());

    match text {
        Some(text) => text,
        None => {
            tracing::error!(body = %raw, "Could not parse Gemini response");
            PARSE_FALLBACK_TEXT.to_string()
        }
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}
