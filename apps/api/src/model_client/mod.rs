//! Gemini client — the single point of outbound model calls in FitScan.
//!
//! ARCHITECTURAL RULE: no other module may call the Gemini API directly.
//! One attempt per client request, no automatic retry: retry policy belongs
//! to the caller, and the call has no side effects to undo.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

/// The model used for all analysis calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.0-flash";

const CALL_TIMEOUT: Duration = Duration::from_secs(25);

#[derive(Debug, Error)]
pub enum ModelError {
    /// Downstream congestion (HTTP 429 from the model endpoint), distinct
    /// from this service's own admission throttling. Retryable-later.
    #[error("model endpoint overloaded")]
    Overloaded,

    #[error("model endpoint returned status {status}")]
    Upstream { status: u16 },

    #[error("model call timed out after {}s", CALL_TIMEOUT.as_secs())]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("response envelope decode failure: {0}")]
    Decode(#[source] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Request wire format
// ---------------------------------------------------------------------------

/// The assembled `generateContent` request body. Immutable once built.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelPayload {
    pub contents: Vec<Content>,
    pub system_instruction: SystemInstruction,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub response_mime_type: &'static str,
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

/// The raw response structure. Never trusted: every field is optional and
/// every access goes through a defensive accessor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEnvelope {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl ModelEnvelope {
    /// Text of the first part of the first candidate, if the envelope
    /// carries one at all.
    pub fn candidate_text(&self) -> Option<&str> {
        self.candidates
            .as_deref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_deref()?
            .first()?
            .text
            .as_deref()
    }

    /// Safety-block indicator, when the prompt was refused outright.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Thin wrapper around the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(CALL_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{MODEL}:generateContent"
            ),
        }
    }

    /// Issues the single outbound call, attaching the caller's credential as
    /// a query parameter. Classifies failures by HTTP status; upstream
    /// diagnostic bodies are logged server-side and never surfaced.
    pub async fn invoke(
        &self,
        payload: &ModelPayload,
        credential: &str,
    ) -> Result<ModelEnvelope, ModelError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", credential)])
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout
                } else {
                    // Strip the URL from the error: it carries the key
                    // query parameter, which must never reach logs.
                    ModelError::Transport(e.without_url())
                }
            })?;

        let status = response.status();

        if status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            warn!("model endpoint overloaded: {body}");
            return Err(ModelError::Overloaded);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("model endpoint returned {status}: {body}");
            return Err(ModelError::Upstream {
                status: status.as_u16(),
            });
        }

        debug!("model call succeeded with status {status}");

        response.json::<ModelEnvelope>().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout
            } else {
                ModelError::Decode(e.without_url())
            }
        })
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> ModelEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_candidate_text_happy_path() {
        let env = envelope(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"score\": 80}"}]}}]}"#,
        );
        assert_eq!(env.candidate_text(), Some("{\"score\": 80}"));
    }

    #[test]
    fn test_candidate_text_missing_candidates() {
        assert_eq!(envelope("{}").candidate_text(), None);
    }

    #[test]
    fn test_candidate_text_empty_candidate_list() {
        assert_eq!(envelope(r#"{"candidates": []}"#).candidate_text(), None);
    }

    #[test]
    fn test_candidate_text_candidate_without_content() {
        assert_eq!(
            envelope(r#"{"candidates": [{}]}"#).candidate_text(),
            None
        );
    }

    #[test]
    fn test_candidate_text_content_without_parts() {
        assert_eq!(
            envelope(r#"{"candidates": [{"content": {}}]}"#).candidate_text(),
            None
        );
    }

    #[test]
    fn test_block_reason_surfaces() {
        let env = envelope(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        assert_eq!(env.block_reason(), Some("SAFETY"));
        assert_eq!(env.candidate_text(), None);
    }

    #[test]
    fn test_unknown_envelope_fields_are_ignored() {
        let env = envelope(r#"{"usageMetadata": {"totalTokenCount": 10}}"#);
        assert_eq!(env.candidate_text(), None);
        assert_eq!(env.block_reason(), None);
    }
}
