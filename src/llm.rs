//! Generative-language service adapter
//!
//! A narrow request/response boundary: the full ordered transcript goes
//! out, the assistant's next turn comes back. One attempt per call; no
//! retry, no batching.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::conversation::Turn;
use crate::session::credential_header_value;
use crate::{Error, Result};

/// Base URL for the generative-language API
const GENERATION_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Generates the assistant's next turn from the conversation so far
#[async_trait(?Send)]
pub trait Generator {
    /// Produce the next assistant reply for the given ordered history
    ///
    /// The history must end with the user turn being answered.
    ///
    /// # Errors
    ///
    /// Returns `Generation` on any service failure
    async fn generate(&self, credential: &SecretString, history: &[Turn]) -> Result<String>;
}

/// Request content entry: one conversation turn
#[derive(serde::Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(serde::Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(serde::Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(serde::Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Gemini `generateContent` client
pub struct Gemini {
    client: reqwest::Client,
    model: String,
}

impl Gemini {
    /// Create a client for a fixed model identifier
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            model: model.into(),
        }
    }

    /// The configured model identifier
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait(?Send)]
impl Generator for Gemini {
    async fn generate(&self, credential: &SecretString, history: &[Turn]) -> Result<String> {
        tracing::debug!(turns = history.len(), model = %self.model, "starting generation");

        let request = GenerateRequest {
            contents: history
                .iter()
                .map(|turn| Content {
                    role: turn.role.wire_name(),
                    parts: vec![Part { text: &turn.text }],
                })
                .collect(),
        };

        let url = format!("{GENERATION_API_BASE}/{}:generateContent", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", credential_header_value(credential))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "generation request failed");
                e
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "generation API error");
            return Err(Error::Generation(format!(
                "generation API error {status}: {body}"
            )));
        }

        let result: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse generation response");
            e
        })?;

        let text = result
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::Generation("empty generation response".to_string()));
        }

        tracing::info!(reply_len = text.len(), "generation complete");
        Ok(text)
    }
}
