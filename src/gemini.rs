//! Generative backend seam and its Gemini implementation
//!
//! The assistant only ever talks to [`GenerativeBackend`]; any failure it
//! reports is turned into the deterministic answer by the caller. The Gemini
//! client keeps one long-lived reqwest::Client for connection pooling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::error::BackendError;
use crate::memory::{ContextMessage, MessageRole};

pub const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// A text generator that may fail in any of the [`BackendError`] ways
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    fn name(&self) -> &str;

    /// `prompt` is the system instruction; `context` ends with the user's question
    async fn generate(
        &self,
        prompt: &str,
        context: &[ContextMessage],
        timeout: Duration,
    ) -> Result<String, BackendError>;
}

/// Gemini `generateContent` client
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_url(api_key, DEFAULT_GEMINI_URL)
    }

    pub fn with_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(BackendError::NotConfigured);
        }

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| BackendError::Http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        prompt: &str,
        context: &[ContextMessage],
        timeout: Duration,
    ) -> Result<String, BackendError> {
        let request = build_request(prompt, context);

        debug!(messages = context.len(), "Calling Gemini API");

        let response = self
            .client
            .post(self.base_url.as_str())
            .header("x-goog-api-key", self.api_key.as_str())
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                // Error text never carries the request URL
                let e = e.without_url();
                if e.is_timeout() {
                    BackendError::Timeout(timeout.as_millis() as u64)
                } else {
                    BackendError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Gemini API error response");
            return Err(classify_failure(status.as_u16(), &body));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| {
                BackendError::Malformed(format!("Gemini parse error: {}", e.without_url()))
            })?;

        extract_text(body)
    }
}

/// Map a non-success status and body to a backend error
pub fn classify_failure(status: u16, body: &str) -> BackendError {
    let lowered = body.to_lowercase();
    if lowered.contains("quota") {
        return BackendError::QuotaExceeded;
    }

    match status {
        429 => BackendError::RateLimited,
        500..=599 => BackendError::Unavailable(format!("status {}", status)),
        _ => BackendError::Http(format!("status {}", status)),
    }
}

fn build_request(prompt: &str, context: &[ContextMessage]) -> GeminiRequest {
    GeminiRequest {
        contents: context
            .iter()
            .map(|m| Content {
                role: Some(
                    match m.role {
                        MessageRole::User => "user",
                        MessageRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: m.content.clone(),
                }],
            })
            .collect(),
        generation_config: GenerationConfig {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 1024,
        },
        system_instruction: SystemInstruction {
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        },
    }
}

fn extract_text(response: GeminiResponse) -> Result<String, BackendError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .map(|p| p.text)
        .ok_or_else(|| BackendError::Malformed("no candidates in response".to_string()))?;

    if text.trim().is_empty() {
        return Err(BackendError::Malformed("empty candidate text".to_string()));
    }
    Ok(text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
