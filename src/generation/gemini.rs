//! Gemini `generateContent` backend
//!
//! Only one response shape is accepted: the text of the first part of the
//! first candidate. Anything else is reported as a generation failure.

use super::TextGenerator;
use crate::config::GenerationConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Gemini REST client
pub struct GeminiGenerator {
    config: GenerationConfig,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extract the generated text from a raw response body
fn extract_text(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| Error::Generation(format!("Unexpected Gemini response: {}", e)))?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| Error::Generation("Gemini response contained no text".to_string()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(Error::Generation("Gemini returned empty text".to_string()));
    }
    Ok(text.to_string())
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self.config.resolve_api_key()?;

        let payload = GenerateRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Generation(format!("Failed to read Gemini response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.clone());
            tracing::warn!(status = %status, model = %self.config.model, "Gemini API error");
            return Err(Error::Generation(format!(
                "Gemini API error (HTTP {}): {}",
                status, message
            )));
        }

        extract_text(&body)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
