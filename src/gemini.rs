//! Gemini `generateContent` client, used both to restyle tutor questions and
//! to turn raw worksheet text into a list of problems.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::error::ServiceError;
use crate::tutor::Phraser;
use crate::worksheet::{ProblemSet, ProblemStructurer};
use crate::STRUCTURE_PROMPT;

const SERVICE: &str = "Gemini";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: &str, model: &str, timeout: Duration) -> Self {
        debug!(model, api_key_len = api_key.len(), "Creating Gemini client");
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        }
    }

    /// Single-turn completion; returns the first candidate's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .timeout(self.timeout)
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout(SERVICE)
                } else {
                    ServiceError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.to_lowercase().contains("quota exceeded") {
                return Err(ServiceError::QuotaExceeded);
            }
            error!(%status, "Gemini request failed");
            return Err(ServiceError::Status { service: SERVICE, status, body });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .first_text()
            .filter(|text| !text.trim().is_empty())
            .ok_or(ServiceError::Empty(SERVICE))
    }
}

/// Drops markdown code fences the model likes to wrap JSON in.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

#[async_trait]
impl Phraser for GeminiClient {
    async fn restyle(&self, prompt: &str) -> Result<String, ServiceError> {
        self.generate(prompt).await
    }
}

#[async_trait]
impl ProblemStructurer for GeminiClient {
    async fn structure_problems(&self, raw_text: &str) -> Result<ProblemSet, ServiceError> {
        let prompt = STRUCTURE_PROMPT.replace("{text}", raw_text);
        let text = self.generate(&prompt).await?;
        Ok(serde_json::from_str(&strip_code_fences(&text))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_removed() {
        assert_eq!(
            strip_code_fences("```json\n{\"problems\":[]}\n```"),
            "{\"problems\":[]}"
        );
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn first_candidate_text() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hi?"}]}},{"content":{"parts":[{"text":"no"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.first_text().as_deref(), Some("Hi?"));

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.first_text(), None);
    }

    #[test]
    fn debug_hides_key() {
        let client = GeminiClient::new("sk-test".into(), "http://x/", "m", Duration::from_secs(1));
        let shown = format!("{client:?}");
        assert!(!shown.contains("sk-test"));
        assert!(shown.contains("http://x"));
    }
}
