//! Generative Language REST Client
//!
//! HTTP client for the `generateContent` endpoint of the Gemini API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::assistant::{AssistantError, ChatRole, Content, LanguageModel};

/// Configuration for the generative-language client
#[derive(Debug, Clone)]
pub struct GenerativeConfig {
    /// Base URL, e.g. "https://generativelanguage.googleapis.com"
    pub base_url: String,
    /// Model name
    pub model: String,
    /// API key sent in the `x-goog-api-key` header
    pub api_key: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum attempts per request
    pub max_retries: u32,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key: String::new(),
            request_timeout_ms: 20_000,
            max_retries: 2,
        }
    }
}

pub struct GenerativeClient {
    client: Client,
    config: GenerativeConfig,
}

impl GenerativeClient {
    pub fn new(config: GenerativeConfig) -> Result<Self, AssistantError> {
        if config.api_key.trim().is_empty() {
            return Err(AssistantError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(AssistantError::Request)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GenerativeConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// POST with retry on rate limiting and transport errors
    async fn send(&self, body: &GenerateRequest<'_>) -> Result<GenerateResponse, AssistantError> {
        let url = self.endpoint();
        let mut last_error = AssistantError::Unavailable;

        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                // Backoff: 1s, 4s, 9s...
                let delay = std::time::Duration::from_secs((attempt as u64).pow(2));
                tokio::time::sleep(delay).await;
            }

            let result = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.config.api_key)
                .json(body)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    return response.json().await.map_err(AssistantError::Request);
                }
                Ok(response) if response.status().as_u16() == 429 => {
                    last_error = AssistantError::RateLimited;
                    continue;
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    return Err(AssistantError::Status {
                        status: status.as_u16(),
                        message: text,
                    });
                }
                Err(e) => {
                    last_error = if e.is_timeout() {
                        AssistantError::Timeout
                    } else if e.is_connect() {
                        AssistantError::Unavailable
                    } else {
                        AssistantError::Request(e)
                    };
                    continue;
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl LanguageModel for GenerativeClient {
    async fn generate(&self, contents: &[Content]) -> Result<String, AssistantError> {
        let body = GenerateRequest {
            contents: contents.iter().map(WireContent::from).collect(),
        };

        let response = self.send(&body).await?;
        Ok(response.text())
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<WireContent<'a>>,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    role: ChatRole,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
struct WirePart<'a> {
    text: &'a str,
}

impl<'a> From<&'a Content> for WireContent<'a> {
    fn from(content: &'a Content) -> Self {
        Self {
            role: content.role,
            parts: vec![WirePart {
                text: &content.text,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate; empty if there is none
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GenerativeConfig::default();
        assert_eq!(config.model, "gemini-3-flash-preview");
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_missing_api_key() {
        let result = GenerativeClient::new(GenerativeConfig::default());
        assert!(matches!(result, Err(AssistantError::MissingApiKey)));
    }

    #[test]
    fn test_endpoint() {
        let client = GenerativeClient::new(GenerativeConfig {
            base_url: "http://localhost:9999/".to_string(),
            api_key: "k".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn test_request_serialization() {
        let contents = vec![Content::user("hello"), Content::model("hi")];
        let body = GenerateRequest {
            contents: contents.iter().map(WireContent::from).collect(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_response_text() {
        let json = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Thai tea "},{"text":"is 45 baht"}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), "Thai tea is 45 baht");

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_status_error_message() {
        let err = AssistantError::Status {
            status: 403,
            message: "API key not valid".to_string(),
        };
        assert_eq!(err.to_string(), "API error 403: API key not valid");
    }
}
