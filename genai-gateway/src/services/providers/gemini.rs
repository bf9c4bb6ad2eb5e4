//! Gemini AI provider implementation.
//!
//! Calls `models/{model}:generateContent` on the Gemini REST API.

use super::{FinishReason, GenerationInput, ProviderError, ProviderResponse, TextProvider};
use crate::models::ContentEnvelope;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key. Keeps the key out of URLs, which end up in
/// error messages relayed to clients.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Build the API URL for the configured model and the given method.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method
        )
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, input: GenerationInput) -> Result<ProviderResponse, ProviderError> {
        let request = GenerateContentRequest {
            contents: input.into_contents(),
        };

        tracing::debug!(
            model = %self.config.model,
            part_count = request.contents.iter().map(|c| c.parts.len()).sum::<usize>(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url("generateContent"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status,
                api_error_message(&error_text)
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|p| !p.thought.unwrap_or(false))
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        let finish_reason = match candidate.finish_reason.as_deref() {
            Some("STOP") | None => FinishReason::Complete,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") => {
                FinishReason::ContentFilter
            }
            Some(_) => FinishReason::Other,
        };

        let usage = api_response.usage_metadata.unwrap_or_default();

        Ok(ProviderResponse {
            text,
            input_tokens: usage.prompt_token_count.unwrap_or(0),
            output_tokens: usage.candidates_token_count.unwrap_or(0),
            finish_reason,
        })
    }
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw
/// body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<ContentEnvelope>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

/// Only text is read back; other part kinds deserialize with `text: None`.
#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InlineMediaPart, Part};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-2.5-flash";

    fn provider(server: &MockServer) -> GeminiTextProvider {
        GeminiTextProvider::new(
            GeminiConfig {
                api_key: "test-key".to_string(),
                model: MODEL.to_string(),
                api_base: format!("{}/v1beta", server.uri()),
            },
            Client::new(),
        )
    }

    fn generate_path() -> &'static str {
        "/v1beta/models/gemini-2.5-flash:generateContent"
    }

    #[tokio::test]
    async fn sends_prompt_and_returns_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(generate_path()))
            .and(header(API_KEY_HEADER, "test-key"))
            .and(body_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Hello" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Hi there" }] },
                    "finishReason": "STOP"
                }],
                "usageMetadata": { "promptTokenCount": 2, "candidatesTokenCount": 3 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server)
            .generate(GenerationInput::Prompt(Some("Hello".to_string())))
            .await
            .unwrap();

        assert_eq!(response.text, "Hi there");
        assert_eq!(response.input_tokens, 2);
        assert_eq!(response.output_tokens, 3);
        assert_eq!(response.finish_reason, FinishReason::Complete);
    }

    #[tokio::test]
    async fn sends_envelope_with_inline_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(generate_path()))
            .and(body_json(json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "inlineData": { "mimeType": "image/jpeg", "data": "AAEC" } },
                        { "text": "What is it?" }
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "A cat" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let envelope = ContentEnvelope::user(vec![
            Part::InlineData {
                inline_data: InlineMediaPart::jpeg("AAEC".to_string()),
            },
            Part::Text {
                text: "What is it?".to_string(),
            },
        ]);

        let response = provider(&server)
            .generate(GenerationInput::Envelope(envelope))
            .await
            .unwrap();

        assert_eq!(response.text, "A cat");
    }

    #[tokio::test]
    async fn joins_text_parts_and_skips_thoughts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "Hello, " },
                        { "text": "world" }
                    ] },
                    "finishReason": "MAX_TOKENS"
                }]
            })))
            .mount(&server)
            .await;

        let response = provider(&server)
            .generate(GenerationInput::Prompt(Some("hi".to_string())))
            .await
            .unwrap();

        assert_eq!(response.text, "Hello, world");
        assert_eq!(response.finish_reason, FinishReason::Length);
    }

    #[tokio::test]
    async fn api_error_message_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(GenerationInput::Prompt(Some("hi".to_string())))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Gemini API error 400 Bad Request: API key not valid. Please pass a valid API key."
        );
    }

    #[tokio::test]
    async fn non_json_error_body_is_passed_through() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(GenerationInput::Prompt(None))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ProviderError::ApiError("Gemini API error 503 Service Unavailable: overloaded".into())
        );
    }

    #[tokio::test]
    async fn no_candidates_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .generate(GenerationInput::Prompt(Some("hi".to_string())))
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::EmptyResponse);
    }

    #[tokio::test]
    async fn unreachable_api_is_network_error() {
        let provider = GeminiTextProvider::new(
            GeminiConfig {
                api_key: "k".to_string(),
                model: MODEL.to_string(),
                api_base: "http://127.0.0.1:1".to_string(),
            },
            Client::new(),
        );

        let err = provider
            .generate(GenerationInput::Prompt(Some("hi".to_string())))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::NetworkError(_)));
    }
}
