//! Generative-model provider abstraction.
//!
//! Handlers talk to a [`TextProvider`] so the Gemini backend can be swapped
//! for the mock in tests.

pub mod gemini;
pub mod mock;

use crate::models::{ContentEnvelope, Part};
use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Error reported by the model API itself; the message is its own.
    #[error("{0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response from model API: {0}")]
    InvalidResponse(String),

    #[error("Model returned no candidates")]
    EmptyResponse,
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Upstream(err.to_string())
    }
}

/// What to send to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationInput {
    /// Bare prompt, passed through as given (possibly absent).
    Prompt(Option<String>),

    /// A fully assembled user turn.
    Envelope(ContentEnvelope),
}

impl GenerationInput {
    /// The `contents` list for a `generateContent` call.
    pub fn into_contents(self) -> Vec<ContentEnvelope> {
        match self {
            GenerationInput::Prompt(prompt) => {
                let parts = prompt
                    .map(|text| vec![Part::Text { text }])
                    .unwrap_or_default();
                vec![ContentEnvelope::user(parts)]
            }
            GenerationInput::Envelope(envelope) => vec![envelope],
        }
    }
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Other,
}

/// Result of a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Generated text; empty when the model produced none.
    pub text: String,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    pub finish_reason: FinishReason,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Model identifier every call is made against.
    fn model(&self) -> &str;

    /// Generate a response. No retries; errors are returned as produced.
    async fn generate(&self, input: GenerationInput) -> Result<ProviderResponse, ProviderError>;
}
