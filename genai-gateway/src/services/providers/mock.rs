//! Mock provider implementation for testing.

use super::{FinishReason, GenerationInput, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// Mock text provider that answers with a canned outcome and records every
/// input it receives.
pub struct MockTextProvider {
    reply: Result<String, ProviderError>,
    calls: Mutex<Vec<GenerationInput>>,
}

impl MockTextProvider {
    /// Always succeed with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(ProviderError::ApiError(message.into())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Inputs received so far, oldest first.
    pub fn calls(&self) -> Vec<GenerationInput> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, input: GenerationInput) -> Result<ProviderResponse, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(input);

        let text = self.reply.clone()?;

        Ok(ProviderResponse {
            output_tokens: text.len() as i32 / 4,
            text,
            input_tokens: 0,
            finish_reason: FinishReason::Complete,
        })
    }
}
