mod client;

use std::time::Duration;

use crate::error::{AiError, Result};
use crate::types::{ChatRequest, WireMessage};

use client::HuggingFaceClient;

// =============================================================================
// Hugging Face router
// =============================================================================

/// Chat completions through the Hugging Face inference router.
///
/// The router speaks the OpenAI wire format and relays to a third-party
/// provider chosen by suffixing the model id: `model:provider`.
#[derive(Clone)]
pub struct HuggingFace {
    token: String,
    model: String,
    provider: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HuggingFace {
    pub fn new(token: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            model: model.into(),
            provider: None,
            base_url: None,
            timeout: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Per-request deadline enforced by the HTTP client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Model id as sent on the wire, including the provider suffix.
    pub fn routed_model(&self) -> String {
        match self.provider.as_deref() {
            Some(provider) if !provider.is_empty() => format!("{}:{}", self.model, provider),
            _ => self.model.clone(),
        }
    }

    fn client(&self) -> Result<HuggingFaceClient> {
        let client = HuggingFaceClient::new(&self.token, self.timeout)?;
        Ok(match self.base_url {
            Some(ref url) => client.with_base_url(url),
            None => client,
        })
    }

    /// Single-turn multimodal completion: one instruction, one image URL.
    pub async fn complete_with_image(
        &self,
        instruction: &str,
        image_url: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let request = ChatRequest::new(self.routed_model())
            .message(WireMessage::user_with_image(instruction, image_url))
            .max_tokens(max_tokens);

        let response = self.client()?.chat(&request).await?;

        response
            .first_text()
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AiError::EmptyResponse("Hugging Face router".into()))
    }
}
