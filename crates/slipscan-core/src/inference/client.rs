//! The inference client: one image plus the extraction prompt, one attempt.

use crate::config::{BedrockConfig, Config};
use crate::error::PipelineError;
use crate::pipeline::SlipFormat;
use crate::types::ExtractionResult;

use super::bedrock::BedrockProvider;
use super::provider::{ImageInput, InferenceProvider, InferenceRequest};

/// Sends slip images to the model and returns its raw answer.
///
/// The answer is not parsed: the prompt asks for a fixed layout and the text is
/// passed through as-is. There are no retries; re-triggering is up to the caller.
pub struct InferenceClient {
    provider: Box<dyn InferenceProvider>,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
}

impl InferenceClient {
    /// Wrap a provider, taking the prompt and sampling settings from config.
    pub fn new(provider: Box<dyn InferenceProvider>, config: &BedrockConfig) -> Self {
        Self {
            provider,
            prompt: config.prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Build a client backed by Bedrock.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let provider = BedrockProvider::from_config(config)?;
        Ok(Self::new(Box::new(provider), &config.bedrock))
    }

    /// Model identifier requests go to.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Extract the payment date and amount from an encoded image.
    ///
    /// Returns the first text part of the reply unmodified. A blank reply is
    /// treated as a malformed response.
    pub async fn extract(
        &self,
        image_bytes: &[u8],
        format: SlipFormat,
    ) -> Result<ExtractionResult, PipelineError> {
        let request = InferenceRequest {
            image: ImageInput::from_bytes(image_bytes, format),
            prompt: self.prompt.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!(
            "Sending {} image ({} bytes) to {} model {}",
            format,
            image_bytes.len(),
            self.provider.name(),
            self.provider.model()
        );

        let response = match self.provider.generate(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Extraction via {} failed: {e}", self.provider.name());
                return Err(e);
            }
        };

        if response.text.trim().is_empty() {
            tracing::error!("{} returned an empty answer", self.provider.name());
            return Err(PipelineError::MalformedResponse {
                message: "Model returned no text".to_string(),
            });
        }

        tracing::info!(
            "Extraction finished in {}ms ({} tokens)",
            response.latency_ms,
            response
                .tokens_used
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".to_string())
        );

        Ok(ExtractionResult {
            text: response.text,
            model: response.model,
            tokens_used: response.tokens_used,
            latency_ms: response.latency_ms,
        })
    }
}
