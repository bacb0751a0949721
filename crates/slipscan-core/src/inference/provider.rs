//! Inference provider trait and request/response types.

use async_trait::async_trait;
use base64::Engine;

use crate::error::PipelineError;
use crate::pipeline::SlipFormat;

/// Base64-encoded image ready to embed in a JSON request.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// Encoding of the image bytes
    pub format: SlipFormat,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and their detected format.
    pub fn from_bytes(bytes: &[u8], format: SlipFormat) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            format,
        }
    }
}

/// A single-turn request: one image plus one instruction.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// The slip image
    pub image: ImageInput,
    /// Text instruction for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// The response from one inference call.
#[derive(Debug, Clone)]
pub struct InferenceResponse {
    /// Text of the first content part, unmodified
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that inference backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn InferenceProvider>` so tests can swap the backend).
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Provider name for logging (e.g., "bedrock").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Make exactly one call to the remote model.
    async fn generate(&self, request: &InferenceRequest) -> Result<InferenceResponse, PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_input_from_bytes() {
        let input = ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], SlipFormat::Jpeg);
        assert_eq!(input.data, "/9j/");
        assert_eq!(input.format, SlipFormat::Jpeg);
    }
}
