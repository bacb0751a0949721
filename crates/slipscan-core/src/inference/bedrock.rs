//! AWS Bedrock provider using the Converse API.
//!
//! Sends the image as a base64 `bytes` source next to a text block in a single
//! user message, signed with SigV4.

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::credentials::{resolve_region, AwsCredentials};
use super::provider::{InferenceProvider, InferenceRequest, InferenceResponse};
use super::sigv4::{self, SigningParams};
use crate::config::Config;
use crate::error::PipelineError;

/// SigV4 service name for the Bedrock runtime.
const SIGNING_SERVICE: &str = "bedrock";

/// Bedrock provider using the Converse API.
pub struct BedrockProvider {
    credentials: AwsCredentials,
    region: String,
    model: String,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl BedrockProvider {
    pub fn new(credentials: AwsCredentials, region: &str, model: &str) -> Self {
        Self {
            credentials,
            region: region.to_string(),
            model: model.to_string(),
            endpoint: format!("https://bedrock-runtime.{region}.amazonaws.com"),
            timeout: Duration::from_secs(60),
            client: reqwest::Client::new(),
        }
    }

    /// Send requests to a custom endpoint (VPC endpoint, local mock).
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a provider from config, resolving credentials and region.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let bedrock = &config.bedrock;
        let credentials = AwsCredentials::resolve(bedrock)?;
        let region = resolve_region(bedrock)?;

        let mut provider = Self::new(credentials, &region, &bedrock.model_id)
            .with_timeout(Duration::from_millis(config.limits.llm_timeout_ms));
        if let Some(endpoint) = &bedrock.endpoint {
            provider = provider.with_endpoint(endpoint);
        }
        Ok(provider)
    }

    fn converse_url(&self) -> Result<Url, PipelineError> {
        let raw = format!(
            "{}/model/{}/converse",
            self.endpoint,
            sigv4::uri_encode(&self.model)
        );
        Url::parse(&raw).map_err(|e| PipelineError::Transport {
            message: format!("Invalid Bedrock endpoint '{raw}': {e}"),
            status_code: None,
        })
    }
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConverseRequest {
    messages: Vec<Message>,
    inference_config: InferenceConfig,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum ContentBlock {
    Image(ImageBlock),
    Text(String),
}

#[derive(Serialize)]
struct ImageBlock {
    format: String,
    source: ImageSource,
}

#[derive(Serialize)]
struct ImageSource {
    bytes: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    max_tokens: u32,
    temperature: f32,
}

// --- Response types ---

#[derive(Deserialize)]
struct ConverseResponse {
    output: Output,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Output {
    message: OutputMessage,
}

#[derive(Deserialize)]
struct OutputMessage {
    content: Vec<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

fn build_body(request: &InferenceRequest) -> ConverseRequest {
    ConverseRequest {
        messages: vec![Message {
            role: "user".to_string(),
            content: vec![
                ContentBlock::Image(ImageBlock {
                    format: request.image.format.to_string(),
                    source: ImageSource {
                        bytes: request.image.data.clone(),
                    },
                }),
                ContentBlock::Text(request.prompt.clone()),
            ],
        }],
        inference_config: InferenceConfig {
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        },
    }
}

/// Pull the first content part's text out of a Converse reply.
fn parse_response(body: &str) -> Result<(String, Option<u32>), PipelineError> {
    let resp: ConverseResponse =
        serde_json::from_str(body).map_err(|e| PipelineError::MalformedResponse {
            message: format!("Failed to parse Bedrock response: {e}"),
        })?;

    let first = resp
        .output
        .message
        .content
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::MalformedResponse {
            message: "Bedrock returned an empty content array".to_string(),
        })?;
    let text = first.text.ok_or_else(|| PipelineError::MalformedResponse {
        message: "First content part has no text field".to_string(),
    })?;

    let tokens_used = resp.usage.map(|u| u.input_tokens + u.output_tokens);
    Ok((text, tokens_used))
}

#[async_trait]
impl InferenceProvider for BedrockProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &InferenceRequest) -> Result<InferenceResponse, PipelineError> {
        let start = Instant::now();
        let url = self.converse_url()?;

        let payload =
            serde_json::to_vec(&build_body(request)).map_err(|e| PipelineError::Transport {
                message: format!("Failed to serialize Bedrock request: {e}"),
                status_code: None,
            })?;

        let signed = sigv4::sign_request(
            "POST",
            &url,
            &[("content-type", "application/json")],
            &payload,
            &SigningParams {
                credentials: &self.credentials,
                region: &self.region,
                service: SIGNING_SERVICE,
                time: chrono::Utc::now(),
            },
        );

        let mut builder = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .timeout(self.timeout);
        for (name, value) in &signed {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder
            .body(payload)
            .send()
            .await
            .map_err(|e| PipelineError::Transport {
                message: format!("Bedrock request failed: {e}"),
                status_code: None,
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| PipelineError::Transport {
            message: format!("Failed to read Bedrock response: {e}"),
            status_code: Some(status.as_u16()),
        })?;

        if !status.is_success() {
            let message = match status.as_u16() {
                401 | 403 => format!("Bedrock rejected credentials (HTTP {status}): {body}"),
                _ => format!("Bedrock HTTP {status}: {body}"),
            };
            return Err(PipelineError::Transport {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let (text, tokens_used) = parse_response(&body)?;

        Ok(InferenceResponse {
            text,
            model: self.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
