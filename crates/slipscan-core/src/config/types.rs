//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};

use crate::inference::prompt::EXTRACTION_PROMPT;

/// Image normalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Longest edge in pixels sent to the model.
    /// 1120 is the documented maximum for Llama 3.2 vision inputs.
    pub max_dimension: u32,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1120,
        }
    }
}

/// Resource limits to protect against problematic uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum decoded image dimension (width or height). Long-scroll
    /// banking-app screenshots can be well over 10000px tall.
    pub max_image_dimension: u32,

    /// Maximum decoder allocation in megabytes
    pub max_alloc_mb: u64,

    /// Decode + resize + encode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Inference call timeout in milliseconds
    pub llm_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 32768,
            max_alloc_mb: 512,
            decode_timeout_ms: 10000,
            llm_timeout_ms: 60000,
        }
    }
}

/// AWS Bedrock settings.
///
/// Credential fields support `${ENV_VAR}` syntax and are resolved when the
/// provider is built, never at config load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BedrockConfig {
    /// Model identifier (or inference profile id)
    pub model_id: String,

    /// AWS region
    pub region: String,

    /// Access key identifier
    pub access_key_id: String,

    /// Access key secret
    pub secret_access_key: String,

    /// Optional session token for temporary credentials
    pub session_token: String,

    /// Endpoint override, e.g. a VPC endpoint. Defaults to the regional
    /// `bedrock-runtime` host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Instruction sent alongside the image
    pub prompt: String,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            model_id: "us.meta.llama3-2-90b-instruct-v1:0".to_string(),
            region: "${AWS_REGION}".to_string(),
            access_key_id: "${AWS_ACCESS_KEY_ID}".to_string(),
            secret_access_key: "${AWS_SECRET_ACCESS_KEY}".to_string(),
            session_token: "${AWS_SESSION_TOKEN}".to_string(),
            endpoint: None,
            max_tokens: 512,
            temperature: 0.0,
            prompt: EXTRACTION_PROMPT.to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
