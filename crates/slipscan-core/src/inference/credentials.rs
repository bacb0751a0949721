//! AWS credentials handed explicitly to the Bedrock provider.

use std::fmt;

use crate::config::BedrockConfig;
use crate::error::PipelineError;

/// Static AWS credentials.
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            session_token: None,
        }
    }

    /// Attach a session token for temporary (STS) credentials.
    pub fn with_session_token(mut self, token: &str) -> Self {
        self.session_token = Some(token.to_string());
        self
    }

    /// Resolve credentials from config strings, following `${ENV_VAR}` references.
    ///
    /// A missing key id or secret is an auth-class transport error: the call
    /// cannot be made.
    pub fn resolve(config: &BedrockConfig) -> Result<Self, PipelineError> {
        let access_key_id = require("bedrock.access_key_id", &config.access_key_id)?;
        let secret_access_key = require("bedrock.secret_access_key", &config.secret_access_key)?;

        let mut credentials = Self::new(&access_key_id, &secret_access_key);
        credentials.session_token = resolve_env_var(&config.session_token);
        Ok(credentials)
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Resolve the AWS region from config.
pub fn resolve_region(config: &BedrockConfig) -> Result<String, PipelineError> {
    require("bedrock.region", &config.region)
}

/// Resolve a required setting, naming the field or variable that is missing.
fn require(field: &str, value: &str) -> Result<String, PipelineError> {
    resolve_env_var(value).ok_or_else(|| {
        let message = match env_var_name(value) {
            Some(var) => format!("{field} reads ${{{var}}}, which is not set. Set the {var} env var."),
            None => format!("{field} is empty in the config file."),
        };
        PipelineError::Transport {
            message,
            status_code: None,
        }
    })
}

fn env_var_name(value: &str) -> Option<&str> {
    value.strip_prefix("${")?.strip_suffix('}')
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
