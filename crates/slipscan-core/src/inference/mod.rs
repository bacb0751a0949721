//! Remote inference: one signed Converse call per extraction.
//!
//! The provider trait keeps the transport swappable; Bedrock is the one
//! production backend.

pub(crate) mod bedrock;
pub(crate) mod client;
pub(crate) mod credentials;
pub mod prompt;
pub(crate) mod provider;
pub(crate) mod sigv4;

pub use bedrock::BedrockProvider;
pub use client::InferenceClient;
pub use credentials::{resolve_env_var, AwsCredentials};
pub use prompt::EXTRACTION_PROMPT;
pub use provider::{ImageInput, InferenceProvider, InferenceRequest, InferenceResponse};
