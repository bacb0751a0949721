//! Error types for the Slipscan extraction pipeline.
//!
//! Errors are organized by stage so the front end can tell an unusable upload
//! apart from a failed call to the model, and show the underlying cause.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Slipscan operations.
#[derive(Error, Debug)]
pub enum SlipError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, from upload validation through the model call.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Bytes did not decode as a well-formed raster image
    #[error("Invalid image: {message}")]
    InvalidImage { message: String },

    /// Image decoded, but the inference endpoint does not accept its format
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: String },

    /// Re-encoding the resized image failed
    #[error("Failed to encode {format} image: {message}")]
    Encode { format: String, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// Upload exceeds size limit
    #[error("File too large: {size_mb}MB > {max_mb}MB")]
    FileTooLarge { size_mb: u64, max_mb: u64 },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The inference call failed before or during transmission: network,
    /// missing or rejected credentials, throttling, remote-side errors.
    #[error("Inference request failed: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
    },

    /// The call succeeded but the reply did not have the expected shape
    #[error("Malformed inference response: {message}")]
    MalformedResponse { message: String },
}

impl PipelineError {
    /// True for errors raised before the model was contacted.
    pub fn is_upload_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidImage { .. }
                | PipelineError::UnsupportedFormat { .. }
                | PipelineError::Encode { .. }
                | PipelineError::Timeout { .. }
                | PipelineError::FileTooLarge { .. }
                | PipelineError::FileNotFound(_)
        )
    }

    /// True when the remote side rejected our credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            PipelineError::Transport {
                status_code: Some(401 | 403),
                ..
            }
        )
    }
}

/// Convenience type alias for Slipscan results.
pub type Result<T> = std::result::Result<T, SlipError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
