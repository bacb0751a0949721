//! Slipscan Core - payment details from receipt and payment-slip images.
//!
//! An upload is validated, normalized to the model's input bound, and sent with
//! a fixed instruction to a multimodal model on AWS Bedrock. The model's answer
//! (date and amount) is returned as raw text.
//!
//! # Architecture
//!
//! ```text
//! Bytes → Validate → Detect format → Normalize (≤ 1120px) → Converse → Text
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use slipscan_core::{Config, ExtractionSession, InferenceClient};
//!
//! #[tokio::main]
//! async fn main() -> slipscan_core::Result<()> {
//!     let config = Config::load()?;
//!     let mut session = ExtractionSession::new(&config);
//!
//!     session.upload(std::fs::read("./slip.jpg")?).await;
//!     let client = InferenceClient::from_config(&config)?;
//!     if let Some(text) = session.extract(&client).await {
//!         println!("{text}");
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod inference;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, Result, SlipError};
pub use inference::{BedrockProvider, InferenceClient, EXTRACTION_PROMPT};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{
    resize, validate, FormatDetector, NormalizedImage, Normalizer, SlipFormat, SlipProcessor,
    Validator,
};
pub use session::{ExtractionSession, FailureStage, SessionState};
pub use types::{ExtractionRecord, ExtractionResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Decide the format tag for raw bytes, defaulting to `png`.
pub fn detect_format(bytes: &[u8]) -> SlipFormat {
    FormatDetector::detect_format(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_detect_format_never_fails() {
        assert_eq!(detect_format(&[]), SlipFormat::Png);
    }
}
