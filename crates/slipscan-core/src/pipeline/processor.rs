//! Pipeline orchestration - wires validation, format detection and
//! normalization together under the configured limits.

use image::DynamicImage;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::{Config, LimitsConfig, NormalizeConfig};
use crate::error::PipelineError;

use super::format::{FormatDetector, SlipFormat};
use super::normalize::{NormalizedImage, Normalizer};
use super::validate::Validator;

/// An upload that decoded successfully.
pub struct ValidatedUpload {
    /// The decoded pixels
    pub image: DynamicImage,
    /// Format sniffed from the upload's content
    pub format: SlipFormat,
}

/// Turns raw uploads into images ready for inference.
pub struct SlipProcessor {
    limits: LimitsConfig,
    normalize: NormalizeConfig,
}

impl SlipProcessor {
    /// Create a new processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            limits: config.limits.clone(),
            normalize: config.normalize.clone(),
        }
    }

    /// The bound applied to the longer image side.
    pub fn max_dimension(&self) -> u32 {
        self.normalize.max_dimension
    }

    /// Read an upload from disk, enforcing the size limit before reading.
    pub async fn load(&self, path: &Path) -> Result<Vec<u8>, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| PipelineError::InvalidImage {
                message: format!("Cannot read metadata for {}: {e}", path.display()),
            })?;

        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::InvalidImage {
                message: format!("Cannot read {}: {e}", path.display()),
            })
    }

    /// Validate the upload and detect its format.
    pub async fn validate(&self, bytes: Vec<u8>) -> Result<ValidatedUpload, PipelineError> {
        let limits = self.limits.clone();
        self.run_blocking("validate", move || Self::validate_sync(&limits, &bytes))
            .await
    }

    /// Resize and re-encode a validated upload.
    pub async fn normalize(&self, upload: ValidatedUpload) -> Result<NormalizedImage, PipelineError> {
        let normalizer = Normalizer::new(self.normalize.clone());
        self.run_blocking("normalize", move || {
            normalizer.normalize(&upload.image, upload.format)
        })
        .await
    }

    /// Validate then normalize in one step.
    pub async fn prepare(&self, bytes: Vec<u8>) -> Result<NormalizedImage, PipelineError> {
        let start = std::time::Instant::now();
        let upload = self.validate(bytes).await?;
        let normalized = self.normalize(upload).await?;

        tracing::debug!(
            "Prepared {} image {}x{} -> {}x{} ({} bytes) in {:?}",
            normalized.format,
            normalized.original_width,
            normalized.original_height,
            normalized.width,
            normalized.height,
            normalized.bytes.len(),
            start.elapsed()
        );
        Ok(normalized)
    }

    fn validate_sync(limits: &LimitsConfig, bytes: &[u8]) -> Result<ValidatedUpload, PipelineError> {
        let (image, _) = Validator::new(limits.clone()).decode(bytes)?;
        let format = FormatDetector::detect_supported(bytes)?;
        Ok(ValidatedUpload { image, format })
    }

    /// Run CPU-bound image work off the async runtime, bounded by the decode timeout.
    async fn run_blocking<T, F>(&self, stage: &str, work: F) -> Result<T, PipelineError>
    where
        F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
        T: Send + 'static,
    {
        let timeout_ms = self.limits.decode_timeout_ms;
        match timeout(
            Duration::from_millis(timeout_ms),
            tokio::task::spawn_blocking(work),
        )
        .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::InvalidImage {
                message: format!("{stage} task failed: {e}"),
            }),
            Err(_) => Err(PipelineError::Timeout {
                stage: stage.to_string(),
                timeout_ms,
            }),
        }
    }
}
