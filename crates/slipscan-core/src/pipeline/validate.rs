//! Upload validation: the bytes must decode as a well-formed raster image.

use image::{DynamicImage, ImageFormat, ImageReader, Limits};
use std::io::Cursor;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Validates uploaded bytes before any further processing.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// True only if the bytes decode completely within the decoder limits.
    /// Never panics on garbage input.
    pub fn is_valid(&self, bytes: &[u8]) -> bool {
        self.check(bytes).is_ok()
    }

    /// Validate the upload, reporting why it was rejected.
    pub fn check(&self, bytes: &[u8]) -> Result<(), PipelineError> {
        self.decode(bytes).map(|_| ())
    }

    /// Fully decode the upload under the configured limits.
    ///
    /// A complete decode is the integrity check: truncated or corrupt pixel
    /// data fails here even when the header sniffs correctly. The upload's
    /// byte size is not checked; that is up to whoever reads the file.
    pub fn decode(&self, bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::InvalidImage {
                message: "Upload is empty".to_string(),
            });
        }

        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::InvalidImage {
                message: format!("Cannot detect image format: {e}"),
            })?;

        let format = reader.format().ok_or_else(|| PipelineError::InvalidImage {
            message: "Unrecognized image format (invalid magic bytes)".to_string(),
        })?;

        reader.limits(self.decoder_limits());

        let image = reader.decode().map_err(|e| PipelineError::InvalidImage {
            message: e.to_string(),
        })?;

        Ok((image, format))
    }

    fn decoder_limits(&self) -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.limits.max_image_dimension);
        limits.max_image_height = Some(self.limits.max_image_dimension);
        limits.max_alloc = Some(self.limits.max_alloc_mb.saturating_mul(1024 * 1024));
        limits
    }
}

/// Validate bytes with the default limits.
pub fn validate(bytes: &[u8]) -> bool {
    Validator::new(LimitsConfig::default()).is_valid(bytes)
}
