//! Image normalization: fit the longest edge within the model's input bound.
//!
//! Resampling uses Lanczos3 so small receipt text stays legible, and the
//! output is re-encoded in the format the input was decoded as.

use image::{DynamicImage, GenericImageView};
use std::io::Cursor;

use crate::config::{LimitsConfig, NormalizeConfig};
use crate::error::PipelineError;

use super::format::{format_to_string, SlipFormat};
use super::validate::Validator;

/// An image ready to be sent to the model.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// Encoding of `bytes`, identical to the upload's format
    pub format: SlipFormat,
    /// Width after normalization
    pub width: u32,
    /// Height after normalization
    pub height: u32,
    /// Width of the upload
    pub original_width: u32,
    /// Height of the upload
    pub original_height: u32,
}

impl NormalizedImage {
    /// Whether the pixel dimensions changed.
    pub fn was_resized(&self) -> bool {
        self.width != self.original_width || self.height != self.original_height
    }
}

/// Rescales images so the longer side fits `max_dimension`.
pub struct Normalizer {
    max_dimension: u32,
}

impl Normalizer {
    /// Create a new normalizer with the given configuration.
    pub fn new(config: NormalizeConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
        }
    }

    /// The configured bound on the longer side.
    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Compute output dimensions for an image of `width` x `height`.
    ///
    /// If the longer side exceeds `max_dimension` it becomes exactly
    /// `max_dimension` and the shorter side is scaled proportionally and
    /// rounded (never below 1). Otherwise the dimensions are unchanged.
    pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
        let longer = width.max(height);
        if longer <= max_dimension {
            return (width, height);
        }

        let scale = |side: u32| -> u32 {
            let scaled = (max_dimension as f64 * side as f64 / longer as f64).round() as u32;
            scaled.max(1)
        };

        if width >= height {
            (max_dimension, scale(height))
        } else {
            (scale(width), max_dimension)
        }
    }

    /// Resize a decoded image and re-encode it as `format`.
    ///
    /// Re-encoding always happens, so an image already within bounds keeps its
    /// pixel dimensions but its byte size may change.
    pub fn normalize(
        &self,
        image: &DynamicImage,
        format: SlipFormat,
    ) -> Result<NormalizedImage, PipelineError> {
        let (original_width, original_height) = image.dimensions();
        let (width, height) =
            Self::target_dimensions(original_width, original_height, self.max_dimension);

        let bytes = if (width, height) == (original_width, original_height) {
            encode(image, format)?
        } else {
            tracing::debug!(
                "Resizing {}x{} -> {}x{}",
                original_width,
                original_height,
                width,
                height
            );
            let resized =
                image.resize_exact(width, height, image::imageops::FilterType::Lanczos3);
            encode(&resized, format)?
        };

        Ok(NormalizedImage {
            bytes,
            format,
            width,
            height,
            original_width,
            original_height,
        })
    }
}

/// Decode `bytes`, fit them within `max_dimension`, and re-encode in the same
/// format.
pub fn resize(bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>, PipelineError> {
    let (image, decoded_format) = Validator::new(LimitsConfig::default()).decode(bytes)?;
    let format = SlipFormat::from_image_format(decoded_format).ok_or_else(|| {
        PipelineError::UnsupportedFormat {
            format: format_to_string(decoded_format),
        }
    })?;

    let normalizer = Normalizer::new(NormalizeConfig { max_dimension });
    Ok(normalizer.normalize(&image, format)?.bytes)
}

fn encode(image: &DynamicImage, format: SlipFormat) -> Result<Vec<u8>, PipelineError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format.image_format())
        .map_err(|e| PipelineError::Encode {
            format: format.to_string(),
            message: e.to_string(),
        })?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::format::FormatDetector;
    use crate::pipeline::test_support::{encode as encode_fixture, gradient};
    use image::ImageFormat;

    fn dimensions_of(bytes: &[u8]) -> (u32, u32) {
        image::load_from_memory(bytes).unwrap().dimensions()
    }

    #[test]
    fn test_target_dimensions_landscape() {
        assert_eq!(Normalizer::target_dimensions(3000, 2000, 1120), (1120, 747));
        assert_eq!(Normalizer::target_dimensions(4000, 1000, 1120), (1120, 280));
    }

    #[test]
    fn test_target_dimensions_portrait() {
        assert_eq!(Normalizer::target_dimensions(2000, 3000, 1120), (747, 1120));
        assert_eq!(Normalizer::target_dimensions(1080, 2400, 1120), (504, 1120));
    }

    #[test]
    fn test_target_dimensions_square() {
        assert_eq!(Normalizer::target_dimensions(5000, 5000, 1120), (1120, 1120));
        assert_eq!(Normalizer::target_dimensions(1120, 1120, 1120), (1120, 1120));
    }

    #[test]
    fn test_target_dimensions_within_bound_unchanged() {
        assert_eq!(Normalizer::target_dimensions(500, 400, 1120), (500, 400));
        assert_eq!(Normalizer::target_dimensions(1120, 10, 1120), (1120, 10));
        assert_eq!(Normalizer::target_dimensions(1, 1, 1120), (1, 1));
    }

    #[test]
    fn test_target_dimensions_never_zero() {
        assert_eq!(Normalizer::target_dimensions(10000, 3, 1120), (1120, 1));
    }

    #[test]
    fn test_target_dimensions_bound_and_ratio() {
        for (w, h) in [(1121, 1), (2500, 1700), (1700, 2500), (9999, 4321), (1234, 5678)] {
            let (nw, nh) = Normalizer::target_dimensions(w, h, 1120);
            assert_eq!(nw.max(nh), 1120);
            let (longer, shorter) = (w.max(h) as f64, w.min(h) as f64);
            let expected = ((1120.0 * shorter / longer).round() as u32).max(1);
            assert_eq!(nw.min(nh), expected, "{w}x{h}");
        }
    }

    #[test]
    fn test_large_jpeg_scaled_to_bound() {
        let bytes = encode_fixture(&gradient(3000, 2000), ImageFormat::Jpeg);

        let out = resize(&bytes, 1120).unwrap();
        assert_eq!(dimensions_of(&out), (1120, 747));
        assert_eq!(FormatDetector::detect_format(&out), SlipFormat::Jpeg);
    }

    #[test]
    fn test_small_png_unchanged() {
        let bytes = encode_fixture(&gradient(500, 400), ImageFormat::Png);

        let out = resize(&bytes, 1120).unwrap();
        assert_eq!(dimensions_of(&out), (500, 400));
        assert_eq!(FormatDetector::detect_format(&out), SlipFormat::Png);
    }

    #[test]
    fn test_resize_is_idempotent() {
        let bytes = encode_fixture(&gradient(1800, 900), ImageFormat::Png);

        let once = resize(&bytes, 600).unwrap();
        let twice = resize(&once, 600).unwrap();
        assert_eq!(dimensions_of(&once), (600, 300));
        assert_eq!(dimensions_of(&twice), dimensions_of(&once));
    }

    #[test]
    fn test_long_scroll_screenshot_resized() {
        let bytes = encode_fixture(&DynamicImage::new_luma8(800, 13000), ImageFormat::Png);

        let out = resize(&bytes, 1120).unwrap();
        assert_eq!(dimensions_of(&out), (69, 1120));
        assert_eq!(FormatDetector::detect_format(&out), SlipFormat::Png);
    }

    #[test]
    fn test_webp_format_preserved() {
        let bytes = encode_fixture(&gradient(300, 200), ImageFormat::WebP);

        let out = resize(&bytes, 150).unwrap();
        assert_eq!(dimensions_of(&out), (150, 100));
        assert_eq!(FormatDetector::detect_format(&out), SlipFormat::Webp);
    }

    #[test]
    fn test_resize_rejects_garbage() {
        let err = resize(b"definitely not pixels", 1120).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidImage { .. }));
    }

    #[test]
    fn test_resize_rejects_unaccepted_format() {
        let bytes = encode_fixture(&gradient(20, 20), ImageFormat::Bmp);
        let err = resize(&bytes, 1120).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_normalized_image_tracks_original_dimensions() {
        let normalizer = Normalizer::new(NormalizeConfig { max_dimension: 100 });
        let normalized = normalizer
            .normalize(&gradient(400, 200), SlipFormat::Png)
            .unwrap();

        assert_eq!((normalized.width, normalized.height), (100, 50));
        assert_eq!(
            (normalized.original_width, normalized.original_height),
            (400, 200)
        );
        assert!(normalized.was_resized());
        assert_eq!(dimensions_of(&normalized.bytes), (100, 50));
    }
}
