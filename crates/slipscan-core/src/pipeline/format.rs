//! Content-based image format detection.
//!
//! The format is sniffed from the leading bytes, never taken from a file name
//! or a client-supplied extension.

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PipelineError;

/// Image formats accepted by the inference endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlipFormat {
    #[default]
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl SlipFormat {
    /// Every accepted format.
    pub const ALL: [SlipFormat; 4] = [
        SlipFormat::Png,
        SlipFormat::Jpeg,
        SlipFormat::Gif,
        SlipFormat::Webp,
    ];

    /// Wire tag sent to the model ("png", "jpeg", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            SlipFormat::Png => "png",
            SlipFormat::Jpeg => "jpeg",
            SlipFormat::Gif => "gif",
            SlipFormat::Webp => "webp",
        }
    }

    /// The codec used to decode and re-encode this format.
    pub fn image_format(self) -> ImageFormat {
        match self {
            SlipFormat::Png => ImageFormat::Png,
            SlipFormat::Jpeg => ImageFormat::Jpeg,
            SlipFormat::Gif => ImageFormat::Gif,
            SlipFormat::Webp => ImageFormat::WebP,
        }
    }

    /// Map a decoded format onto the accepted set.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(SlipFormat::Png),
            ImageFormat::Jpeg => Some(SlipFormat::Jpeg),
            ImageFormat::Gif => Some(SlipFormat::Gif),
            ImageFormat::WebP => Some(SlipFormat::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for SlipFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase name for any format the decoder can recognize.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        ImageFormat::Ico => "ico".to_string(),
        ImageFormat::Pnm => "pnm".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        ImageFormat::Tga => "tga".to_string(),
        ImageFormat::Qoi => "qoi".to_string(),
        _ => "unknown".to_string(),
    }
}

/// Sniffs image formats from content bytes.
pub struct FormatDetector;

impl FormatDetector {
    /// Raw signature sniff with no fallback.
    pub fn detect(bytes: &[u8]) -> Option<ImageFormat> {
        image::guess_format(bytes).ok()
    }

    /// Detect the format tag, falling back to PNG on any failure.
    ///
    /// Never fails: unrecognized content and formats outside the accepted set
    /// both resolve to [`SlipFormat::Png`].
    pub fn detect_format(bytes: &[u8]) -> SlipFormat {
        match Self::detect(bytes) {
            Some(format) => SlipFormat::from_image_format(format).unwrap_or_else(|| {
                tracing::warn!(
                    "Format '{}' is not accepted by the model, tagging as png",
                    format_to_string(format)
                );
                SlipFormat::Png
            }),
            None => {
                tracing::warn!("Could not determine image format, defaulting to png");
                SlipFormat::Png
            }
        }
    }

    /// Detect the format tag for an upload about to be normalized.
    ///
    /// Undetermined content still resolves to PNG, but a recognized format the
    /// endpoint does not accept (BMP, TIFF, ...) is an error rather than being
    /// mislabelled.
    pub fn detect_supported(bytes: &[u8]) -> Result<SlipFormat, PipelineError> {
        match Self::detect(bytes) {
            Some(format) => SlipFormat::from_image_format(format).ok_or_else(|| {
                PipelineError::UnsupportedFormat {
                    format: format_to_string(format),
                }
            }),
            None => {
                tracing::warn!("Could not determine image format, defaulting to png");
                Ok(SlipFormat::Png)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::encode;
    use image::DynamicImage;

    #[test]
    fn test_detect_png() {
        let bytes = encode(&DynamicImage::new_rgb8(8, 8), ImageFormat::Png);
        assert_eq!(FormatDetector::detect_format(&bytes), SlipFormat::Png);
    }

    #[test]
    fn test_detect_jpeg() {
        let bytes = encode(&DynamicImage::new_rgb8(8, 8), ImageFormat::Jpeg);
        assert_eq!(FormatDetector::detect_format(&bytes), SlipFormat::Jpeg);
        assert_eq!(FormatDetector::detect_format(&bytes).as_str(), "jpeg");
    }

    #[test]
    fn test_garbage_falls_back_to_png() {
        assert_eq!(FormatDetector::detect_format(b""), SlipFormat::Png);
        assert_eq!(
            FormatDetector::detect_format(&[0x13, 0x37, 0x00, 0x42, 0x99]),
            SlipFormat::Png
        );
        assert!(FormatDetector::detect(b"not an image at all").is_none());
    }

    #[test]
    fn test_unsupported_format_tagged_png_but_rejected_strictly() {
        let bytes = encode(&DynamicImage::new_rgb8(8, 8), ImageFormat::Bmp);
        assert_eq!(FormatDetector::detect(&bytes), Some(ImageFormat::Bmp));
        assert_eq!(FormatDetector::detect_format(&bytes), SlipFormat::Png);

        let err = FormatDetector::detect_supported(&bytes).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnsupportedFormat { ref format } if format == "bmp"
        ));
    }

    #[test]
    fn test_detect_supported_defaults_when_unknown() {
        assert_eq!(
            FormatDetector::detect_supported(b"????????").unwrap(),
            SlipFormat::Png
        );
    }

    #[test]
    fn test_format_roundtrips_through_image_format() {
        for format in SlipFormat::ALL {
            assert_eq!(
                SlipFormat::from_image_format(format.image_format()),
                Some(format)
            );
        }
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
        assert_eq!(format_to_string(ImageFormat::Tiff), "tiff");
    }
}
