//! Image preparation pipeline.
//!
//! - **validate**: reject uploads that do not decode as raster images
//! - **format**: sniff the encoded format from content bytes
//! - **normalize**: fit the longer side within the model's bound
//! - **processor**: orchestrates the stages under resource limits

pub mod format;
pub mod normalize;
pub mod processor;
pub mod validate;

// Re-exports for convenient access
pub use format::{FormatDetector, SlipFormat};
pub use normalize::{resize, NormalizedImage, Normalizer};
pub use processor::{SlipProcessor, ValidatedUpload};
pub use validate::{validate, Validator};

#[cfg(test)]
pub(crate) mod test_support {
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// Encode an image in memory.
    pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    /// A non-uniform RGB image, so encoders can't collapse it to a few bytes.
    pub fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    /// Deterministic xorshift noise.
    pub fn pseudo_random_bytes(seed: u64, len: usize) -> Vec<u8> {
        let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 24) as u8
            })
            .collect()
    }
}
