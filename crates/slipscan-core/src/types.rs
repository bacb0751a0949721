//! Core data types produced by an extraction run.

use serde::{Deserialize, Serialize};

use crate::pipeline::{NormalizedImage, SlipFormat};

/// The model's answer for one slip.
///
/// `text` is exactly what the model returned; by prompt contract it reads as
/// `Date: dd/mm/yyyy` and `Amount: <number> THB`, but nothing enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Raw answer text
    pub text: String,

    /// Model identifier that produced the answer
    pub model: String,

    /// Input + output tokens, if the service reported usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,

    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Summary of one run, as written by the CLI's JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRecord {
    // === Upload ===
    /// File name of the upload, if it came from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    /// Format sniffed from content
    pub format: SlipFormat,

    /// Upload width in pixels
    pub original_width: u32,

    /// Upload height in pixels
    pub original_height: u32,

    // === Normalized image ===
    /// Width sent to the model
    pub width: u32,

    /// Height sent to the model
    pub height: u32,

    /// Encoded size sent to the model
    pub bytes_sent: usize,

    // === Answer ===
    /// The model's answer
    pub result: ExtractionResult,
}

impl ExtractionRecord {
    pub fn new(
        file_name: Option<String>,
        image: &NormalizedImage,
        result: ExtractionResult,
    ) -> Self {
        Self {
            file_name,
            format: image.format,
            original_width: image.original_width,
            original_height: image.original_height,
            width: image.width,
            height: image.height,
            bytes_sent: image.bytes.len(),
            result,
        }
    }
}
