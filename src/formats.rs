//! Target formats the compressor can re-encode to.
//!
//! Formats are selected by MIME type string (`image/jpeg`) or by short name
//! (`jpeg`, `jpg`). The derived output extension comes from the MIME subtype.

use crate::error::{CompressionError, Result};
use std::fmt;
use std::str::FromStr;

/// Supported output image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JPEG, lossy, no alpha channel
    #[default]
    Jpeg,
    /// PNG, lossless
    Png,
    /// WebP, lossy
    WebP,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    /// The part of the MIME type after the slash.
    pub fn mime_subtype(&self) -> &'static str {
        let mime = self.mime_type();
        &mime[mime.find('/').map_or(0, |i| i + 1)..]
    }

    /// File extension for derived output names. `jpeg` is shortened to `jpg`.
    pub fn extension(&self) -> &'static str {
        match self.mime_subtype() {
            "jpeg" => "jpg",
            subtype => subtype,
        }
    }

    pub fn all_formats() -> Vec<OutputFormat> {
        vec![OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::WebP]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

impl FromStr for OutputFormat {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        let name = lowered.strip_prefix("image/").unwrap_or(&lowered);
        match name {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(CompressionError::UnsupportedFormat(s.to_string())),
        }
    }
}
