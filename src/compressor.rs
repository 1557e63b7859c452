use crate::constants::{
    DEFAULT_ITEM_TIMEOUT_SECS, DEFAULT_QUALITY, FALLBACK_BASE_NAME, MAX_QUALITY, MIN_QUALITY,
};
use crate::error::{CompressionError, Result};
use crate::formats::OutputFormat;
use crate::intake::SourceImage;
use crate::surface::Surface;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Settings for one batch run, shared read-only by every item.
#[derive(Debug, Clone, Copy)]
pub struct CompressionConfig {
    /// Encoder quality as a fraction in `[0, 1]`.
    pub quality: f32,
    pub format: OutputFormat,
    pub item_timeout: Duration,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY as f32 / 100.0,
            format: OutputFormat::default(),
            item_timeout: Duration::from_secs(DEFAULT_ITEM_TIMEOUT_SECS),
        }
    }
}

impl CompressionConfig {
    /// Build a config from a quality percentage and a MIME type or short format name.
    pub fn new(quality: Option<u8>, format: Option<&str>) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        let format = match format {
            Some(name) => OutputFormat::from_str(name)?,
            None => OutputFormat::default(),
        };

        Ok(Self {
            quality: quality as f32 / 100.0,
            format,
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.item_timeout = timeout;
        self
    }

    pub fn quality_percent(&self) -> u8 {
        (self.quality * 100.0).round() as u8
    }
}

/// Re-encoded output for one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub name: String,
    pub bytes: Vec<u8>,
    pub original_size: u64,
}

impl CompressedImage {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Output file name for `name` re-encoded as `format`.
///
/// Everything from the first `.` on is replaced by the format's extension,
/// so `archive.tar.png` becomes `archive.jpg`. Names with nothing before the
/// first dot fall back to `image`.
pub fn derive_output_name(name: &str, format: OutputFormat) -> String {
    let base = name.split('.').next().unwrap_or_default();
    let base = if base.is_empty() { FALLBACK_BASE_NAME } else { base };
    format!("{}.{}", base, format.extension())
}

/// Decode, redraw onto a fresh surface and re-encode one image.
pub fn compress_image(source: &SourceImage, config: &CompressionConfig) -> Result<CompressedImage> {
    let img = image::load_from_memory(&source.bytes)
        .map_err(|e| CompressionError::Decode(source.name.clone(), e))?;

    let mut surface = Surface::for_image(&img);
    surface.draw(&img);
    drop(img);

    let bytes = surface
        .encode(config.format, config.quality)
        .map_err(|e| CompressionError::Encode(source.name.clone(), e.to_string()))?;

    let name = derive_output_name(&source.name, config.format);
    debug!(
        input = %source.name,
        output = %name,
        before = source.size,
        after = bytes.len(),
        "compressed image"
    );

    Ok(CompressedImage {
        name,
        bytes,
        original_size: source.size,
    })
}
