//! In-memory raster surface used as the re-encoding target.
//!
//! Drawing copies pixels 1:1. Encoding behaves like a 2D canvas export: JPEG
//! drops alpha by compositing over black, PNG stays lossless, WebP is lossy.

use crate::constants::{
    HIGH_COMPRESSION_QUALITY_THRESHOLD, LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL,
    OXIPNG_PRESET, ZOPFLI_ITERATIONS, ZOPFLI_QUALITY_THRESHOLD,
};
use crate::formats::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{imageops, DynamicImage, ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use oxipng::{optimize_from_memory, Deflaters, Options};
use std::num::NonZeroU8;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface has no pixels ({0}x{1})")]
    Empty(u32, u32),

    #[error("encoder error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("WebP encoder error: {0}")]
    WebP(String),
}

pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// A surface sized to the image's natural dimensions.
    pub fn for_image(img: &DynamicImage) -> Self {
        Self::new(img.width(), img.height())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Draw `img` at the origin without scaling.
    pub fn draw(&mut self, img: &DynamicImage) {
        imageops::replace(&mut self.pixels, &img.to_rgba8(), 0, 0);
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Encode the surface. `quality` is a fraction in `[0, 1]`.
    pub fn encode(&self, format: OutputFormat, quality: f32) -> Result<Vec<u8>, SurfaceError> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Err(SurfaceError::Empty(width, height));
        }

        match format {
            OutputFormat::Jpeg => self.encode_jpeg(quality),
            OutputFormat::Png => self.encode_png(quality),
            OutputFormat::WebP => self.encode_webp(quality),
        }
    }

    fn encode_jpeg(&self, quality: f32) -> Result<Vec<u8>, SurfaceError> {
        let rgb = flatten_over_black(&self.pixels);
        let quality = ((quality * 100.0).round() as u8).clamp(1, 100);

        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
        encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)?;
        Ok(buf)
    }

    fn encode_png(&self, quality: f32) -> Result<Vec<u8>, SurfaceError> {
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf).write_image(
            self.pixels.as_raw(),
            self.pixels.width(),
            self.pixels.height(),
            ExtendedColorType::Rgba8,
        )?;

        optimize_from_memory(&buf, &png_options(quality))
            .map_err(|e| SurfaceError::PngOptimization(e.to_string()))
    }

    fn encode_webp(&self, quality: f32) -> Result<Vec<u8>, SurfaceError> {
        let encoder =
            webp::Encoder::from_rgba(self.pixels.as_raw(), self.pixels.width(), self.pixels.height());
        let memory = encoder
            .encode_simple(false, (quality * 100.0).clamp(0.0, 100.0))
            .map_err(|e| SurfaceError::WebP(format!("{:?}", e)))?;
        Ok(memory.to_vec())
    }
}

/// Deflate effort scales with quality; PNG output is lossless regardless.
fn png_options(quality: f32) -> Options {
    let mut options = Options::from_preset(OXIPNG_PRESET);

    options.deflate = if quality >= ZOPFLI_QUALITY_THRESHOLD {
        Deflaters::Zopfli {
            iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap_or(NonZeroU8::MIN),
        }
    } else if quality >= HIGH_COMPRESSION_QUALITY_THRESHOLD {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    };

    options
}

fn flatten_over_black(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        image::Rgb([scale(r), scale(g), scale(b)])
    })
}
