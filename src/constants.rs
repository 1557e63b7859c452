pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 0;
pub const MAX_QUALITY: u8 = 100;

/// Hard cap on the number of files accepted in one selection.
pub const MAX_BATCH_FILES: usize = 100;

pub const DEFAULT_ARCHIVE_NAME: &str = "compressed_images.zip";
pub const DEFAULT_ITEM_TIMEOUT_SECS: u64 = 30;

/// Tile height used by the preview renderer, in pixels.
pub const THUMBNAIL_HEIGHT: u32 = 150;

/// Base name used when a file name has nothing before its first dot.
pub const FALLBACK_BASE_NAME: &str = "image";

pub const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

pub const SIZE_UNITS: &[&str] = &["Bytes", "KB", "MB"];
pub const SIZE_THRESHOLD: u64 = 1024;

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const OXIPNG_PRESET: u8 = 4;

pub const ZOPFLI_QUALITY_THRESHOLD: f32 = 0.9;
pub const HIGH_COMPRESSION_QUALITY_THRESHOLD: f32 = 0.7;

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({prefix}%) {msg}";
pub const PROGRESS_BAR_CHARS: &str = "#>-";
