use crate::constants::{MAX_BATCH_FILES, UNKNOWN_MIME_TYPE};
use crate::error::{CompressionError, Result};
use image::ImageFormat;
use std::path::Path;

/// Reject a selection that exceeds the batch cap before anything is read.
pub fn validate_selection_count(count: usize) -> Result<()> {
    if count > MAX_BATCH_FILES {
        return Err(CompressionError::InputRejected(count, MAX_BATCH_FILES));
    }
    Ok(())
}

/// Validate that an input path exists and is a regular file
pub fn validate_input_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CompressionError::FileNotFound(path.to_path_buf()));
    }

    if !path.is_file() {
        return Err(CompressionError::UnsupportedFormat(format!(
            "{} is not a file",
            path.display()
        )));
    }

    Ok(())
}

/// MIME type a browser would declare for this file name, judged by extension only.
pub fn declared_mime_type(name: &str) -> &'static str {
    let extension = match Path::new(name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => ext.to_lowercase(),
        None => return UNKNOWN_MIME_TYPE,
    };

    if let Some(format) = ImageFormat::from_extension(&extension) {
        return format.to_mime_type();
    }

    // Image types the decoder does not handle still declare as images.
    match extension.as_str() {
        "svg" => "image/svg+xml",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "jxl" => "image/jxl",
        _ => UNKNOWN_MIME_TYPE,
    }
}

pub fn is_image_mime_type(mime: &str) -> bool {
    mime.starts_with("image/")
}
