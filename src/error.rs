use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Selection rejected: {0} files selected, at most {1} allowed")]
    InputRejected(usize, usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid quality value: {0}. Must be between 0 and 100")]
    InvalidQuality(u8),

    #[error("Failed to decode {0}: {1}")]
    Decode(String, #[source] image::ImageError),

    #[error("Failed to encode {0}: {1}")]
    Encode(String, String),

    #[error("Timed out after {1}s while compressing {0}")]
    Timeout(String, u64),

    #[error("Batch cancelled")]
    Cancelled,

    #[error("Nothing to archive: the batch produced no compressed images")]
    EmptyBatch,

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("No files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
