//! File intake: turns a user selection into an ordered list of images.
//!
//! Selection handles carry only a name, a size and a declared MIME type. Bytes
//! are read when a handle survives the count check and the image filter.

use crate::batch::BatchState;
use crate::error::{CompressionError, Result};
use crate::validation::{
    declared_mime_type, is_image_mime_type, validate_input_path, validate_selection_count,
};
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file handle as the user selected it. Bytes are read on demand.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    source: FileSource,
}

impl SelectedFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        validate_input_path(path)?;
        let size = fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CompressionError::FileNotFound(path.to_path_buf()))?;

        Ok(Self {
            mime_type: declared_mime_type(&name).to_string(),
            name,
            size,
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// In-memory handle; the MIME type is declared from the name like a path handle.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            mime_type: declared_mime_type(&name).to_string(),
            size: bytes.len() as u64,
            name,
            source: FileSource::Memory(bytes),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn is_image(&self) -> bool {
        is_image_mime_type(&self.mime_type)
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => Ok(fs::read(path)?),
            FileSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// An accepted image with its bytes loaded. Immutable once created.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

/// Validate a selection and load the images it contains.
///
/// More than [`crate::constants::MAX_BATCH_FILES`] handles rejects the whole
/// selection. Non-image handles are dropped. If no image survives, `state` is
/// left untouched and an empty list is returned; otherwise `state` is reset
/// for the new batch.
pub fn intake(files: &[SelectedFile], state: &mut BatchState) -> Result<Vec<SourceImage>> {
    validate_selection_count(files.len())?;

    let accepted: Vec<&SelectedFile> = files
        .iter()
        .filter(|file| {
            let keep = file.is_image();
            if !keep {
                debug!(name = %file.name, mime = %file.mime_type, "dropping non-image file");
            }
            keep
        })
        .collect();

    if accepted.is_empty() {
        return Ok(Vec::new());
    }

    let images = accepted
        .into_iter()
        .map(|file| {
            Ok(SourceImage {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
                size: file.size,
                bytes: file.read_bytes()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    state.reset(images.len());
    info!(total = images.len(), selected = files.len(), "intake accepted batch");

    Ok(images)
}

/// Expand command-line inputs into an ordered selection.
///
/// Each input may be a file, a directory or a glob pattern. Nothing is
/// filtered by type here.
pub fn collect_selection(inputs: &[String], recursive: bool) -> Result<Vec<SelectedFile>> {
    let mut selection = Vec::new();

    for input in inputs {
        let input_path = Path::new(input);

        if input_path.is_file() {
            selection.push(SelectedFile::from_path(input_path)?);
        } else if input_path.is_dir() {
            let walker = if recursive {
                WalkDir::new(input_path)
            } else {
                WalkDir::new(input_path).max_depth(1)
            };

            for entry in walker
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
            {
                let entry = entry?;
                if entry.file_type().is_file() {
                    selection.push(SelectedFile::from_path(entry.path())?);
                }
            }
        } else {
            let pattern =
                glob(input).map_err(|_| CompressionError::NoImageFilesFound(input.clone()))?;
            let mut matched = 0;
            for entry in pattern.flatten() {
                if entry.is_file() {
                    selection.push(SelectedFile::from_path(&entry)?);
                    matched += 1;
                }
            }
            if matched == 0 {
                warn!(input = %input, "input matched no files");
            }
        }
    }

    Ok(selection)
}
