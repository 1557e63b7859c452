//! ZIP assembly for a finished batch.

use crate::compressor::CompressedImage;
use crate::error::{CompressionError, Result};
use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Entry names for `names`, in order, with repeats suffixed `_1`, `_2`, ...
/// before the extension.
pub fn unique_entry_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for name in names {
        let mut candidate = name.to_string();
        let mut counter = 1;
        while seen.contains(&candidate) {
            candidate = match name.rsplit_once('.') {
                Some((stem, ext)) => format!("{}_{}.{}", stem, counter, ext),
                None => format!("{}_{}", name, counter),
            };
            counter += 1;
        }
        if candidate != name {
            debug!(original = %name, renamed = %candidate, "renamed duplicate archive entry");
        }
        seen.insert(candidate.clone());
        unique.push(candidate);
    }

    unique
}

/// Pack every compressed image into an in-memory ZIP, one entry each, in order.
pub fn build_archive(images: &[CompressedImage]) -> Result<Vec<u8>> {
    if images.is_empty() {
        return Err(CompressionError::EmptyBatch);
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let names = unique_entry_names(images.iter().map(|i| i.name.as_str()));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (image, name) in images.iter().zip(names) {
        zip.start_file(name, options)?;
        zip.write_all(&image.bytes)?;
    }

    let bytes = zip.finish()?.into_inner();
    info!(entries = images.len(), size = bytes.len(), "archive built");
    Ok(bytes)
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The temporary file is removed if anything fails before it is persisted.
pub fn save_archive(bytes: &[u8], path: &Path) -> Result<u64> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .map_err(|_| CompressionError::DirectoryCreationFailed(dir.to_path_buf()))?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(path).map_err(|e| CompressionError::Io(e.error))?;

    Ok(bytes.len() as u64)
}
