use crate::constants::{FALLBACK_BASE_NAME, THUMBNAIL_HEIGHT};
use crate::error::{CompressionError, Result};
use crate::intake::SourceImage;
use crate::utils::format_file_size;
use image::{DynamicImage, ImageFormat};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One thumbnail tile, labelled with the source file's size.
#[derive(Debug, Clone)]
pub struct PreviewTile {
    pub index: usize,
    pub name: String,
    pub size_label: String,
    pub width: u32,
    pub height: u32,
    pub thumbnail: DynamicImage,
}

impl PreviewTile {
    /// Write the thumbnail as `<index>_<base>.png` inside `dir`.
    pub fn save_thumbnail(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|_| CompressionError::DirectoryCreationFailed(dir.to_path_buf()))?;

        let base = self.name.split('.').next().filter(|b| !b.is_empty());
        let path = dir.join(format!(
            "{:03}_{}.png",
            self.index,
            base.unwrap_or(FALLBACK_BASE_NAME)
        ));
        self.thumbnail
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| CompressionError::Encode(self.name.clone(), e.to_string()))?;
        Ok(path)
    }
}

/// Decode one image into a tile. Images taller than the tile are scaled down.
pub fn render_preview(index: usize, image: &SourceImage) -> Result<PreviewTile> {
    let img = image::load_from_memory(&image.bytes)
        .map_err(|e| CompressionError::Decode(image.name.clone(), e))?;

    let (width, height) = (img.width(), img.height());
    let thumbnail = if height > THUMBNAIL_HEIGHT {
        img.thumbnail(u32::MAX, THUMBNAIL_HEIGHT)
    } else {
        img
    };

    Ok(PreviewTile {
        index,
        name: image.name.clone(),
        size_label: format_file_size(image.size),
        width,
        height,
        thumbnail,
    })
}

/// Render tiles for every image in parallel. Tiles come back in input order;
/// images that fail to decode are logged and left out.
pub fn render_previews(images: &[SourceImage]) -> Vec<PreviewTile> {
    images
        .par_iter()
        .enumerate()
        .filter_map(|(index, image)| match render_preview(index, image) {
            Ok(tile) => Some(tile),
            Err(e) => {
                warn!(name = %image.name, error = %e, "skipping preview tile");
                None
            }
        })
        .collect()
}
