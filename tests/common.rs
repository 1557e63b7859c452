#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, RgbImage};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let format = ImageFormat::from_path(name).unwrap_or(ImageFormat::Png);
    let path = dir.join(name);
    File::create(&path)
        .unwrap()
        .write_all(&encoded_image(width, height, format))
        .unwrap();
    path
}

pub fn create_test_image_files(temp_dir: &Path) -> Vec<PathBuf> {
    vec![
        write_image(temp_dir, "first.png", 32, 24),
        write_image(temp_dir, "second.jpg", 16, 16),
        write_image(temp_dir, "third.png", 8, 40),
    ]
}

pub fn create_non_image_file(temp_dir: &Path, name: &str) -> PathBuf {
    let path = temp_dir.join(name);
    File::create(&path)
        .unwrap()
        .write_all(b"not an image")
        .unwrap();
    path
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}
