//! Test images for the scan command.

use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Write a small solid-colour JPEG with no metadata.
pub fn write_jpeg(dir: &Path, name: &str, shade: u8) -> PathBuf {
    let img = image::RgbImage::from_pixel(12, 12, image::Rgb([shade, 255 - shade, 40]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .unwrap();
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
