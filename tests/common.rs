#![allow(dead_code)]

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes a real gradient image. The format follows the extension.
pub fn write_gradient_image(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    });
    img.save(path).unwrap();
}

pub fn write_alpha_image(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, if x < width / 2 { 255 } else { 64 }])
    });
    img.save(path).unwrap();
}

/// A file with an image extension whose contents no decoder accepts.
pub fn write_corrupt_image(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    File::create(path)
        .unwrap()
        .write_all(b"definitely not an image")
        .unwrap();
}

/// Lays out a small photo tree:
///
/// ```text
/// root/a.jpg
/// root/b.png
/// root/notes.txt
/// root/2023/summer/c.jpg
/// root/2023/d.webp
/// ```
///
/// Returns the relative paths of the four images.
pub fn create_photo_tree(root: &Path) -> Vec<PathBuf> {
    let images = vec![
        PathBuf::from("a.jpg"),
        PathBuf::from("b.png"),
        PathBuf::from("2023/summer/c.jpg"),
        PathBuf::from("2023/d.webp"),
    ];
    for relative in &images {
        write_gradient_image(&root.join(relative), 64, 48);
    }
    File::create(root.join("notes.txt"))
        .unwrap()
        .write_all(b"not an image")
        .unwrap();
    images
}

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn create_test_output_directory(temp_dir: &Path) -> PathBuf {
    let output_dir = temp_dir.join("output");
    std::fs::create_dir(&output_dir).unwrap();
    output_dir
}
