#![allow(dead_code)]

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn write_jpeg(path: &Path, width: u32, height: u32) -> PathBuf {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
    path.to_path_buf()
}

pub fn write_png(path: &Path, width: u32, height: u32) -> PathBuf {
    RgbaImage::from_pixel(width, height, Rgba([30, 60, 90, 255]))
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
    path.to_path_buf()
}

/// A small site: two images, a page and a stylesheet referencing them, and
/// a `.git` directory holding an image and a page that must stay untouched.
pub fn create_site(root: &Path) {
    fs::create_dir_all(root.join("img")).unwrap();
    fs::create_dir_all(root.join("css")).unwrap();
    fs::create_dir_all(root.join(".git/refs")).unwrap();

    write_jpeg(&root.join("img/hero.jpg"), 48, 24);
    write_png(&root.join("img/logo.PNG"), 16, 16);
    write_jpeg(&root.join(".git/refs/tracked.jpg"), 48, 24);

    fs::write(
        root.join("index.html"),
        r#"<img src="img/hero.jpg"><img src="img/logo.PNG">"#,
    )
    .unwrap();
    fs::write(
        root.join("css/site.css"),
        "header { background: url('../img/hero.jpg'); }",
    )
    .unwrap();
    fs::write(root.join(".git/refs/page.html"), r#"<img src="x.png">"#).unwrap();
}
