use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqueezeError {
    #[error("Directory {} does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("WebP encoding error: {0}")]
    WebPEncoding(String),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("Invalid quality value: {0}. Must be between 0 and 100")]
    InvalidQuality(u8),

    #[error("Invalid maximum width: {0}. Must be greater than 0")]
    InvalidMaxWidth(u32),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Invalid reference pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to replace {}: {}", .0.display(), .1)]
    Persist(PathBuf, std::io::Error),
}

pub type Result<T> = std::result::Result<T, SqueezeError>;
