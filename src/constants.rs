pub const DEFAULT_QUALITY: u8 = 85;
pub const MIN_QUALITY: u8 = 0;
pub const MAX_QUALITY: u8 = 100;

pub const DEFAULT_MAX_WIDTH: u32 = 1920;

/// Files larger than this are refused before decoding (100MB).
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 32_768;

pub const PNG_OPTIMIZATION_PRESET: u8 = 4;
pub const AVIF_ENCODER_SPEED: u8 = 6;

/// Directory names never descended into during traversal.
pub const EXCLUDED_DIRS: &[&str] = &[".git"];

/// Extensions replaced inside container files.
pub const REFERENCE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

pub const UPDATED_PREFIX: &str = "Updated references in:";
