//! Helpers shared by the optimizer and the reference rewriter.
use crate::constants::PROGRESS_SPINNER_TEMPLATE;
use crate::error::{Result, SqueezeError};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

/// Create a progress spinner with consistent styling
///
/// The spinner is hidden in quiet mode so nothing but errors reach the
/// terminal.
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if crate::logger::is_quiet() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Replace `path` with `bytes` through a temp file in the same directory.
///
/// The new file takes the permissions of `permissions_from`, which is the
/// file itself for in-place saves and the source image for conversions.
pub fn write_atomically(path: &Path, bytes: &[u8], permissions_from: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;

    if let Ok(metadata) = fs::metadata(permissions_from) {
        fs::set_permissions(temp.path(), metadata.permissions())?;
    }

    temp.persist(path)
        .map_err(|e| SqueezeError::Persist(path.to_path_buf(), e.error))?;
    Ok(())
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// `..` past the start of a relative path is kept so that two spellings of
/// the same location still compare equal.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !matches!(
                    normalized.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_))
                ) {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Size reduction as a percentage; negative when the file grew.
pub fn calculate_compression_ratio(original_size: u64, new_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
}
