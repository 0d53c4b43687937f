//! Type-safe handling of the image and container formats the tool touches.
//!
//! Sources are the formats picked up from disk, targets are the formats
//! images may be converted to, containers are the text files whose
//! references get rewritten.
use crate::error::{Result, SqueezeError};
use std::fmt;
use std::str::FromStr;

/// Formats images may be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetFormat {
    /// WebP, lossy with the configured quality unless lossless is requested
    #[default]
    WebP,
    /// AVIF, lossy with the configured quality
    Avif,
}

impl TargetFormat {
    /// Returns the file extension for this format, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::WebP => "webp",
            TargetFormat::Avif => "avif",
        }
    }

    /// Get format names for CLI help text
    pub fn format_names() -> Vec<&'static str> {
        vec!["webp", "avif"]
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetFormat::WebP => "WebP",
            TargetFormat::Avif => "AVIF",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TargetFormat {
    type Err = SqueezeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "webp" => Ok(TargetFormat::WebP),
            "avif" => Ok(TargetFormat::Avif),
            _ => Err(SqueezeError::UnsupportedFormat(format!(
                "{} (supported targets: {})",
                s,
                TargetFormat::format_names().join(", ")
            ))),
        }
    }
}

/// Formats the optimizer reads and re-saves in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    /// Lossless source; re-saved without a quality setting
    Png,
}

impl SourceFormat {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".png") {
            Some(SourceFormat::Png)
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            Some(SourceFormat::Jpeg)
        } else {
            None
        }
    }
}

/// Text files that may embed image references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Html,
    Css,
    Js,
}

impl ContainerKind {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".html") {
            Some(ContainerKind::Html)
        } else if lower.ends_with(".css") {
            Some(ContainerKind::Css)
        } else if lower.ends_with(".js") {
            Some(ContainerKind::Js)
        } else {
            None
        }
    }
}

/// Check if a file name ends in `.jpg`, `.jpeg` or `.png`, in any case
pub fn is_image_file(file_name: &str) -> bool {
    SourceFormat::from_file_name(file_name).is_some()
}

/// Check if a file name ends in `.html`, `.css` or `.js`, in any case
pub fn is_container_file(file_name: &str) -> bool {
    ContainerKind::from_file_name(file_name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_format_from_str() {
        assert_eq!(TargetFormat::from_str("webp").unwrap(), TargetFormat::WebP);
        assert_eq!(TargetFormat::from_str("WebP").unwrap(), TargetFormat::WebP);
        assert_eq!(TargetFormat::from_str("AVIF").unwrap(), TargetFormat::Avif);

        let result = TargetFormat::from_str("jpeg");
        assert!(matches!(result, Err(SqueezeError::UnsupportedFormat(_))));
        if let Err(SqueezeError::UnsupportedFormat(msg)) = result {
            assert!(msg.contains("webp"));
        }
    }

    #[test]
    fn test_target_format_extension() {
        assert_eq!(TargetFormat::WebP.extension(), "webp");
        assert_eq!(TargetFormat::Avif.extension(), "avif");
        assert_eq!(TargetFormat::default(), TargetFormat::WebP);
    }

    #[test]
    fn test_target_format_display() {
        assert_eq!(format!("{}", TargetFormat::WebP), "WebP");
        assert_eq!(format!("{}", TargetFormat::Avif), "AVIF");
    }

    #[test]
    fn test_source_format_from_file_name() {
        assert_eq!(SourceFormat::from_file_name("a.png"), Some(SourceFormat::Png));
        assert_eq!(SourceFormat::from_file_name("a.PNG"), Some(SourceFormat::Png));
        assert_eq!(SourceFormat::from_file_name("a.jpg"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_file_name("a.JPEG"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_file_name("a.webp"), None);
        assert_eq!(SourceFormat::from_file_name("png"), None);
    }

    #[test]
    fn test_container_kind_from_file_name() {
        assert_eq!(ContainerKind::from_file_name("index.html"), Some(ContainerKind::Html));
        assert_eq!(ContainerKind::from_file_name("SITE.CSS"), Some(ContainerKind::Css));
        assert_eq!(ContainerKind::from_file_name("app.js"), Some(ContainerKind::Js));
        assert_eq!(ContainerKind::from_file_name("app.json"), None);
        assert_eq!(ContainerKind::from_file_name("page.htm"), None);
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("photo.jpg"));
        assert!(is_image_file("photo.JPG"));
        assert!(is_image_file("photo.jpeg"));
        assert!(is_image_file("icon.PnG"));

        assert!(!is_image_file("photo.webp"));
        assert!(!is_image_file("photo.gif"));
        assert!(!is_image_file("photo"));
        assert!(!is_image_file("notes.txt"));
    }

    #[test]
    fn test_is_container_file() {
        assert!(is_container_file("index.html"));
        assert!(is_container_file("Index.HTML"));
        assert!(is_container_file("style.css"));
        assert!(is_container_file("main.js"));

        assert!(!is_container_file("data.json"));
        assert!(!is_container_file("readme.md"));
    }
}
