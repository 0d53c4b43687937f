//! Outcome records collected while the passes run.

use crate::error::SqueezeError;
use crate::processing::OptimizedImage;
use std::path::{Path, PathBuf};

/// A file whose processing failed; the pass moved on to the next file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

impl FileFailure {
    pub fn new(path: &Path, error: &SqueezeError) -> Self {
        Self {
            path: path.to_path_buf(),
            error: error.to_string(),
        }
    }

    /// Failure raised by the walker itself. Falls back to `root` when the
    /// error carries no path.
    pub fn from_walk_error(root: &Path, error: &SqueezeError) -> Self {
        let path = match error {
            SqueezeError::Walkdir(e) => e.path().unwrap_or(root),
            _ => root,
        };
        Self::new(path, error)
    }
}

/// An image written under a new extension next to its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub source: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct OptimizeReport {
    pub optimized: Vec<OptimizedImage>,
    pub failures: Vec<FileFailure>,
}

impl OptimizeReport {
    pub fn conversions(&self) -> Vec<Conversion> {
        self.optimized
            .iter()
            .filter(|image| image.converted())
            .map(|image| Conversion {
                source: image.source.clone(),
                output: image.output.clone(),
            })
            .collect()
    }

    pub fn total_original_size(&self) -> u64 {
        self.optimized.iter().map(|image| image.original_size).sum()
    }

    pub fn total_new_size(&self) -> u64 {
        self.optimized.iter().map(|image| image.new_size).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RewriteReport {
    pub updated: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub optimize: OptimizeReport,
    /// `None` when images were re-saved in place and nothing needed rewriting
    pub rewrite: Option<RewriteReport>,
}
