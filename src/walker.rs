use crate::constants::EXCLUDED_DIRS;
use crate::error::{Result, SqueezeError};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// A file found during traversal: the directory it lives in plus its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    path: PathBuf,
    file_name: String,
}

impl TreeEntry {
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// File name, lossily converted for extension matching
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lazy depth-first walk over every file below a root.
///
/// Directories named in [`EXCLUDED_DIRS`] are pruned before their children
/// are read, so nothing underneath them is ever visited. Entries within a
/// directory come back sorted by name.
pub struct TreeWalk {
    inner: FilterEntry<walkdir::IntoIter, fn(&DirEntry) -> bool>,
}

impl Iterator for TreeWalk {
    type Item = Result<TreeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(SqueezeError::from(e))),
            };

            if is_file_entry(&entry) {
                return Some(Ok(TreeEntry {
                    file_name: entry.file_name().to_string_lossy().into_owned(),
                    path: entry.into_path(),
                }));
            }
        }
    }
}

/// Starts a fresh traversal of `root`.
///
/// Fails with [`SqueezeError::DirectoryNotFound`] when the root is missing
/// and [`SqueezeError::NotADirectory`] when it is a file, before anything is
/// yielded.
pub fn walk_files(root: &Path) -> Result<TreeWalk> {
    if !root.exists() {
        return Err(SqueezeError::DirectoryNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(SqueezeError::NotADirectory(root.to_path_buf()));
    }

    let inner = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_visitable as fn(&DirEntry) -> bool);

    Ok(TreeWalk { inner })
}

fn is_visitable(entry: &DirEntry) -> bool {
    // The root is always walked, whatever it is called.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !EXCLUDED_DIRS.contains(&name.as_ref())
}

fn is_file_entry(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}
