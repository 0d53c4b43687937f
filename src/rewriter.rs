use crate::constants::{REFERENCE_EXTENSIONS, UPDATED_PREFIX};
use crate::error::Result;
use crate::formats::{is_container_file, TargetFormat};
use crate::report::{Conversion, FileFailure, RewriteReport};
use crate::utils::{normalize_path, write_atomically};
use crate::walker::walk_files;
use regex::{Captures, NoExpand, Regex, RegexBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// How image references inside container files are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewriteMode {
    /// Replace every occurrence of a source extension anywhere in the text,
    /// whether or not it belongs to an actual asset reference.
    #[default]
    Blind,
    /// Only rewrite reference-like tokens whose converted sibling exists.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewriteOptions {
    pub target_format: TargetFormat,
    pub mode: RewriteMode,
}

impl RewriteOptions {
    pub fn new(target_format: Option<TargetFormat>, strict: bool) -> Self {
        Self {
            target_format: target_format.unwrap_or_default(),
            mode: if strict {
                RewriteMode::Strict
            } else {
                RewriteMode::Blind
            },
        }
    }
}

/// Rewrites image extensions in markup, stylesheet and script files under a root.
pub struct ReferenceRewriter {
    root: PathBuf,
    options: RewriteOptions,
    extension_pattern: Regex,
    reference_pattern: Regex,
    conversions: HashSet<PathBuf>,
}

impl ReferenceRewriter {
    pub fn new(root: &Path, options: RewriteOptions) -> Result<Self> {
        let extensions = REFERENCE_EXTENSIONS
            .iter()
            .map(|ext| regex::escape(ext))
            .collect::<Vec<_>>()
            .join("|");

        let extension_pattern = RegexBuilder::new(&extensions)
            .case_insensitive(true)
            .build()?;
        // A run of characters that can appear in a path or URL, ending in a
        // source extension that is not followed by more word characters.
        let reference_pattern = RegexBuilder::new(&format!(
            r#"(?P<stem>[^\s"'`()<>=,;|\\]+)(?:{})\b"#,
            extensions
        ))
        .case_insensitive(true)
        .build()?;

        Ok(Self {
            root: root.to_path_buf(),
            options,
            extension_pattern,
            reference_pattern,
            conversions: HashSet::new(),
        })
    }

    /// Images known to have been converted in this run. Strict mode accepts
    /// a reference when its converted path is listed here or exists on disk.
    pub fn with_conversions(mut self, conversions: &[Conversion]) -> Self {
        self.conversions
            .extend(conversions.iter().map(|c| normalize_path(&c.output)));
        self
    }

    fn target_extension(&self) -> String {
        format!(".{}", self.options.target_format.extension())
    }

    /// Returns `content` with references rewritten. `container_dir` is the
    /// directory of the file the content came from; strict mode resolves
    /// relative references against it.
    pub fn rewrite_content(&self, content: &str, container_dir: &Path) -> String {
        let target = self.target_extension();
        match self.options.mode {
            RewriteMode::Blind => self
                .extension_pattern
                .replace_all(content, NoExpand(&target))
                .into_owned(),
            RewriteMode::Strict => self
                .reference_pattern
                .replace_all(content, |caps: &Captures| {
                    let stem = &caps["stem"];
                    let converted = format!("{}{}", stem, target);
                    if self.has_converted_asset(&converted, container_dir) {
                        converted
                    } else {
                        caps[0].to_string()
                    }
                })
                .into_owned(),
        }
    }

    fn has_converted_asset(&self, reference: &str, container_dir: &Path) -> bool {
        let lower = reference.to_lowercase();
        if lower.contains("://") || lower.starts_with("//") || lower.starts_with("data:") {
            return false;
        }

        let resolved = match reference.strip_prefix('/') {
            Some(rooted) => self.root.join(rooted),
            None => container_dir.join(reference),
        };
        let candidate = normalize_path(&resolved);
        self.conversions.contains(&candidate) || candidate.is_file()
    }

    /// Rewrites one container file. Returns whether the file was written.
    pub fn rewrite_file(&self, path: &Path) -> Result<bool> {
        let content = fs::read_to_string(path)?;
        let container_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let updated = self.rewrite_content(&content, container_dir);

        if updated == content {
            return Ok(false);
        }
        write_atomically(path, updated.as_bytes(), path)?;
        Ok(true)
    }

    /// Walks the root and rewrites every `.html`, `.css` and `.js` file.
    ///
    /// Read and write failures are reported per file and the pass carries on.
    pub fn run(&self) -> Result<RewriteReport> {
        let walk = walk_files(&self.root)?;
        let mut report = RewriteReport::default();

        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let failure = FileFailure::from_walk_error(&self.root, &e);
                    crate::error!("{}: {}", failure.path.display(), e);
                    report.failures.push(failure);
                    continue;
                }
            };

            if !is_container_file(entry.file_name()) {
                continue;
            }

            let path = entry.path();
            match self.rewrite_file(path) {
                Ok(true) => {
                    crate::info!("{} {}", UPDATED_PREFIX, path.display());
                    report.updated.push(path.to_path_buf());
                }
                Ok(false) => crate::verbose!("No references to update in {}", path.display()),
                Err(e) => {
                    crate::error!("{}: {}", path.display(), e);
                    report.failures.push(FileFailure::new(path, &e));
                }
            }
        }

        Ok(report)
    }
}

/// Rewrites image references below `directory` using extensions alone.
pub fn update_references(directory: &Path, options: &RewriteOptions) -> Result<RewriteReport> {
    ReferenceRewriter::new(directory, *options)?.run()
}

/// Like [`update_references`], but seeded with the conversions an optimizer
/// run just produced so strict mode can check references against them.
pub fn update_references_with(
    directory: &Path,
    options: &RewriteOptions,
    conversions: &[Conversion],
) -> Result<RewriteReport> {
    ReferenceRewriter::new(directory, *options)?
        .with_conversions(conversions)
        .run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SqueezeError;
    use tempfile::TempDir;

    fn blind() -> ReferenceRewriter {
        ReferenceRewriter::new(Path::new("site"), RewriteOptions::default()).unwrap()
    }

    #[test]
    fn test_blind_replaces_every_occurrence() {
        let rewriter = blind();
        let content = r#"<img src="a.png"><img src="b.JPG"><img src="c.jpeg">"#;
        assert_eq!(
            rewriter.rewrite_content(content, Path::new("site")),
            r#"<img src="a.webp"><img src="b.webp"><img src="c.webp">"#
        );
    }

    #[test]
    fn test_blind_over_replaces_non_references() {
        let rewriter = blind();
        let content = "// loader for .png and .Jpeg files, see my.pngfile";
        assert_eq!(
            rewriter.rewrite_content(content, Path::new("site")),
            "// loader for .webp and .webp files, see my.webpfile"
        );
    }

    #[test]
    fn test_blind_is_idempotent() {
        let rewriter = blind();
        let once = rewriter.rewrite_content("url('bg.jpg')", Path::new("site"));
        let twice = rewriter.rewrite_content(&once, Path::new("site"));
        assert_eq!(once, "url('bg.webp')");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_blind_uses_target_extension() {
        let options = RewriteOptions::new(Some(TargetFormat::Avif), false);
        let rewriter = ReferenceRewriter::new(Path::new("site"), options).unwrap();
        assert_eq!(
            rewriter.rewrite_content("a.png b.jpg", Path::new("site")),
            "a.avif b.avif"
        );
    }

    #[test]
    fn test_strict_only_rewrites_converted_references() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("img")).unwrap();
        fs::create_dir_all(root.join("pages")).unwrap();
        fs::write(root.join("img/a.webp"), "webp").unwrap();

        let options = RewriteOptions::new(None, true);
        let rewriter = ReferenceRewriter::new(root, options).unwrap();
        let content = concat!(
            r#"<img src="../img/a.png">"#,
            r#"<img src="../img/missing.jpg">"#,
            r#"<img src="/img/a.PNG">"#,
            r#"<img src="https://cdn.example.com/img/a.png">"#,
            "<p>Upload a .png file</p>",
        );

        let rewritten = rewriter.rewrite_content(content, &root.join("pages"));
        assert_eq!(
            rewritten,
            concat!(
                r#"<img src="../img/a.webp">"#,
                r#"<img src="../img/missing.jpg">"#,
                r#"<img src="/img/a.webp">"#,
                r#"<img src="https://cdn.example.com/img/a.png">"#,
                "<p>Upload a .png file</p>",
            )
        );
    }

    #[test]
    fn test_strict_accepts_listed_conversions() {
        let root = Path::new("site");
        let options = RewriteOptions::new(None, true);
        let conversions = vec![Conversion {
            source: PathBuf::from("site/./img/hero.jpg"),
            output: PathBuf::from("site/./img/hero.webp"),
        }];
        let rewriter = ReferenceRewriter::new(root, options)
            .unwrap()
            .with_conversions(&conversions);

        assert_eq!(
            rewriter.rewrite_content("background: url(img/hero.jpg);", root),
            "background: url(img/hero.webp);"
        );
        assert_eq!(
            rewriter.rewrite_content("background: url(img/other.jpg);", root),
            "background: url(img/other.jpg);"
        );
    }

    #[test]
    fn test_rewrite_file_writes_only_on_change() {
        let temp_dir = TempDir::new().unwrap();
        let page = temp_dir.path().join("index.html");
        fs::write(&page, r#"<img src="a.png"><img src="b.jpg">"#).unwrap();
        let plain = temp_dir.path().join("about.html");
        fs::write(&plain, "<p>no images</p>").unwrap();

        let rewriter = ReferenceRewriter::new(temp_dir.path(), RewriteOptions::default()).unwrap();

        assert!(rewriter.rewrite_file(&page).unwrap());
        assert_eq!(
            fs::read_to_string(&page).unwrap(),
            r#"<img src="a.webp"><img src="b.webp">"#
        );
        assert!(!rewriter.rewrite_file(&page).unwrap());
        assert!(!rewriter.rewrite_file(&plain).unwrap());
    }

    #[test]
    fn test_update_references_continues_after_bad_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.css"), [0xff, 0xfe, 0x00, 0x2e, 0x70, 0x6e, 0x67]).unwrap();
        fs::write(root.join("b.js"), "const logo = 'logo.png';").unwrap();
        fs::write(root.join("c.txt"), "logo.png").unwrap();

        let report = update_references(root, &RewriteOptions::default()).unwrap();

        assert_eq!(report.updated, vec![root.join("b.js")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, root.join("a.css"));
        assert_eq!(fs::read_to_string(root.join("c.txt")).unwrap(), "logo.png");
    }

    #[test]
    fn test_update_references_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = update_references(&temp_dir.path().join("gone"), &RewriteOptions::default());
        assert!(matches!(result, Err(SqueezeError::DirectoryNotFound(_))));
    }
}
