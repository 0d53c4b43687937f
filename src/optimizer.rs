use crate::error::Result;
use crate::formats::is_image_file;
use crate::processing::{optimize_image, output_path_for, OptimizeOptions, OptimizedImage};
use crate::report::{FileFailure, OptimizeReport};
use crate::utils::{calculate_compression_ratio, create_progress_spinner, format_file_size};
use crate::walker::walk_files;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Optimizes every `.jpg`, `.jpeg` and `.png` file below `directory`.
///
/// Images are handled one at a time in traversal order. A failure on one
/// image is reported and recorded, then the walk continues; only a missing
/// `directory` aborts the run, before any file is touched.
pub fn optimize(directory: &Path, options: &OptimizeOptions) -> Result<OptimizeReport> {
    let walk = walk_files(directory)?;
    let start_time = Instant::now();

    crate::verbose!(
        "Optimizing images in {} (quality {}, max width {}, {})",
        directory.display(),
        options.quality,
        options.max_width,
        if options.convert_to_target_format {
            format!("converting to {}", options.target_format)
        } else {
            "in place".to_string()
        }
    );

    let spinner = create_progress_spinner("Scanning for images...");
    let mut report = OptimizeReport::default();
    let mut written_outputs: HashSet<PathBuf> = HashSet::new();

    for entry in walk {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let failure = FileFailure::from_walk_error(directory, &e);
                spinner.suspend(|| crate::error!("{}: {}", failure.path.display(), e));
                report.failures.push(failure);
                continue;
            }
        };

        if !is_image_file(entry.file_name()) {
            continue;
        }

        let path = entry.path();
        spinner.set_message(format!("Optimizing {}", path.display()));

        let output = output_path_for(path, options);
        if options.convert_to_target_format && written_outputs.contains(&output) {
            spinner.suspend(|| {
                crate::warn!(
                    "{} overwrites {} written earlier in this run",
                    path.display(),
                    output.display()
                )
            });
        }

        match optimize_image(path, options) {
            Ok(image) => {
                spinner.suspend(|| print_optimized(&image));
                if image.converted() {
                    written_outputs.insert(image.output.clone());
                }
                report.optimized.push(image);
            }
            Err(e) => {
                spinner.suspend(|| crate::error!("{}: {}", path.display(), e));
                report.failures.push(FileFailure::new(path, &e));
            }
        }
    }

    spinner.finish_and_clear();

    crate::verbose!(
        "{} optimized, {} failed, {} -> {} in {:.2?}",
        report.optimized.len(),
        report.failures.len(),
        format_file_size(report.total_original_size()),
        format_file_size(report.total_new_size()),
        start_time.elapsed()
    );

    Ok(report)
}

fn print_optimized(image: &OptimizedImage) {
    if image.converted() {
        crate::info!(
            "{} -> {} ({}B -> {}B)",
            image.source.display(),
            image.output.display(),
            image.original_size,
            image.new_size
        );
    } else {
        crate::info!(
            "{} ({}B -> {}B)",
            image.source.display(),
            image.original_size,
            image.new_size
        );
    }

    if image.resized() {
        crate::verbose!(
            "resized {}x{} -> {}x{}",
            image.original_dimensions.0,
            image.original_dimensions.1,
            image.dimensions.0,
            image.dimensions.1
        );
    }
    crate::verbose!(
        "size change {:.1}%",
        -calculate_compression_ratio(image.original_size, image.new_size)
    );
}
